//! A single objective evaluation at a candidate point.
//!
//! Both minimizers reach the model only through [`evaluate`], called from
//! the shared search context for the starting point, every candidate and
//! every finite-difference step. For a declarative problem, `x` holds the
//! design variable values: the problem writes them over the independents,
//! the model evaluates the component, and the objective is read back from
//! either an independent or a component output.

use thiserror::Error;

use mdao_core::{Model, OptimizationProblem, Snapshot};

/// The objective at one point, with the model input and output behind it.
#[derive(Debug, Clone)]
pub struct Evaluation<I, O> {
    pub x: Vec<f64>,
    pub objective: f64,
    pub snapshot: Snapshot<I, O>,
}

#[derive(Debug, Error)]
pub enum EvalError<ME, PE> {
    #[error("model call failed")]
    Model(#[source] ME),

    /// Mapping `x` to a model input or reading the objective failed.
    #[error("problem error")]
    Problem(#[source] PE),

    #[error("objective is not finite ({0})")]
    NonFiniteObjective(f64),
}

pub type EvaluateResult<M, P> = Result<
    Evaluation<<M as Model>::Input, <M as Model>::Output>,
    EvalError<<M as Model>::Error, <P as OptimizationProblem>::Error>,
>;

/// Evaluates the objective of `problem` at `x`.
///
/// # Errors
///
/// Returns an error if mapping `x` fails, the model call fails, or the
/// objective is NaN or infinite.
pub fn evaluate<M, P>(model: &M, problem: &P, x: &[f64]) -> EvaluateResult<M, P>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
{
    let input = problem.input(x).map_err(EvalError::Problem)?;
    let output = model.call(&input).map_err(EvalError::Model)?;
    let objective = problem
        .objective(&input, &output)
        .map_err(EvalError::Problem)?;

    if !objective.is_finite() {
        return Err(EvalError::NonFiniteObjective(objective));
    }

    Ok(Evaluation {
        x: x.to_vec(),
        objective,
        snapshot: Snapshot::new(input, output),
    })
}
