use std::{
    convert::Infallible,
    time::{Duration, Instant},
};

use mdao_core::{Bounds, Model, OptimizationProblem};
use mdao_expr::{BoundProgram, EvalError};
use mdao_solvers::optimization::{Action, Event, Status, nelder_mead, slsqp};
use tracing::{debug, info, warn};

use crate::{
    AttachedProblem, CancelToken, Phase, ProblemError, WiredModel,
    address::Address,
    driver::{DesignSlot, ObjectiveSource, Optimizer},
};

/// Runs an attached problem to convergence or failure.
///
/// The executor itself holds no per-solve state, so one value can run any
/// number of problems. A timeout or cancel token aborts the search before the
/// next model evaluation.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    timeout: Option<Duration>,
    cancel: Option<CancelToken>,
}

impl Executor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits the wall-clock time of each solve.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self
        }
    }

    /// Stops the solve as soon as `token` is cancelled.
    #[must_use]
    pub fn with_cancel_token(self, token: CancelToken) -> Self {
        Self {
            cancel: Some(token),
            ..self
        }
    }

    /// Solves the problem.
    ///
    /// Running out of iterations or evaluations is not an error; the returned
    /// model reports [`Phase::NotConverged`] with the best point found.
    ///
    /// # Errors
    ///
    /// - [`ProblemError::Validation`] if the graph has a cycle or the
    ///   objective does not depend on any design variable
    /// - [`ProblemError::Numerical`] if an evaluation produces NaN or infinity
    /// - [`ProblemError::TimedOut`] if the timeout expires or the token is
    ///   cancelled
    pub fn run(&self, problem: AttachedProblem) -> Result<SolvedModel, ProblemError> {
        let AttachedProblem {
            model,
            optimizer,
            options,
            design,
            objective_id,
            objective,
            x0,
        } = problem;

        check_structure(&model, &design, &objective_id, objective)?;

        debug!(
            problem = %model.problem_id,
            phase = %Phase::Solving,
            optimizer = %optimizer,
            max_iterations = options.max_iterations,
            "starting solve"
        );

        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        let cancel = self.cancel.clone();
        let observer = move |_: &Event<'_>| -> Option<Action> {
            let cancelled = cancel.as_ref().is_some_and(CancelToken::is_cancelled);
            let expired = deadline.is_some_and(|deadline| Instant::now() >= deadline);
            (cancelled || expired).then_some(Action::StopEarly)
        };

        let component = ComponentModel {
            program: &model.program,
        };
        let target = DesignTarget {
            base: &model.initial_values,
            design: &design,
            objective,
        };
        let bounds: Vec<Bounds> = design.iter().map(|slot| slot.bounds).collect();

        let result = match optimizer {
            Optimizer::Slsqp => {
                let config = slsqp::Config::new(
                    options.max_iterations,
                    options.max_evaluations,
                    options.tolerance,
                )
                .map_err(|e| ProblemError::validation(e.to_string()))?;
                slsqp::minimize(&component, &target, &x0, &bounds, &config, observer)
            }
            Optimizer::NelderMead => {
                let config = nelder_mead::Config::new(
                    options.max_iterations,
                    options.max_evaluations,
                    options.tolerance,
                )
                .map_err(|e| ProblemError::validation(e.to_string()))?;
                nelder_mead::minimize(&component, &target, &x0, &bounds, &config, observer)
            }
        };

        let solution = result.map_err(|e| {
            warn!(problem = %model.problem_id, phase = %Phase::Failed, error = %e, "solve failed");
            ProblemError::Numerical(e.to_string())
        })?;

        let (phase, message) = match solution.status {
            Status::Converged => (Phase::Converged, None),
            Status::MaxIters => (
                Phase::NotConverged,
                Some(format!(
                    "iteration limit of {} reached before convergence",
                    options.max_iterations
                )),
            ),
            Status::MaxEvals => (
                Phase::NotConverged,
                Some(format!(
                    "evaluation limit of {} reached before convergence",
                    options.max_evaluations
                )),
            ),
            Status::Stalled => (
                Phase::NotConverged,
                Some("optimizer could not improve the objective further".to_string()),
            ),
            Status::StoppedByObserver => {
                warn!(
                    problem = %model.problem_id,
                    phase = %Phase::Failed,
                    evaluations = solution.evals,
                    "solve cancelled or timed out"
                );
                return Err(ProblemError::TimedOut);
            }
        };

        info!(
            problem = %model.problem_id,
            phase = %phase,
            iterations = solution.iters,
            evaluations = solution.evals,
            objective = solution.objective,
            "solve finished"
        );

        Ok(SolvedModel {
            problem_id: model.problem_id,
            phase,
            message,
            iterations: solution.iters,
            evaluations: solution.evals,
            design,
            objective_id,
            objective_value: solution.objective,
            independents: solution.snapshot.input,
        })
    }
}

/// Rejects graphs the optimizer cannot drive.
fn check_structure(
    model: &WiredModel,
    design: &[DesignSlot],
    objective_id: &str,
    objective: ObjectiveSource,
) -> Result<(), ProblemError> {
    model
        .graph
        .evaluation_order()
        .map_err(|node| ProblemError::validation(format!("dependency cycle through `{node}`")))?;

    let target = model.namespace.path(match objective {
        ObjectiveSource::Independent(i) => Address::Independent(i),
        ObjectiveSource::Output(j) => Address::Output(j),
    });
    let reachable = design.iter().any(|slot| {
        let source = model.namespace.path(Address::Independent(slot.independent));
        model.graph.depends_on(&target, &source)
    });

    if reachable {
        Ok(())
    } else {
        Err(ProblemError::validation(format!(
            "objective `{objective_id}` does not depend on any design variable"
        )))
    }
}

/// The final state of a solved problem.
#[derive(Debug, Clone)]
pub struct SolvedModel {
    pub(crate) problem_id: String,
    pub(crate) phase: Phase,
    pub(crate) message: Option<String>,
    pub(crate) iterations: usize,
    pub(crate) evaluations: usize,
    pub(crate) design: Vec<DesignSlot>,
    pub(crate) objective_id: String,
    pub(crate) objective_value: f64,
    pub(crate) independents: Vec<f64>,
}

impl SolvedModel {
    #[must_use]
    pub fn problem_id(&self) -> &str {
        &self.problem_id
    }

    /// Either [`Phase::Converged`] or [`Phase::NotConverged`].
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    #[must_use]
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    #[must_use]
    pub fn objective(&self) -> (&str, f64) {
        (&self.objective_id, self.objective_value)
    }

    /// Final design variable values in request order.
    pub fn design_values(&self) -> impl Iterator<Item = (&str, f64)> {
        self.design
            .iter()
            .map(|slot| (slot.id.as_str(), self.independents[slot.independent]))
    }
}

/// Evaluates the component from the full vector of independent values.
struct ComponentModel<'a> {
    program: &'a BoundProgram,
}

impl Model for ComponentModel<'_> {
    type Input = Vec<f64>;
    type Output = Vec<f64>;
    type Error = EvalError;

    fn call(&self, input: &Vec<f64>) -> Result<Vec<f64>, EvalError> {
        self.program.evaluate(input)
    }
}

/// Maps optimizer variables onto the independents and reads the objective.
struct DesignTarget<'a> {
    base: &'a [f64],
    design: &'a [DesignSlot],
    objective: ObjectiveSource,
}

impl OptimizationProblem for DesignTarget<'_> {
    type Input = Vec<f64>;
    type Output = Vec<f64>;
    type Error = Infallible;

    fn dimension(&self) -> usize {
        self.design.len()
    }

    fn input(&self, x: &[f64]) -> Result<Vec<f64>, Infallible> {
        let mut values = self.base.to_vec();
        for (slot, &value) in self.design.iter().zip(x) {
            values[slot.independent] = value;
        }
        Ok(values)
    }

    fn objective(&self, input: &Vec<f64>, output: &Vec<f64>) -> Result<f64, Infallible> {
        Ok(match self.objective {
            ObjectiveSource::Independent(i) => input[i],
            ObjectiveSource::Output(j) => output[j],
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{build_model, configure_driver, testing::paraboloid, wire};

    fn attach(problem: &crate::ProblemDescription) -> AttachedProblem {
        configure_driver(wire(build_model(problem).unwrap()).unwrap()).unwrap()
    }

    #[test]
    fn solves_paraboloid() {
        let solved = Executor::new().run(attach(&paraboloid())).unwrap();

        assert_eq!(solved.phase(), Phase::Converged);
        assert_eq!(solved.message(), None);
        let (id, value) = solved.objective();
        assert_eq!(id, "f");
        assert_relative_eq!(value, -82.0 / 3.0, epsilon = 1e-8);
    }

    #[test]
    fn cancelled_token_times_out() {
        let token = CancelToken::new();
        token.cancel();

        let result = Executor::new()
            .with_cancel_token(token)
            .run(attach(&paraboloid()));

        assert_eq!(result.unwrap_err(), ProblemError::TimedOut);
    }

    #[test]
    fn zero_timeout_times_out() {
        let result = Executor::new()
            .with_timeout(Duration::ZERO)
            .run(attach(&paraboloid()));

        assert_eq!(result.unwrap_err(), ProblemError::TimedOut);
    }

    #[test]
    fn objective_must_depend_on_a_design_variable() {
        let mut problem = paraboloid();
        problem.component.expression = "f = (x-3)^2 + x*y + (y+4)^2 - 3; g = 2 * y".into();
        problem.design_variables.truncate(1);
        problem.objective.id = "g".into();

        let result = Executor::new().run(attach(&problem));
        assert!(matches!(result, Err(ProblemError::Validation(m)) if m.contains("`g`")));
    }

    #[test]
    fn non_finite_evaluation_is_numerical() {
        let mut problem = paraboloid();
        problem.component.expression = "f = sqrt(x - 2.5) + y".into();
        problem.design_variables[0].lower_bound = 0.0;

        let result = Executor::new().run(attach(&problem));
        assert!(matches!(result, Err(ProblemError::Numerical(_))));
    }
}
