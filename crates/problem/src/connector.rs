use std::collections::HashMap;

use mdao_expr::BoundProgram;
use tracing::debug;

use crate::{
    BuiltModel, OutputGraph, Phase, ProblemError,
    address::{Address, Namespace},
    description::{DesignVariable, Driver, Objective},
};

/// A model whose component inputs are bound to independent variables.
#[derive(Debug, Clone)]
pub struct WiredModel {
    pub(crate) problem_id: String,
    pub(crate) namespace: Namespace,
    pub(crate) initial_values: Vec<f64>,
    pub(crate) program: BoundProgram,
    pub(crate) graph: OutputGraph,
    pub(crate) driver: Driver,
    pub(crate) design_variables: Vec<DesignVariable>,
    pub(crate) objective: Objective,
}

impl WiredModel {
    #[must_use]
    pub fn problem_id(&self) -> &str {
        &self.problem_id
    }

    /// Evaluates the component at the given independent values.
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError::Numerical`] if an output is not finite.
    pub fn evaluate(&self, independents: &[f64]) -> Result<Vec<f64>, ProblemError> {
        self.program
            .evaluate(independents)
            .map_err(|e| ProblemError::Numerical(e.to_string()))
    }
}

/// Binds each component input to the independent variable it names.
///
/// Inputs are matched by exact name, bare (`x`) or qualified (`indeps.x`).
/// Independents that no input reads are allowed and logged at debug level.
///
/// # Errors
///
/// Returns [`ProblemError::AmbiguousWiring`] if two differently written
/// identifiers bind to the same independent variable.
pub fn wire(model: BuiltModel) -> Result<WiredModel, ProblemError> {
    let BuiltModel {
        problem_id,
        namespace,
        initial_values,
        program,
        graph,
        driver,
        design_variables,
        objective,
    } = model;

    // independent index -> identifier that claimed it
    let mut claimed: HashMap<usize, &str> = HashMap::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for connection in graph.connections() {
        let Some(Address::Independent(index)) = namespace.resolve(connection.via) else {
            continue;
        };

        match claimed.get(&index) {
            Some(&first) if first != connection.via => {
                return Err(ProblemError::AmbiguousWiring {
                    independent: namespace.independents()[index].clone(),
                    first: first.to_string(),
                    second: connection.via.to_string(),
                });
            }
            Some(_) => {}
            None => {
                claimed.insert(index, connection.via);
            }
        }
        slots.insert(connection.via, index);
    }

    for (index, id) in namespace.independents().iter().enumerate() {
        if !claimed.contains_key(&index) {
            debug!(problem = %problem_id, independent = %id, "independent variable is not read by the component");
        }
    }

    let bound = program
        .bind(|name| slots.get(name).copied())
        .map_err(|e| ProblemError::unresolved(e.name, "component inputs"))?;

    debug!(
        problem = %problem_id,
        phase = %Phase::Wired,
        inputs = slots.len(),
        "wired component inputs"
    );

    Ok(WiredModel {
        problem_id,
        namespace,
        initial_values,
        program: bound,
        graph,
        driver,
        design_variables,
        objective,
    })
}
