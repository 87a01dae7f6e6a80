use std::{collections::HashSet, fmt};

use mdao_core::Bounds;
use tracing::{debug, warn};

use crate::{
    Phase, ProblemError, WiredModel,
    address::Address,
    description::DriverOptions,
};

/// Supported optimization algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Optimizer {
    /// Gradient-based projected quasi-Newton search.
    Slsqp,

    /// Derivative-free bounded simplex search.
    NelderMead,
}

impl Optimizer {
    /// Looks up an optimizer by name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError::UnsupportedOptimizer`] for any other name.
    pub fn from_name(name: &str) -> Result<Self, ProblemError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "slsqp" => Ok(Self::Slsqp),
            "nelder-mead" | "neldermead" => Ok(Self::NelderMead),
            _ => Err(ProblemError::UnsupportedOptimizer {
                name: name.to_string(),
            }),
        }
    }
}

impl fmt::Display for Optimizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Slsqp => "SLSQP",
            Self::NelderMead => "Nelder-Mead",
        })
    }
}

/// A design variable registered with the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignSlot {
    /// The id as written in the request.
    pub id: String,

    /// Index of the independent variable the optimizer sets.
    pub independent: usize,

    pub bounds: Bounds,
}

/// What the objective reads after each evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveSource {
    Independent(usize),
    Output(usize),
}

/// A wired model with an optimizer, design variables and objective attached.
#[derive(Debug, Clone)]
pub struct AttachedProblem {
    pub(crate) model: WiredModel,
    pub(crate) optimizer: Optimizer,
    pub(crate) options: DriverOptions,
    pub(crate) design: Vec<DesignSlot>,
    pub(crate) objective_id: String,
    pub(crate) objective: ObjectiveSource,
    pub(crate) x0: Vec<f64>,
}

impl AttachedProblem {
    #[must_use]
    pub fn optimizer(&self) -> Optimizer {
        self.optimizer
    }

    #[must_use]
    pub fn design(&self) -> &[DesignSlot] {
        &self.design
    }

    /// Starting point, already clipped into the bounds.
    #[must_use]
    pub fn x0(&self) -> &[f64] {
        &self.x0
    }
}

/// Selects the optimizer and registers design variables and the objective.
///
/// Initial values that fall outside a design variable's bounds are clipped
/// into range with a warning.
///
/// # Errors
///
/// - [`ProblemError::UnsupportedOptimizer`] for an unknown optimizer name
/// - [`ProblemError::DuplicateId`] if a design variable is listed twice or
///   two entries name the same independent variable
/// - [`ProblemError::UnresolvedReference`] if a design variable or the
///   objective names nothing in the graph
/// - [`ProblemError::Validation`] if a design variable names a computed
///   output or has invalid bounds
pub fn configure_driver(model: WiredModel) -> Result<AttachedProblem, ProblemError> {
    let optimizer = Optimizer::from_name(&model.driver.optimizer_name)?;
    let options = model.driver.options;
    options.validate()?;

    let mut ids = HashSet::new();
    let mut targets = HashSet::new();
    let mut design = Vec::with_capacity(model.design_variables.len());
    let mut x0 = Vec::with_capacity(model.design_variables.len());

    for variable in &model.design_variables {
        if !ids.insert(variable.id.as_str()) {
            return Err(ProblemError::duplicate(variable.id.clone()));
        }

        let independent = match model.namespace.resolve(&variable.id) {
            Some(Address::Independent(index)) => index,
            Some(Address::Output(_)) => {
                return Err(ProblemError::validation(format!(
                    "design variable `{}` names a computed output; only independent variables can be designed",
                    variable.id
                )));
            }
            None => {
                return Err(ProblemError::unresolved(
                    variable.id.clone(),
                    "design variables",
                ));
            }
        };

        if !targets.insert(independent) {
            return Err(ProblemError::duplicate(
                model.namespace.independents()[independent].clone(),
            ));
        }

        let bounds = variable.bounds()?;
        let initial = model.initial_values[independent];
        let clipped = bounds.clamp(initial);
        if clipped != initial {
            warn!(
                problem = %model.problem_id,
                design_variable = %variable.id,
                initial,
                clipped,
                "initial value outside bounds; clipping into range"
            );
        }

        x0.push(clipped);
        design.push(DesignSlot {
            id: variable.id.clone(),
            independent,
            bounds,
        });
    }

    let objective = match model.namespace.resolve(&model.objective.id) {
        Some(Address::Independent(index)) => ObjectiveSource::Independent(index),
        Some(Address::Output(index)) => ObjectiveSource::Output(index),
        None => {
            return Err(ProblemError::unresolved(
                model.objective.id.clone(),
                "objective",
            ));
        }
    };

    debug!(
        problem = %model.problem_id,
        phase = %Phase::DriverAttached,
        optimizer = %optimizer,
        design_variables = design.len(),
        "driver attached"
    );

    Ok(AttachedProblem {
        objective_id: model.objective.id.clone(),
        model,
        optimizer,
        options,
        design,
        objective,
        x0,
    })
}
