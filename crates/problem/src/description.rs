//! Wire-format types for problem requests and solve responses.

use mdao_core::Bounds;
use serde::{Deserialize, Serialize};

use crate::ProblemError;

/// Component types that evaluate an algebraic expression.
const EXPRESSION_KINDS: [&str; 3] = ["execcomp", "exec", "expression"];

/// A complete optimization request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProblemDescription {
    pub id: String,
    pub driver: Driver,
    pub independents: Vec<IndependentVariable>,
    pub component: Component,
    pub design_variables: Vec<DesignVariable>,
    pub objective: Objective,
}

/// A named input with an initial value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IndependentVariable {
    pub id: String,
    pub value: f64,
}

/// The single computational node of a problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Component {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: String,

    /// One or more `output = expression` statements.
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Driver {
    pub id: String,
    pub optimizer_name: String,

    #[serde(default)]
    pub options: DriverOptions,
}

/// Iteration limits and tolerance passed to the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct DriverOptions {
    pub max_iterations: usize,
    pub tolerance: f64,
    pub max_evaluations: usize,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-6,
            max_evaluations: 10_000,
        }
    }
}

/// A bounded reference to an independent variable the optimizer may change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DesignVariable {
    pub id: String,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl DesignVariable {
    /// Returns the validated bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError::Validation`] if a bound is non-finite or
    /// `lowerBound > upperBound`.
    pub fn bounds(&self) -> Result<Bounds, ProblemError> {
        Bounds::new(self.lower_bound, self.upper_bound)
            .map_err(|e| ProblemError::validation(format!("design variable `{}`: {e}", self.id)))
    }
}

/// A reference to the output being minimized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Objective {
    pub id: String,
}

/// The outcome of a solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    pub status: SolveStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub iterations: usize,
    pub evaluations: usize,

    /// The objective first, then each design variable in request order.
    pub results: Vec<ResultValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SolveStatus {
    Converged,
    NotConverged,
}

/// A final value, keyed by the id as written in the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultValue {
    pub id: String,
    pub value: f64,
}

impl ProblemDescription {
    /// Checks field-level constraints that do not need the assembled graph.
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError::Validation`] for an empty id, a non-finite
    /// initial value, invalid bounds or driver options, or a component type
    /// that is not an expression component.
    pub fn validate(&self) -> Result<(), ProblemError> {
        require_id("problem", &self.id)?;
        require_id("driver", &self.driver.id)?;
        require_id("component", &self.component.id)?;
        require_id("objective", &self.objective.id)?;

        for independent in &self.independents {
            require_id("independent variable", &independent.id)?;
            if !independent.value.is_finite() {
                return Err(ProblemError::validation(format!(
                    "independent variable `{}` has a non-finite value",
                    independent.id
                )));
            }
        }

        for design in &self.design_variables {
            require_id("design variable", &design.id)?;
            design.bounds()?;
        }

        if self.design_variables.is_empty() {
            return Err(ProblemError::validation(
                "at least one design variable is required",
            ));
        }

        let kind = self.component.kind.to_ascii_lowercase();
        if !EXPRESSION_KINDS.contains(&kind.as_str()) {
            return Err(ProblemError::validation(format!(
                "component type `{}` is not supported (expected ExecComp)",
                self.component.kind
            )));
        }

        self.driver.options.validate()
    }
}

impl DriverOptions {
    /// # Errors
    ///
    /// Returns [`ProblemError::Validation`] if a limit is zero or the
    /// tolerance is not a finite positive number.
    pub fn validate(&self) -> Result<(), ProblemError> {
        if self.max_iterations == 0 {
            return Err(ProblemError::validation("maxIterations must be positive"));
        }
        if self.max_evaluations == 0 {
            return Err(ProblemError::validation("maxEvaluations must be positive"));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ProblemError::validation(
                "tolerance must be finite and positive",
            ));
        }
        Ok(())
    }
}

fn require_id(what: &str, id: &str) -> Result<(), ProblemError> {
    if id.trim().is_empty() {
        Err(ProblemError::validation(format!("{what} id must not be empty")))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARABOLOID: &str = r#"{
        "id": "paraboloid-problem",
        "driver": { "id": "driver", "optimizerName": "SLSQP" },
        "independents": [
            { "id": "x", "value": 3.0 },
            { "id": "y", "value": -4.0 }
        ],
        "component": {
            "id": "paraboloid",
            "type": "ExecComp",
            "expression": "f = (x-3)**2 + x*y + (y+4)**2 - 3"
        },
        "designVariables": [
            { "id": "x", "lowerBound": -50, "upperBound": 50 },
            { "id": "y", "lowerBound": -50, "upperBound": 50 }
        ],
        "objective": { "id": "f" }
    }"#;

    #[test]
    fn deserializes_camel_case_request() {
        let problem: ProblemDescription = serde_json::from_str(PARABOLOID).unwrap();

        assert_eq!(problem.component.kind, "ExecComp");
        assert_eq!(problem.design_variables[1].lower_bound, -50.0);
        assert_eq!(problem.driver.options, DriverOptions::default());
        assert!(problem.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_fields() {
        let json = PARABOLOID.replace("\"value\": 3.0", "\"value\": 3.0, \"units\": \"m\"");
        assert!(serde_json::from_str::<ProblemDescription>(&json).is_err());
    }

    #[test]
    fn partial_options_fill_defaults() {
        let options: DriverOptions = serde_json::from_str(r#"{ "maxIterations": 5 }"#).unwrap();
        assert_eq!(options.max_iterations, 5);
        assert_eq!(options.tolerance, 1e-6);
        assert_eq!(options.max_evaluations, 10_000);
    }

    #[test]
    fn inverted_bounds_fail_validation() {
        let mut problem: ProblemDescription = serde_json::from_str(PARABOLOID).unwrap();
        problem.design_variables[0].lower_bound = 10.0;
        problem.design_variables[0].upper_bound = 0.0;

        assert!(matches!(
            problem.validate(),
            Err(ProblemError::Validation(message)) if message.contains("`x`")
        ));
    }

    #[test]
    fn component_type_is_case_insensitive() {
        let mut problem: ProblemDescription = serde_json::from_str(PARABOLOID).unwrap();

        problem.component.kind = "execcomp".into();
        assert!(problem.validate().is_ok());

        problem.component.kind = "MetaModel".into();
        assert!(matches!(
            problem.validate(),
            Err(ProblemError::Validation(_))
        ));
    }

    #[test]
    fn invalid_options_fail_validation() {
        let mut problem: ProblemDescription = serde_json::from_str(PARABOLOID).unwrap();
        problem.driver.options.tolerance = 0.0;
        assert!(problem.validate().is_err());

        problem.driver.options = DriverOptions {
            max_iterations: 0,
            ..DriverOptions::default()
        };
        assert!(problem.validate().is_err());
    }

    #[test]
    fn solution_omits_empty_message() {
        let solution = Solution {
            status: SolveStatus::NotConverged,
            message: None,
            iterations: 1,
            evaluations: 6,
            results: vec![ResultValue {
                id: "f".into(),
                value: -27.0,
            }],
        };

        let json = serde_json::to_value(&solution).unwrap();
        assert_eq!(json["status"], "notConverged");
        assert!(json.get("message").is_none());
        assert_eq!(json["results"][0]["id"], "f");
    }
}
