use std::collections::HashSet;

use mdao_expr::Program;
use tracing::debug;

use crate::{
    OutputGraph, Phase, ProblemError,
    address::{Address, INDEPENDENTS_GROUP, Namespace},
    description::{DesignVariable, Driver, Objective, ProblemDescription},
};

/// A problem whose outputs and dependencies have been assembled into a graph.
#[derive(Debug, Clone)]
pub struct BuiltModel {
    pub(crate) problem_id: String,
    pub(crate) namespace: Namespace,
    pub(crate) initial_values: Vec<f64>,
    pub(crate) program: Program,
    pub(crate) graph: OutputGraph,
    pub(crate) driver: Driver,
    pub(crate) design_variables: Vec<DesignVariable>,
    pub(crate) objective: Objective,
}

impl BuiltModel {
    #[must_use]
    pub fn problem_id(&self) -> &str {
        &self.problem_id
    }

    #[must_use]
    pub fn graph(&self) -> &OutputGraph {
        &self.graph
    }
}

/// Validates a description and assembles its output graph.
///
/// Each independent variable and each component output becomes a node;
/// identifiers in the expression become edges from the independent they name
/// to the output being defined.
///
/// # Errors
///
/// - [`ProblemError::Validation`] if the description is malformed, the
///   expression does not parse, or a statement reads another output
/// - [`ProblemError::DuplicateId`] if independents, the component, its
///   outputs and the driver do not all have distinct ids
/// - [`ProblemError::UnresolvedReference`] if the expression names an
///   undeclared identifier
pub fn build_model(description: &ProblemDescription) -> Result<BuiltModel, ProblemError> {
    description.validate()?;

    let component = &description.component;
    let program = Program::parse(&component.expression).map_err(|e| {
        ProblemError::validation(format!("expression of component `{}`: {e}", component.id))
    })?;

    check_unique_ids(description, &program)?;

    let namespace = Namespace::new(
        component.id.clone(),
        description.independents.iter().map(|v| v.id.clone()).collect(),
        program.outputs().map(str::to_string).collect(),
    );

    let mut graph = OutputGraph::new();
    for i in 0..namespace.independents().len() {
        graph.add_output(namespace.path(Address::Independent(i)));
    }

    for (j, assignment) in program.assignments().iter().enumerate() {
        let target = namespace.path(Address::Output(j));
        graph.add_output(target.clone());

        let mut seen = HashSet::new();
        for name in assignment.expr.variables() {
            if !seen.insert(name.as_str()) {
                continue;
            }
            match namespace.resolve(name) {
                Some(address @ Address::Independent(_)) => {
                    graph.connect(namespace.path(address), target.clone(), name.clone());
                }
                Some(Address::Output(_)) => {
                    return Err(ProblemError::validation(format!(
                        "output `{}` of component `{}` reads output `{name}`; \
                         statements may only read independent variables",
                        assignment.output, component.id
                    )));
                }
                None => {
                    return Err(ProblemError::unresolved(
                        name.clone(),
                        format!("expression of component `{}`", component.id),
                    ));
                }
            }
        }
    }

    debug!(
        problem = %description.id,
        phase = %Phase::Built,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "assembled output graph"
    );

    Ok(BuiltModel {
        problem_id: description.id.clone(),
        namespace,
        initial_values: description.independents.iter().map(|v| v.value).collect(),
        program,
        graph,
        driver: description.driver.clone(),
        design_variables: description.design_variables.clone(),
        objective: description.objective.clone(),
    })
}

/// Independents, the component, its outputs and the driver share one namespace.
fn check_unique_ids(description: &ProblemDescription, program: &Program) -> Result<(), ProblemError> {
    let mut seen = HashSet::from([INDEPENDENTS_GROUP]);

    let ids = description
        .independents
        .iter()
        .map(|v| v.id.as_str())
        .chain([description.component.id.as_str()])
        .chain(program.outputs())
        .chain([description.driver.id.as_str()]);

    for id in ids {
        if !seen.insert(id) {
            return Err(ProblemError::duplicate(id));
        }
    }
    Ok(())
}
