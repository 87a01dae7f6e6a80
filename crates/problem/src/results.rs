use crate::{
    Phase, SolvedModel,
    description::{ResultValue, Solution, SolveStatus},
};

/// Reads the final values out of a solved model.
///
/// The objective comes first, followed by each design variable in request
/// order. Ids are echoed exactly as the request wrote them.
#[must_use]
pub fn collect_results(solved: &SolvedModel) -> Solution {
    let (objective_id, objective_value) = solved.objective();

    let results = std::iter::once(ResultValue {
        id: objective_id.to_string(),
        value: objective_value,
    })
    .chain(solved.design_values().map(|(id, value)| ResultValue {
        id: id.to_string(),
        value,
    }))
    .collect();

    let status = match solved.phase() {
        Phase::Converged => SolveStatus::Converged,
        _ => SolveStatus::NotConverged,
    };

    Solution {
        status,
        message: solved.message().map(str::to_string),
        iterations: solved.iterations(),
        evaluations: solved.evaluations(),
        results,
    }
}
