//! Declarative optimization problems.
//!
//! A [`ProblemDescription`] names independent variables, one algebraic
//! component, an optimizer, bounded design variables and an objective. This
//! crate turns it into an executable graph and drives an optimizer over it:
//!
//! 1. [`build_model`] validates the description and assembles the
//!    [`OutputGraph`], yielding a [`BuiltModel`].
//! 2. [`wire`] binds component inputs to independent variables by name,
//!    yielding a [`WiredModel`].
//! 3. [`configure_driver`] selects the optimizer and registers design
//!    variables and the objective, yielding an [`AttachedProblem`].
//! 4. [`Executor::run`] solves it, yielding a [`SolvedModel`].
//! 5. [`collect_results`] reads the objective and design values into a
//!    [`Solution`].
//!
//! Each step consumes the previous step's output, so phases cannot be
//! skipped or repeated. [`solve`] runs the whole pipeline.
//!
//! Outputs are addressed by bare name (`x`, `f`) or qualified path
//! (`indeps.x`, `paraboloid.f`).

mod address;
mod builder;
mod cancel;
mod connector;
mod description;
mod driver;
mod error;
mod executor;
mod graph;
mod phase;
mod results;

#[cfg(test)]
mod testing;

pub use address::INDEPENDENTS_GROUP;
pub use builder::{BuiltModel, build_model};
pub use cancel::CancelToken;
pub use connector::{WiredModel, wire};
pub use description::{
    Component, DesignVariable, Driver, DriverOptions, IndependentVariable, Objective,
    ProblemDescription, ResultValue, Solution, SolveStatus,
};
pub use driver::{AttachedProblem, DesignSlot, ObjectiveSource, Optimizer, configure_driver};
pub use error::{ErrorKind, ProblemError};
pub use executor::{Executor, SolvedModel};
pub use graph::{Connection, OutputGraph};
pub use phase::Phase;
pub use results::collect_results;

use tracing::debug;

/// Solves a problem with no timeout.
///
/// # Errors
///
/// See [`solve_with`].
pub fn solve(description: &ProblemDescription) -> Result<Solution, ProblemError> {
    solve_with(description, &Executor::new())
}

/// Runs every phase of the pipeline with the given executor.
///
/// A solve that exhausts its iteration or evaluation budget still succeeds,
/// reporting [`SolveStatus::NotConverged`] with the best values found.
///
/// # Errors
///
/// Returns the first [`ProblemError`] raised by any phase.
pub fn solve_with(
    description: &ProblemDescription,
    executor: &Executor,
) -> Result<Solution, ProblemError> {
    debug!(problem = %description.id, phase = %Phase::Uninitialized, "received problem");

    let built = build_model(description)?;
    let wired = wire(built)?;
    let attached = configure_driver(wired)?;
    let solved = executor.run(attached)?;

    Ok(collect_results(&solved))
}
