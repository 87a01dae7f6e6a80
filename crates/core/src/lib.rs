//! Core traits and types for declarative design optimization.
//!
//! This crate defines the shared abstractions that solvers and problem
//! assemblies build on:
//!
//! - [`Model`]: a callable that maps a typed input to a typed output
//! - [`Snapshot`]: a captured input/output pair from a model call
//! - [`Observer`]: receives solver events and optionally returns control actions
//! - [`OptimizationProblem`]: adapts solver variables to model inputs and
//!   extracts a scalar objective from outputs
//! - [`Bounds`]: a closed interval a solver variable must stay inside

mod bounds;
mod model;
mod observer;
mod problem;

pub use bounds::{Bounds, BoundsError};
pub use model::{Model, Snapshot};
pub use observer::Observer;
pub use problem::OptimizationProblem;
