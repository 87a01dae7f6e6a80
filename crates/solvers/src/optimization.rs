//! Solvers for bound-constrained minimization problems.
//!
//! An [`OptimizationProblem`] maps solver variables `x: &[f64]` to model
//! inputs, calls the model, and extracts a scalar objective. Solvers in this
//! module search for the `x` inside the bounds that minimizes that objective.
//!
//! # Solvers
//!
//! - [`slsqp`]: gradient-based projected quasi-Newton search using
//!   finite-difference gradients
//! - [`nelder_mead`]: derivative-free simplex search with bound projection
//!
//! Both solvers share [`Event`], [`Action`], [`Solution`], [`Status`] and
//! [`Error`], so an observer written for one works with the other.
//!
//! [`OptimizationProblem`]: mdao_core::OptimizationProblem

mod action;
mod context;
mod error;
mod evaluate;
mod event;
mod solution;

pub use action::Action;
pub use error::Error;
pub use evaluate::{EvalError, EvaluateResult, Evaluation, evaluate};
pub use event::Event;
pub use solution::{Solution, Status};

pub mod nelder_mead;
pub mod slsqp;
