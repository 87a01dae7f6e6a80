//! Numerical optimizers for declarative design problems.
//!
//! Solvers in this crate work with any [`Model`] and [`OptimizationProblem`]
//! from `mdao-core`. They keep every iterate inside the supplied [`Bounds`],
//! report progress through an [`Observer`], and never rely on randomness, so
//! identical inputs always produce identical solutions.
//!
//! [`Model`]: mdao_core::Model
//! [`OptimizationProblem`]: mdao_core::OptimizationProblem
//! [`Bounds`]: mdao_core::Bounds
//! [`Observer`]: mdao_core::Observer

pub mod optimization;
