//! Derivative-free simplex search constrained to a box.
//!
//! # Algorithm
//!
//! The classic Nelder-Mead method keeps `n + 1` vertices, replaces the worst
//! one by reflecting it through the centroid of the others, and expands,
//! contracts or shrinks the simplex depending on how the reflected point
//! compares. Reflected and expanded points are projected onto the bounds, so
//! every evaluated vertex is feasible.
//!
//! The initial simplex perturbs each coordinate of the start point by 5%
//! (or `0.00025` for a zero coordinate), stepping inward when the
//! perturbation would cross the upper bound.
//!
//! # Convergence
//!
//! The search converges once the objective spread across vertices is at most
//! `f_tol` and every vertex lies within `x_tol` of the best one.

mod config;
mod search;
mod simplex;

#[cfg(test)]
mod tests;

pub use config::{Config, ConfigError};

use mdao_core::{Bounds, Model, Observer, OptimizationProblem};

use super::{Action, Error, Event, Solution};

/// Minimizes the objective from `x0`, keeping every vertex inside `bounds`.
///
/// # Errors
///
/// Returns an error if `x0`, `bounds` and the problem disagree on the
/// dimension, if the model or problem fails, or if the objective is not
/// finite at an evaluated point.
pub fn minimize<M, P, Obs>(
    model: &M,
    problem: &P,
    x0: &[f64],
    bounds: &[Bounds],
    config: &Config,
    observer: Obs,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    search::search(model, problem, x0, bounds, config, observer)
}

/// Minimizes the objective without observer support.
///
/// # Errors
///
/// See [`minimize`].
pub fn minimize_unobserved<M, P>(
    model: &M,
    problem: &P,
    x0: &[f64],
    bounds: &[Bounds],
    config: &Config,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
{
    minimize(model, problem, x0, bounds, config, ())
}
