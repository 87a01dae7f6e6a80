//! Bound-constrained quasi-Newton search with finite-difference gradients.
//!
//! # Algorithm
//!
//! Each iteration estimates the gradient with central finite differences,
//! fixes the variables held against a bound by the gradient, and steps along
//! the quasi-Newton direction of the remaining free variables. Trial points
//! are projected back into the bounds and accepted by an Armijo backtracking
//! line search. The inverse Hessian approximation is updated with BFGS
//! whenever the curvature condition holds, and reset to the identity when it
//! stops producing descent directions.
//!
//! For an unconstrained quadratic this behaves like sequential quadratic
//! programming restricted to box constraints, which is the only constraint
//! type declarative problems express.
//!
//! # Convergence
//!
//! The search converges when the infinity norm of the projected gradient
//! drops to `grad_tol`, or when an accepted step is shorter than
//! `step_tol * (1 + |x|)`. It stalls when the line search cannot find a
//! decrease.
//!
//! # Observer Events
//!
//! Every model call (including finite-difference steps) emits [`Event::Evaluated`],
//! and every accepted step emits [`Event::Iterated`]. Returning
//! [`Action::StopEarly`] from either ends the search with the best point so
//! far.

mod bfgs;
mod config;
mod gradient;
mod search;


pub use config::{Config, ConfigError};

use mdao_core::{Bounds, Model, Observer, OptimizationProblem};

use super::{Action, Error, Event, Solution};

/// Minimizes the objective from `x0`, keeping every iterate inside `bounds`.
///
/// Components of `x0` outside their bounds are clamped before the first
/// evaluation.
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
/// This is a convenience wrapper around [`minimize`] that uses a no-op observer.
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
