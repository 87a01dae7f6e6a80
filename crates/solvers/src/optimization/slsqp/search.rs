use std::ops::ControlFlow;

use mdao_core::{Bounds, Model, Observer, OptimizationProblem};

use crate::optimization::{
    Action, Error, Event, Solution, Status,
    context::{Halt, SearchContext, Start, check_dimension},
};

use super::{
    Config,
    bfgs::{InverseHessian, dot},
    gradient::{free_variables, gradient, projected_norm},
};

/// Sufficient-decrease constant for the Armijo condition.
const ARMIJO: f64 = 1e-4;

/// Maximum number of step halvings per line search.
const MAX_BACKTRACKS: usize = 40;

/// Multiple of the rounding error in `f` treated as gradient noise.
const NOISE_FACTOR: f64 = 4.0;

pub(super) fn search<M, P, Obs>(
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
    let n = problem.dimension();
    check_dimension(n, x0.len())?;
    check_dimension(n, bounds.len())?;

    let mut x: Vec<f64> = x0.iter().zip(bounds).map(|(&v, b)| b.clamp(v)).collect();

    let mut ctx = match SearchContext::start(model, problem, &x, config.max_evals(), observer)? {
        Start::Continue(ctx) => ctx,
        Start::Stop(solution) => return Ok(solution),
    };
    let mut fx = ctx.best_objective();

    if n == 0 {
        return Ok(ctx.finish(Status::Converged, 0));
    }

    let mut grad = match gradient(&mut ctx, &x, fx, bounds, config.fd_step())? {
        ControlFlow::Continue(grad) => grad,
        ControlFlow::Break(halt) => return Ok(ctx.finish(halt.status(), 0)),
    };
    let mut hessian = InverseHessian::identity(n);

    for iter in 1..=config.max_iters() {
        if projected_norm(&x, &grad, bounds) <= gradient_tolerance(config, fx) {
            return Ok(ctx.finish(Status::Converged, iter - 1));
        }

        let free = free_variables(&x, &grad, bounds);
        let mut direction = hessian.direction(&grad, &free);
        if dot(&grad, &direction) >= 0.0 {
            hessian.reset();
            direction = hessian.direction(&grad, &free);
        }

        let (x_new, f_new) = match line_search(&mut ctx, &x, fx, &grad, &direction, bounds)? {
            LineSearch::Accepted { x, objective } => (x, objective),
            LineSearch::Failed => {
                // No representable decrease left along a descent direction.
                let predicted = -dot(&grad, &direction);
                let status = if predicted <= config.grad_tol() * fx.abs().max(1.0) {
                    Status::Converged
                } else {
                    Status::Stalled
                };
                return Ok(ctx.finish(status, iter - 1));
            }
            LineSearch::Halted(halt) => return Ok(ctx.finish(halt.status(), iter - 1)),
        };

        let grad_new = match gradient(&mut ctx, &x_new, f_new, bounds, config.fd_step())? {
            ControlFlow::Continue(grad) => grad,
            ControlFlow::Break(halt) => return Ok(ctx.finish(halt.status(), iter)),
        };

        let step: Vec<f64> = x_new.iter().zip(&x).map(|(a, b)| a - b).collect();
        let grad_change: Vec<f64> = grad_new.iter().zip(&grad).map(|(a, b)| a - b).collect();
        hessian.update(&step, &grad_change);

        let step_len = inf_norm(&step);
        x = x_new;
        fx = f_new;
        grad = grad_new;

        if let ControlFlow::Break(halt) = ctx.iterated(iter, &x, fx) {
            return Ok(ctx.finish(halt.status(), iter));
        }

        if step_len <= config.step_tol() * (1.0 + inf_norm(&x)) {
            return Ok(ctx.finish(Status::Converged, iter));
        }
    }

    let status = if projected_norm(&x, &grad, bounds) <= gradient_tolerance(config, fx) {
        Status::Converged
    } else {
        Status::MaxIters
    };
    Ok(ctx.finish(status, config.max_iters()))
}

enum LineSearch {
    Accepted { x: Vec<f64>, objective: f64 },
    Failed,
    Halted(Halt),
}

/// Projected Armijo backtracking along `direction`.
fn line_search<M, P, Obs>(
    ctx: &mut SearchContext<'_, M, P, Obs>,
    x: &[f64],
    fx: f64,
    grad: &[f64],
    direction: &[f64],
    bounds: &[Bounds],
) -> Result<LineSearch, Error>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'e> Observer<Event<'e>, Action>,
{
    let mut alpha = 1.0;

    for _ in 0..MAX_BACKTRACKS {
        let trial: Vec<f64> = x
            .iter()
            .zip(direction)
            .zip(bounds)
            .map(|((&xi, &di), b)| b.clamp(xi + alpha * di))
            .collect();

        if trial == x {
            return Ok(LineSearch::Failed);
        }

        let predicted: f64 = grad
            .iter()
            .zip(trial.iter().zip(x))
            .map(|(g, (t, xi))| g * (t - xi))
            .sum();

        let objective = match ctx.eval(&trial)? {
            ControlFlow::Continue(f) => f,
            ControlFlow::Break(halt) => return Ok(LineSearch::Halted(halt)),
        };

        if objective < fx && objective <= fx + ARMIJO * predicted.min(0.0) {
            return Ok(LineSearch::Accepted {
                x: trial,
                objective,
            });
        }

        alpha *= 0.5;
    }

    Ok(LineSearch::Failed)
}

/// Returns the projected-gradient norm that counts as stationary at `fx`.
///
/// Rounding in `f` perturbs each difference quotient by about
/// `EPSILON * |f| / h`. Once that exceeds `grad_tol` the gradient can no
/// longer be resolved, so the tolerance is raised to the noise level.
pub(super) fn gradient_tolerance(config: &Config, fx: f64) -> f64 {
    let noise = NOISE_FACTOR * f64::EPSILON * fx.abs().max(1.0) / config.fd_step();
    config.grad_tol().max(noise)
}

fn inf_norm(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |acc, x| acc.max(x.abs()))
}
