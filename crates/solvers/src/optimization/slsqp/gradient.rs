use std::ops::ControlFlow;

use mdao_core::{Bounds, Model, Observer, OptimizationProblem};

use crate::optimization::{
    Action, Error, Event,
    context::{Halt, SearchContext},
};

/// Estimates the gradient at `x` by finite differences.
///
/// Each variable is stepped by `fd_step * max(1, |x_i|)`, shortened on the side
/// where a bound is closer than that. Both sides available gives a central
/// difference, one side gives a one-sided difference, and a variable pinned
/// by a degenerate interval gets a zero component.
pub(super) fn gradient<M, P, Obs>(
    ctx: &mut SearchContext<'_, M, P, Obs>,
    x: &[f64],
    fx: f64,
    bounds: &[Bounds],
    fd_step: f64,
) -> Result<ControlFlow<Halt, Vec<f64>>, Error>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'e> Observer<Event<'e>, Action>,
{
    let mut grad = Vec::with_capacity(x.len());
    let mut shifted = x.to_vec();

    for (i, b) in bounds.iter().enumerate() {
        let h = fd_step * x[i].abs().max(1.0);
        let up = h.min(b.upper() - x[i]);
        let down = h.min(x[i] - b.lower());

        let f_up = if up > 0.0 {
            shifted[i] = x[i] + up;
            match ctx.sample(&shifted)? {
                ControlFlow::Continue(f) => f,
                ControlFlow::Break(halt) => return Ok(ControlFlow::Break(halt)),
            }
        } else {
            fx
        };

        let f_down = if down > 0.0 {
            shifted[i] = x[i] - down;
            match ctx.sample(&shifted)? {
                ControlFlow::Continue(f) => f,
                ControlFlow::Break(halt) => return Ok(ControlFlow::Break(halt)),
            }
        } else {
            fx
        };

        shifted[i] = x[i];

        let span = up.max(0.0) + down.max(0.0);
        grad.push(if span > 0.0 { (f_up - f_down) / span } else { 0.0 });
    }

    Ok(ControlFlow::Continue(grad))
}

/// Returns the infinity norm of the projected gradient step.
///
/// A component is zero when moving against the gradient would leave the
/// bounds, so the norm vanishes at a bound-constrained stationary point.
pub(super) fn projected_norm(x: &[f64], grad: &[f64], bounds: &[Bounds]) -> f64 {
    x.iter()
        .zip(grad)
        .zip(bounds)
        .map(|((&xi, &gi), b)| (b.clamp(xi - gi) - xi).abs())
        .fold(0.0, f64::max)
}

/// Marks the variables that are free to move.
///
/// A variable sitting on a bound with the gradient pushing it outward is
/// held fixed for the current iteration.
pub(super) fn free_variables(x: &[f64], grad: &[f64], bounds: &[Bounds]) -> Vec<bool> {
    x.iter()
        .zip(grad)
        .zip(bounds)
        .map(|((&xi, &gi), b)| {
            let pinned_low = xi <= b.lower() && gi > 0.0;
            let pinned_high = xi >= b.upper() && gi < 0.0;
            b.width() > 0.0 && !pinned_low && !pinned_high
        })
        .collect()
}
