use std::ops::ControlFlow;

use mdao_core::{Bounds, Model, Observer, OptimizationProblem};

use crate::optimization::{
    Action, Error, Event, Solution, Status,
    context::{Halt, SearchContext, Start, check_dimension},
};

use super::{
    Config,
    simplex::{Simplex, Vertex, along, initial_points, project},
};

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;

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

    let start = project(x0.to_vec(), bounds);
    let mut ctx = match SearchContext::start(model, problem, &start, config.max_evals(), observer)? {
        Start::Continue(ctx) => ctx,
        Start::Stop(solution) => return Ok(solution),
    };

    if n == 0 {
        return Ok(ctx.finish(Status::Converged, 0));
    }

    let mut vertices = vec![Vertex {
        f: ctx.best_objective(),
        x: start.clone(),
    }];
    for x in initial_points(&start, bounds).into_iter().skip(1) {
        match ctx.eval(&x)? {
            ControlFlow::Continue(f) => vertices.push(Vertex { x, f }),
            ControlFlow::Break(halt) => return Ok(ctx.finish(halt.status(), 0)),
        }
    }
    let mut simplex = Simplex::new(vertices);

    for iter in 1..=config.max_iters() {
        if is_converged(&simplex, config) {
            return Ok(ctx.finish(Status::Converged, iter - 1));
        }

        if let ControlFlow::Break(halt) = step(&mut ctx, &mut simplex, bounds)? {
            return Ok(ctx.finish(halt.status(), iter - 1));
        }

        let best = simplex.best();
        if let ControlFlow::Break(halt) = ctx.iterated(iter, &best.x, best.f) {
            return Ok(ctx.finish(halt.status(), iter));
        }
    }

    let status = if is_converged(&simplex, config) {
        Status::Converged
    } else {
        Status::MaxIters
    };
    Ok(ctx.finish(status, config.max_iters()))
}

fn is_converged(simplex: &Simplex, config: &Config) -> bool {
    simplex.f_spread() <= config.f_tol() && simplex.x_spread() <= config.x_tol()
}

/// Performs one reflect/expand/contract/shrink update.
fn step<M, P, Obs>(
    ctx: &mut SearchContext<'_, M, P, Obs>,
    simplex: &mut Simplex,
    bounds: &[Bounds],
) -> Result<ControlFlow<Halt>, Error>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'e> Observer<Event<'e>, Action>,
{
    let centroid = simplex.centroid();
    let worst = simplex.worst().clone();

    let reflected = project(along(&centroid, &worst.x, -REFLECT), bounds);
    let f_reflected = match ctx.eval(&reflected)? {
        ControlFlow::Continue(f) => f,
        ControlFlow::Break(halt) => return Ok(ControlFlow::Break(halt)),
    };

    if f_reflected < simplex.best().f {
        let expanded = project(along(&centroid, &worst.x, -EXPAND), bounds);
        let f_expanded = match ctx.eval(&expanded)? {
            ControlFlow::Continue(f) => f,
            ControlFlow::Break(halt) => return Ok(ControlFlow::Break(halt)),
        };

        let vertex = if f_expanded < f_reflected {
            Vertex {
                x: expanded,
                f: f_expanded,
            }
        } else {
            Vertex {
                x: reflected,
                f: f_reflected,
            }
        };
        simplex.replace_worst(vertex);
        return Ok(ControlFlow::Continue(()));
    }

    if f_reflected < simplex.runner_up().f {
        simplex.replace_worst(Vertex {
            x: reflected,
            f: f_reflected,
        });
        return Ok(ControlFlow::Continue(()));
    }

    // Contract toward the better of the reflected and worst points.
    let (target, f_target) = if f_reflected < worst.f {
        (&reflected, f_reflected)
    } else {
        (&worst.x, worst.f)
    };
    let contracted = along(&centroid, target, CONTRACT);
    let f_contracted = match ctx.eval(&contracted)? {
        ControlFlow::Continue(f) => f,
        ControlFlow::Break(halt) => return Ok(ControlFlow::Break(halt)),
    };

    if f_contracted < f_target {
        simplex.replace_worst(Vertex {
            x: contracted,
            f: f_contracted,
        });
        return Ok(ControlFlow::Continue(()));
    }

    let mut shrunk = Vec::new();
    for x in simplex.shrink_points() {
        match ctx.eval(&x)? {
            ControlFlow::Continue(f) => shrunk.push(Vertex { x, f }),
            ControlFlow::Break(halt) => return Ok(ControlFlow::Break(halt)),
        }
    }
    simplex.replace_others(shrunk);

    Ok(ControlFlow::Continue(()))
}
