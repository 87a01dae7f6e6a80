use std::convert::Infallible;

use approx::assert_relative_eq;

use mdao_core::{Bounds, Model, OptimizationProblem};

use super::{Config, minimize, minimize_unobserved};
use crate::optimization::{Action, Event, Status};

/// f(x, y) = (x - 3)² + xy + (y + 4)² - 3, minimized at (20/3, -22/3).
struct Paraboloid;

impl Model for Paraboloid {
    type Input = Vec<f64>;
    type Output = f64;
    type Error = Infallible;

    fn call(&self, v: &Vec<f64>) -> Result<f64, Self::Error> {
        let (x, y) = (v[0], v[1]);
        Ok((x - 3.0).powi(2) + x * y + (y + 4.0).powi(2) - 3.0)
    }
}

struct Direct;

impl OptimizationProblem for Direct {
    type Input = Vec<f64>;
    type Output = f64;
    type Error = Infallible;

    fn dimension(&self) -> usize {
        2
    }

    fn input(&self, x: &[f64]) -> Result<Vec<f64>, Self::Error> {
        Ok(x.to_vec())
    }

    fn objective(&self, _input: &Vec<f64>, output: &f64) -> Result<f64, Self::Error> {
        Ok(*output)
    }
}

fn wide() -> Vec<Bounds> {
    vec![Bounds::new(-50.0, 50.0).unwrap(); 2]
}

#[test]
fn minimizes_paraboloid() {
    let config = Config::new(1000, 10_000, 1e-10)
        .and_then(|c| c.with_x_tol(1e-6))
        .unwrap();

    let solution = minimize_unobserved(&Paraboloid, &Direct, &[3.0, -4.0], &wide(), &config)
        .expect("should solve");

    assert_eq!(solution.status, Status::Converged);
    assert_relative_eq!(solution.x[0], 20.0 / 3.0, epsilon = 1e-4);
    assert_relative_eq!(solution.x[1], -22.0 / 3.0, epsilon = 1e-4);
    assert_relative_eq!(solution.objective, -82.0 / 3.0, epsilon = 1e-8);
}

#[test]
fn respects_bounds() {
    let bounds = [Bounds::new(0.0, 5.0).unwrap(), Bounds::new(-5.0, 0.0).unwrap()];
    let config = Config::new(1000, 10_000, 1e-10)
        .and_then(|c| c.with_x_tol(1e-6))
        .unwrap();
    let mut outside = 0;
    let observer = |event: &Event<'_>| -> Option<Action> {
        if !event.x().iter().zip(&bounds).all(|(&v, b)| b.clamp(v) == v) {
            outside += 1;
        }
        None
    };

    let solution = minimize(&Paraboloid, &Direct, &[1.0, -1.0], &bounds, &config, observer)
        .expect("should solve");

    assert_eq!(outside, 0);
    assert_relative_eq!(solution.x[0], 5.0, epsilon = 1e-4);
    assert_relative_eq!(solution.x[1], -5.0, epsilon = 1e-4);
}

#[test]
fn iteration_limit_returns_best_vertex() {
    let config = Config::new(3, 10_000, 1e-10).unwrap();

    let solution = minimize_unobserved(&Paraboloid, &Direct, &[3.0, -4.0], &wide(), &config)
        .expect("should return best effort");

    assert_eq!(solution.status, Status::MaxIters);
    assert_eq!(solution.iters, 3);
    assert!(solution.objective < -15.0);
}

#[test]
fn evaluation_budget_is_enforced() {
    let config = Config::new(1000, 10, 1e-10).unwrap();

    let solution = minimize_unobserved(&Paraboloid, &Direct, &[3.0, -4.0], &wide(), &config)
        .expect("should return best effort");

    assert_eq!(solution.status, Status::MaxEvals);
    assert_eq!(solution.evals, 10);
}

#[test]
fn observer_stop_on_start_skips_search() {
    let observer = |_: &Event<'_>| Some(Action::StopEarly);

    let solution = minimize(
        &Paraboloid,
        &Direct,
        &[3.0, -4.0],
        &wide(),
        &Config::default(),
        observer,
    )
    .expect("should stop");

    assert_eq!(solution.status, Status::StoppedByObserver);
    assert_eq!(solution.evals, 1);
    assert_eq!(solution.x, vec![3.0, -4.0]);
}

#[test]
fn starts_near_zero_without_collapsing() {
    let config = Config::new(1000, 10_000, 1e-10)
        .and_then(|c| c.with_x_tol(1e-6))
        .unwrap();

    let solution = minimize_unobserved(&Paraboloid, &Direct, &[1e-7, 1e-7], &wide(), &config)
        .expect("should solve");

    assert_eq!(solution.status, Status::Converged);
    assert!(solution.iters > 0);
    assert_relative_eq!(solution.x[0], 20.0 / 3.0, epsilon = 1e-3);
    assert_relative_eq!(solution.x[1], -22.0 / 3.0, epsilon = 1e-3);
    assert_relative_eq!(solution.objective, -82.0 / 3.0, epsilon = 1e-6);
}
