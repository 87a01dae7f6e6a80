use std::ops::ControlFlow;

use mdao_core::{Model, Observer, OptimizationProblem};

use super::{Action, Error, Evaluation, Event, Solution, Status, evaluate};

/// Why a search must stop before reaching its own termination criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Halt {
    Observer,
    Budget,
}

impl Halt {
    pub(super) fn status(self) -> Status {
        match self {
            Self::Observer => Status::StoppedByObserver,
            Self::Budget => Status::MaxEvals,
        }
    }
}

/// Outcome of starting a search at the initial point.
pub(super) enum Start<C, S> {
    Continue(C),
    Stop(S),
}

/// Shared evaluation bookkeeping for the optimization solvers.
///
/// Every model call goes through [`SearchContext::eval`], which enforces the
/// evaluation budget, keeps the best point seen so far, and reports each
/// evaluation to the observer.
pub(super) struct SearchContext<'a, M, P, Obs>
where
    M: Model,
{
    model: &'a M,
    problem: &'a P,
    observer: Obs,
    max_evals: usize,
    evals: usize,
    best: Evaluation<M::Input, M::Output>,
}

impl<'a, M, P, Obs> SearchContext<'a, M, P, Obs>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'e> Observer<Event<'e>, Action>,
{
    /// Evaluates the starting point, which always counts as one evaluation.
    pub(super) fn start(
        model: &'a M,
        problem: &'a P,
        x0: &[f64],
        max_evals: usize,
        mut observer: Obs,
    ) -> Result<Start<Self, Solution<M::Input, M::Output>>, Error> {
        let first = evaluate(model, problem, x0)?;

        let event = Event::Evaluated {
            x: &first.x,
            objective: first.objective,
            evals: 1,
        };
        let stop = matches!(observer.observe(&event), Some(Action::StopEarly));

        let context = Self {
            model,
            problem,
            observer,
            max_evals,
            evals: 1,
            best: first,
        };

        if stop {
            Ok(Start::Stop(context.finish(Status::StoppedByObserver, 0)))
        } else {
            Ok(Start::Continue(context))
        }
    }

    /// Evaluates the objective at a candidate point.
    ///
    /// The point becomes the reported best if it improves on every earlier
    /// candidate.
    pub(super) fn eval(&mut self, x: &[f64]) -> Result<ControlFlow<Halt, f64>, Error> {
        self.eval_tracked(x, true)
    }

    /// Evaluates the objective at an auxiliary point, such as a
    /// finite-difference step, that is never reported as a result.
    pub(super) fn sample(&mut self, x: &[f64]) -> Result<ControlFlow<Halt, f64>, Error> {
        self.eval_tracked(x, false)
    }

    fn eval_tracked(&mut self, x: &[f64], candidate: bool) -> Result<ControlFlow<Halt, f64>, Error> {
        if self.evals >= self.max_evals {
            return Ok(ControlFlow::Break(Halt::Budget));
        }

        let evaluation = evaluate(self.model, self.problem, x)?;
        self.evals += 1;

        let objective = evaluation.objective;
        let event = Event::Evaluated {
            x,
            objective,
            evals: self.evals,
        };
        let action = self.observer.observe(&event);

        if candidate && objective < self.best.objective {
            self.best = evaluation;
        }

        match action {
            Some(Action::StopEarly) => Ok(ControlFlow::Break(Halt::Observer)),
            None => Ok(ControlFlow::Continue(objective)),
        }
    }

    /// Reports a completed iteration to the observer.
    pub(super) fn iterated(&mut self, iter: usize, x: &[f64], objective: f64) -> ControlFlow<Halt> {
        let event = Event::Iterated { iter, x, objective };
        match self.observer.observe(&event) {
            Some(Action::StopEarly) => ControlFlow::Break(Halt::Observer),
            None => ControlFlow::Continue(()),
        }
    }

    pub(super) fn best_objective(&self) -> f64 {
        self.best.objective
    }

    pub(super) fn finish(self, status: Status, iters: usize) -> Solution<M::Input, M::Output> {
        let Evaluation {
            x,
            objective,
            snapshot,
        } = self.best;

        Solution {
            status,
            x,
            objective,
            snapshot,
            iters,
            evals: self.evals,
        }
    }
}

/// Checks that the problem, initial point and bounds agree on the dimension.
pub(super) fn check_dimension(expected: usize, found: usize) -> Result<(), Error> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::Dimension { expected, found })
    }
}
