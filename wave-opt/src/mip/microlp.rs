use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;

use anyhow::{Context, Result, anyhow};
use good_lp::solvers::microlp::microlp;
use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, constraint,
    variable,
};
use itertools::Itertools;
use log::{debug, warn};

use crate::mip::{LiveModel, MipBackend, MipSolution, Sense, SolveStatus, Term};

/// Pure Rust branch-and-bound engine, driven through `good_lp`.
///
/// The engine itself cannot be interrupted. Every solve runs on its own worker thread and the
/// backend stops waiting once the time limit of the model has passed, reporting
/// [`SolveStatus::Unknown`]. An abandoned worker keeps running in the background until it
/// finishes, its result is discarded. Solutions which do arrive in time are proven optimal.
/// The worker count is advisory only.
pub struct MicrolpBackend {
    n_solves: usize,
}

impl MicrolpBackend {
    pub const NAME: &'static str = "microlp";

    pub fn new() -> Self {
        Self { n_solves: 0 }
    }
}

impl Default for MicrolpBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MipBackend for MicrolpBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn solve(&mut self, model: &LiveModel) -> Result<MipSolution> {
        self.n_solves += 1;
        let params = model.params();
        debug!(
            "[MICROLP] solve #{} (revision {}, {} vars, {} constraints, limit {:?}, {} workers requested)",
            self.n_solves,
            model.revision(),
            model.n_vars(),
            model.constraints().len(),
            params.time_limit,
            params.workers
        );

        let Some(limit) = params.time_limit else {
            return solve_to_completion(model);
        };

        let (tx, rx) = mpsc::channel();
        let owned = model.clone();
        thread::Builder::new()
            .name(format!("microlp-{}", self.n_solves))
            .spawn(move || {
                //the receiver is gone if the solve was abandoned
                let _ = tx.send(solve_to_completion(&owned));
            })
            .context("could not spawn microlp worker")?;

        match rx.recv_timeout(limit) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "[MICROLP] no result within {}ms, abandoning solve #{}",
                    limit.as_millis(),
                    self.n_solves
                );
                Ok(MipSolution::without_solution(SolveStatus::Unknown))
            }
            Err(RecvTimeoutError::Disconnected) => Err(anyhow!("microlp worker terminated without a result")),
        }
    }
}

fn solve_to_completion(model: &LiveModel) -> Result<MipSolution> {
    //constraints without terms are decided here, the engine does not accept them
    let trivially_violated = model
        .constraints()
        .iter()
        .filter(|c| c.terms.is_empty())
        .find(|c| c.lb > 0.0 || c.ub < 0.0);
    if let Some(c) = trivially_violated {
        debug!("[MICROLP] constraint {} cannot be satisfied", c.name);
        return Ok(MipSolution::without_solution(SolveStatus::Infeasible));
    }

    let mut vars = ProblemVariables::new();
    let handles = model
        .vars()
        .iter()
        .map(|v| vars.add(variable().binary().name(v.name.clone())))
        .collect_vec();

    let objective = expression(&model.objective().terms, &handles);
    let unsolved = match model.objective().sense {
        Sense::Minimize => vars.minimise(objective),
        Sense::Maximize => vars.maximise(objective),
    };
    let mut problem = unsolved.using(microlp);

    for c in model.constraints().iter().filter(|c| !c.terms.is_empty()) {
        let expr = expression(&c.terms, &handles);
        let (lb, ub) = (c.lb, c.ub);
        if lb.is_finite() && lb == ub {
            problem.add_constraint(constraint!(expr == lb));
            continue;
        }
        if lb.is_finite() {
            problem.add_constraint(constraint!(expr.clone() >= lb));
        }
        if ub.is_finite() {
            problem.add_constraint(constraint!(expr <= ub));
        }
    }

    match problem.solve() {
        Ok(solution) => {
            let values = handles.iter().map(|h| solution.value(*h)).collect_vec();
            debug_assert!(model.constraints().iter().all(|c| c.is_satisfied_by(&values)));
            Ok(MipSolution::new(SolveStatus::Optimal, values))
        }
        Err(ResolutionError::Infeasible) => Ok(MipSolution::without_solution(SolveStatus::Infeasible)),
        Err(ResolutionError::Unbounded) => Ok(MipSolution::without_solution(SolveStatus::Unknown)),
        Err(e) => Err(anyhow!("microlp failed: {e}")),
    }
}

fn expression(terms: &[Term], handles: &[Variable]) -> Expression {
    let mut expr = Expression::with_capacity(terms.len());
    for &(var, coef) in terms {
        expr.add_mul(coef, handles[var.index()]);
    }
    expr
}
