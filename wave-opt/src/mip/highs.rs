use anyhow::{Result, anyhow};
use ::highs::{HighsModelStatus, RowProblem};
use itertools::Itertools;
use log::debug;

use crate::mip::{LiveModel, MipBackend, MipSolution, Sense, SolveStatus};

/// HiGHS branch-and-cut engine. Honours the time limit of the model: a solve stopped by the limit
/// reports [`SolveStatus::Feasible`] if its incumbent satisfies the model, [`SolveStatus::Unknown`]
/// otherwise.
pub struct HighsBackend {
    n_solves: usize,
}

impl HighsBackend {
    pub const NAME: &'static str = "highs";

    pub fn new() -> Self {
        Self { n_solves: 0 }
    }
}

impl Default for HighsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MipBackend for HighsBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn solve(&mut self, model: &LiveModel) -> Result<MipSolution> {
        self.n_solves += 1;
        let params = model.params();
        debug!(
            "[HIGHS] solve #{} (revision {}, {} vars, {} constraints, limit {:?})",
            self.n_solves,
            model.revision(),
            model.n_vars(),
            model.constraints().len(),
            params.time_limit
        );

        let mut costs = vec![0.0; model.n_vars()];
        for &(var, coef) in &model.objective().terms {
            costs[var.index()] += coef;
        }

        let mut pb = RowProblem::new();
        let cols = costs
            .iter()
            .map(|&cost| pb.add_integer_column(cost, 0.0..=1.0))
            .collect_vec();
        for c in model.constraints() {
            let terms = c.terms.iter().map(|&(var, coef)| (cols[var.index()], coef)).collect_vec();
            pb.add_row(c.lb..=c.ub, terms);
        }

        let sense = match model.objective().sense {
            Sense::Minimize => ::highs::Sense::Minimise,
            Sense::Maximize => ::highs::Sense::Maximise,
        };
        let mut highs_model = pb.optimise(sense);
        highs_model.make_quiet();
        if let Some(limit) = params.time_limit {
            highs_model.set_option("time_limit", limit.as_secs_f64());
        }

        let solved = highs_model.solve();
        let status = solved.status();
        debug!("[HIGHS] solve #{} finished with {status:?}", self.n_solves);

        match status {
            HighsModelStatus::Optimal | HighsModelStatus::ModelEmpty => {
                let values = solved.get_solution().columns().to_vec();
                Ok(MipSolution::new(SolveStatus::Optimal, values))
            }
            HighsModelStatus::Infeasible => Ok(MipSolution::without_solution(SolveStatus::Infeasible)),
            HighsModelStatus::ReachedTimeLimit
            | HighsModelStatus::ReachedIterationLimit
            | HighsModelStatus::ObjectiveBound
            | HighsModelStatus::ObjectiveTarget => {
                let values = solved.get_solution().columns().to_vec();
                match incumbent(model, &values) {
                    Some(values) => Ok(MipSolution::new(SolveStatus::Feasible, values)),
                    None => Ok(MipSolution::without_solution(SolveStatus::Unknown)),
                }
            }
            HighsModelStatus::UnboundedOrInfeasible | HighsModelStatus::Unbounded => {
                Ok(MipSolution::without_solution(SolveStatus::Unknown))
            }
            status => Err(anyhow!("highs stopped with status {status:?}")),
        }
    }
}

/// Rounded values of an interrupted solve, `None` unless they are integral and satisfy every constraint
fn incumbent(model: &LiveModel, values: &[f64]) -> Option<Vec<f64>> {
    const TOL: f64 = 1e-6;
    if values.len() != model.n_vars() || values.iter().any(|v| (v - v.round()).abs() > TOL) {
        return None;
    }
    let rounded = values.iter().map(|v| v.round()).collect_vec();
    model
        .constraints()
        .iter()
        .all(|c| c.is_satisfied_by(&rounded))
        .then_some(rounded)
}
