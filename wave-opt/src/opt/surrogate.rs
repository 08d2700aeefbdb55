use std::fmt::{Display, Formatter};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::mip::{Sense, SolveStatus};
use crate::opt::WaveModel;

/// Weights of the linear surrogate `minimize M·Σopen(a) - K·Σunits(o)·pick(o)`,
/// which stands in for the picked units per opened aisle ratio.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurrogateWeights {
    /// Cost of opening an aisle (M)
    pub aisle_penalty: f64,
    /// Reward per picked unit (K)
    pub unit_reward: f64,
}

impl SurrogateWeights {
    pub fn new(aisle_penalty: f64, unit_reward: f64) -> Self {
        debug_assert!(aisle_penalty > 0.0 && unit_reward > 0.0);
        Self {
            aisle_penalty,
            unit_reward,
        }
    }

    /// Replaces the objective of the live model with the surrogate
    pub fn apply(&self, model: &mut WaveModel) {
        let aisle_terms = model.opens.iter().map(|&open| (open, self.aisle_penalty));
        let order_terms = model
            .picks
            .iter()
            .zip(model.order_units.iter())
            .filter(|(_, units)| **units > 0)
            .map(|(&pick, &units)| (pick, -self.unit_reward * units as f64));

        let terms = aisle_terms.chain(order_terms).collect_vec();
        model.live.set_objective(terms, Sense::Minimize);
    }

    /// Weights for the penalty reweighting step: opening an aisle now costs `factor` times the best
    /// ratio found so far. Under these weights any wave which does not beat that ratio has a
    /// non-negative objective value, while the empty wave scores zero.
    pub fn reweighted(&self, best_ratio: f64, factor: f64) -> Self {
        Self {
            aisle_penalty: best_ratio * factor,
            unit_reward: self.unit_reward,
        }
    }
}

/// Refinement applied after the initial solve, selected by its outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefinementPolicy {
    /// Proven optimum: force ever more aisles open and keep the best ratio
    EscalateAisles,
    /// Unproven solution: re-price aisles at the found ratio and solve once more
    ReweightPenalty,
    /// No solution: give the solver the remaining time once more
    Retry,
}

impl RefinementPolicy {
    pub fn after(status: SolveStatus) -> Self {
        match status {
            SolveStatus::Optimal => RefinementPolicy::EscalateAisles,
            SolveStatus::Feasible => RefinementPolicy::ReweightPenalty,
            SolveStatus::Infeasible | SolveStatus::Unknown => RefinementPolicy::Retry,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RefinementPolicy::EscalateAisles => "escalate_aisles",
            RefinementPolicy::ReweightPenalty => "reweight_penalty",
            RefinementPolicy::Retry => "retry",
        }
    }
}

impl Display for RefinementPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
