use float_cmp::approx_eq;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::entities::ProblemInstance;
use crate::eval;

/// Selected orders and opened aisles of a single wave.
/// Both index sets are kept sorted and free of duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecisionAssignment {
    pub orders: Vec<usize>,
    pub aisles: Vec<usize>,
}

impl DecisionAssignment {
    pub fn new(orders: impl IntoIterator<Item = usize>, aisles: impl IntoIterator<Item = usize>) -> Self {
        Self {
            orders: orders.into_iter().sorted().dedup().collect(),
            aisles: aisles.into_iter().sorted().dedup().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// True if either side of the assignment is empty, such a wave has no defined ratio
    pub fn is_degenerate(&self) -> bool {
        self.orders.is_empty() || self.aisles.is_empty()
    }

    pub fn n_orders(&self) -> usize {
        self.orders.len()
    }

    pub fn n_aisles(&self) -> usize {
        self.aisles.len()
    }
}

/// A [`DecisionAssignment`] together with its independently computed quality.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredSolution {
    pub assignment: DecisionAssignment,
    /// Picked units per opened aisle, 0.0 for degenerate assignments
    pub ratio: f64,
    pub feasible: bool,
    /// Total picked units
    pub units: u64,
}

impl ScoredSolution {
    /// Recomputes feasibility and score of `assignment` from the raw catalogs of `instance`.
    pub fn evaluate(instance: &ProblemInstance, assignment: DecisionAssignment) -> Self {
        let feasible = eval::is_feasible(instance, &assignment);
        let ratio = eval::score(instance, &assignment);
        let units = eval::picked_units(instance, &assignment);
        Self {
            assignment,
            ratio,
            feasible,
            units,
        }
    }

    /// Ordering used to rank candidates: any feasible solution beats an infeasible one,
    /// among feasible ones a strictly (not approximately) higher ratio wins.
    pub fn is_better_than(&self, other: &ScoredSolution) -> bool {
        match (self.feasible, other.feasible) {
            (true, false) => true,
            (false, _) => false,
            (true, true) => {
                self.ratio > other.ratio && !approx_eq!(f64, self.ratio, other.ratio, ulps = 4)
            }
        }
    }
}
