use serde::{Deserialize, Serialize};

use crate::entities::{ProblemInstance, ScoredSolution, WaveBounds};
use crate::index::DemandSupplyIndex;

/// External summary of a [`ProblemInstance`]
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtInstanceSummary {
    pub n_orders: usize,
    pub n_aisles: usize,
    pub n_items: usize,
    pub wave_bounds: WaveBounds,
    /// Units demanded over all orders
    pub total_demand: u64,
    /// Units stocked over all aisles
    pub total_supply: u64,
    /// Items demanded by at least one order
    pub n_demanded_items: usize,
    /// Items of which more units are demanded than stocked
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub short_items: Vec<usize>,
}

impl ExtInstanceSummary {
    pub fn new(instance: &ProblemInstance, index: &DemandSupplyIndex) -> Self {
        Self {
            n_orders: instance.n_orders(),
            n_aisles: instance.n_aisles(),
            n_items: instance.n_items,
            wave_bounds: instance.wave_bounds,
            total_demand: index.item_demand.iter().sum(),
            total_supply: index.item_supply.iter().sum(),
            n_demanded_items: index.demanded_items().count(),
            short_items: index.short_items().collect(),
        }
    }
}

/// External representation of a [`ScoredSolution`]
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtSolution {
    pub orders: Vec<usize>,
    pub aisles: Vec<usize>,
    pub units: u64,
    pub ratio: f64,
    pub feasible: bool,
}

impl From<&ScoredSolution> for ExtSolution {
    fn from(solution: &ScoredSolution) -> Self {
        Self {
            orders: solution.assignment.orders.clone(),
            aisles: solution.assignment.aisles.clone(),
            units: solution.units,
            ratio: solution.ratio,
            feasible: solution.feasible,
        }
    }
}
