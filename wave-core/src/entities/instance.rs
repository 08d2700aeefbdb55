use serde::{Deserialize, Serialize};

use crate::entities::{Aisle, Order};
use crate::util::assertions::instance_ids_consecutive;

/// Inclusive band `[lb, ub]` on the total number of units picked in a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveBounds {
    pub lb: u64,
    pub ub: u64,
}

impl WaveBounds {
    pub fn new(lb: u64, ub: u64) -> Self {
        Self { lb, ub }
    }

    pub fn contains(&self, units: u64) -> bool {
        self.lb <= units && units <= self.ub
    }

    /// Lower bound used when modelling the wave: a wave of zero units is degenerate for the
    /// units-per-aisle ratio, so the bound never drops below one.
    pub fn floored_lb(&self) -> u64 {
        self.lb.max(1)
    }

    pub fn is_inverted(&self) -> bool {
        self.ub < self.lb
    }
}

/// Static representation of a wave picking problem.
/// Owned by the caller, borrowed read-only by everything that evaluates or optimizes it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProblemInstance {
    pub orders: Vec<Order>,
    pub aisles: Vec<Aisle>,
    /// Size of the item universe, item ids range over `0..n_items`
    pub n_items: usize,
    pub wave_bounds: WaveBounds,
}

impl ProblemInstance {
    pub fn new(orders: Vec<Order>, aisles: Vec<Aisle>, n_items: usize, wave_bounds: WaveBounds) -> Self {
        debug_assert!(instance_ids_consecutive(&orders, &aisles));
        Self {
            orders,
            aisles,
            n_items,
            wave_bounds,
        }
    }

    pub fn order(&self, id: usize) -> &Order {
        &self.orders[id]
    }

    pub fn aisle(&self, id: usize) -> &Aisle {
        &self.aisles[id]
    }

    pub fn n_orders(&self) -> usize {
        self.orders.len()
    }

    pub fn n_aisles(&self) -> usize {
        self.aisles.len()
    }

    /// Units demanded over all orders
    pub fn total_demand(&self) -> u64 {
        self.orders.iter().map(|o| o.total_units()).sum()
    }

    /// Units stocked over all aisles
    pub fn total_supply(&self) -> u64 {
        self.aisles.iter().map(|a| a.total_units()).sum()
    }
}
