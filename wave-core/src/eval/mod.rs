//! Independent validation and scoring of [`DecisionAssignment`]s.
//!
//! Everything here is recomputed from the raw order and aisle catalogs. Values reported by a solver
//! are never trusted.

use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::entities::{DecisionAssignment, ProblemInstance};

/// First condition found violated by an assignment
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("no orders or no aisles selected")]
    EmptySelection,
    #[error("order {0} does not exist")]
    OrderOutOfRange(usize),
    #[error("aisle {0} does not exist")]
    AisleOutOfRange(usize),
    #[error("item {item} referenced by {entry} lies outside the item universe")]
    ItemOutOfRange { item: usize, entry: CatalogEntry },
    #[error("{units} units picked, wave lower bound is {lb}")]
    WaveBelowLowerBound { units: u64, lb: u64 },
    #[error("{units} units picked, wave upper bound is {ub}")]
    WaveAboveUpperBound { units: u64, ub: u64 },
    #[error("item {item}: {picked} units picked but only {available} available")]
    InsufficientSupply { item: usize, picked: u64, available: u64 },
}

/// Reference to an order or aisle of an instance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogEntry {
    Order(usize),
    Aisle(usize),
}

impl CatalogEntry {
    /// Position of the entry in its catalog
    pub fn position(&self) -> usize {
        match self {
            CatalogEntry::Order(pos) | CatalogEntry::Aisle(pos) => *pos,
        }
    }
}

impl Display for CatalogEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogEntry::Order(id) => write!(f, "order {id}"),
            CatalogEntry::Aisle(id) => write!(f, "aisle {id}"),
        }
    }
}

/// Checks the assignment against the wave-size band and the per-item supply bound.
pub fn validate(instance: &ProblemInstance, assignment: &DecisionAssignment) -> Result<(), Violation> {
    if assignment.is_degenerate() {
        return Err(Violation::EmptySelection);
    }
    if let Some(&o) = assignment.orders.iter().find(|&&o| o >= instance.n_orders()) {
        return Err(Violation::OrderOutOfRange(o));
    }
    if let Some(&a) = assignment.aisles.iter().find(|&&a| a >= instance.n_aisles()) {
        return Err(Violation::AisleOutOfRange(a));
    }

    let mut picked = vec![0u64; instance.n_items];
    let mut available = vec![0u64; instance.n_items];

    for &o in &assignment.orders {
        for (item, qty) in instance.order(o).demand.iter() {
            match picked.get_mut(item) {
                Some(p) => *p += qty,
                None => {
                    return Err(Violation::ItemOutOfRange {
                        item,
                        entry: CatalogEntry::Order(o),
                    });
                }
            }
        }
    }
    for &a in &assignment.aisles {
        for (item, qty) in instance.aisle(a).supply.iter() {
            match available.get_mut(item) {
                Some(av) => *av += qty,
                None => {
                    return Err(Violation::ItemOutOfRange {
                        item,
                        entry: CatalogEntry::Aisle(a),
                    });
                }
            }
        }
    }

    let units: u64 = picked.iter().sum();
    let bounds = instance.wave_bounds;
    if units < bounds.lb {
        return Err(Violation::WaveBelowLowerBound { units, lb: bounds.lb });
    }
    if units > bounds.ub {
        return Err(Violation::WaveAboveUpperBound { units, ub: bounds.ub });
    }

    match picked
        .iter()
        .zip(available.iter())
        .enumerate()
        .find(|(_, (p, a))| p > a)
    {
        Some((item, (&picked, &available))) => Err(Violation::InsufficientSupply {
            item,
            picked,
            available,
        }),
        None => Ok(()),
    }
}

/// True if the assignment is non-empty, within the wave-size band and never picks more of an item
/// than the opened aisles hold.
pub fn is_feasible(instance: &ProblemInstance, assignment: &DecisionAssignment) -> bool {
    validate(instance, assignment).is_ok()
}

/// Units picked by the selected orders. Indices outside the instance are ignored.
pub fn picked_units(instance: &ProblemInstance, assignment: &DecisionAssignment) -> u64 {
    assignment
        .orders
        .iter()
        .filter_map(|&o| instance.orders.get(o))
        .map(|o| o.total_units())
        .sum()
}

/// Picked units per opened aisle, 0.0 if no orders or no aisles are selected.
pub fn score(instance: &ProblemInstance, assignment: &DecisionAssignment) -> f64 {
    if assignment.is_degenerate() {
        return 0.0;
    }
    picked_units(instance, assignment) as f64 / assignment.n_aisles() as f64
}
