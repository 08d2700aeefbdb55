use itertools::Itertools;

use crate::entities::{ItemQtys, Order, ProblemInstance};
use crate::util::assertions::index_matches_instance;

/// Total units demanded per order. Empty orders yield 0.
pub fn order_totals(orders: &[Order]) -> Vec<u64> {
    orders.iter().map(|o| o.total_units()).collect_vec()
}

/// Aggregates quantities per item over a catalog of item bags (order demands or aisle supplies).
/// Entries referring to items outside `0..n_items` are ignored.
pub fn item_aggregates<'a>(bags: impl IntoIterator<Item = &'a ItemQtys>, n_items: usize) -> Vec<u64> {
    let mut aggregates = vec![0; n_items];
    for bag in bags {
        for (item, qty) in bag.iter() {
            if let Some(agg) = aggregates.get_mut(item) {
                *agg += qty;
            }
        }
    }
    aggregates
}

/// Precomputed demand and supply figures of a [`ProblemInstance`].
#[derive(Clone, Debug)]
pub struct DemandSupplyIndex {
    /// Units demanded by each order
    pub order_units: Vec<u64>,
    /// Units of each item demanded over all orders
    pub item_demand: Vec<u64>,
    /// Units of each item stocked over all aisles
    pub item_supply: Vec<u64>,
}

impl DemandSupplyIndex {
    pub fn new(instance: &ProblemInstance) -> Self {
        let index = Self {
            order_units: order_totals(&instance.orders),
            item_demand: item_aggregates(instance.orders.iter().map(|o| &o.demand), instance.n_items),
            item_supply: item_aggregates(instance.aisles.iter().map(|a| &a.supply), instance.n_items),
        };
        debug_assert!(index_matches_instance(&index, instance));
        index
    }

    /// Items which are demanded by at least one order
    pub fn demanded_items(&self) -> impl Iterator<Item = usize> + '_ {
        self.item_demand
            .iter()
            .enumerate()
            .filter(|(_, d)| **d > 0)
            .map(|(item, _)| item)
    }

    /// Items whose aggregate demand exceeds the aggregate supply.
    /// Orders demanding these items can never all be picked in the same wave.
    pub fn short_items(&self) -> impl Iterator<Item = usize> + '_ {
        self.item_demand
            .iter()
            .zip(self.item_supply.iter())
            .enumerate()
            .filter(|(_, (d, s))| d > s)
            .map(|(item, _)| item)
    }

    /// Orders which could never be picked, even with every aisle opened
    pub fn unservable_orders<'a>(&'a self, instance: &'a ProblemInstance) -> impl Iterator<Item = usize> + 'a {
        instance
            .orders
            .iter()
            .filter(|o| {
                o.demand
                    .iter()
                    .any(|(item, qty)| self.item_supply.get(item).is_none_or(|s| qty > *s))
            })
            .map(|o| o.id)
    }
}
