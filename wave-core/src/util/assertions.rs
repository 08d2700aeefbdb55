use itertools::Itertools;

use crate::entities::{Aisle, DecisionAssignment, Order, ProblemInstance};
use crate::index::DemandSupplyIndex;

//Various checks to verify correctness of the state of the system
//Used in debug_assertion!() blocks

pub fn instance_ids_consecutive(orders: &[Order], aisles: &[Aisle]) -> bool {
    orders.iter().enumerate().all(|(i, o)| o.id == i) && aisles.iter().enumerate().all(|(i, a)| a.id == i)
}

pub fn assignment_is_canonical(assignment: &DecisionAssignment) -> bool {
    let strictly_increasing = |ids: &[usize]| ids.iter().tuple_windows().all(|(a, b)| a < b);
    strictly_increasing(&assignment.orders) && strictly_increasing(&assignment.aisles)
}

pub fn index_matches_instance(index: &DemandSupplyIndex, instance: &ProblemInstance) -> bool {
    let DemandSupplyIndex {
        order_units,
        item_demand,
        item_supply,
    } = index;

    order_units.len() == instance.n_orders()
        && item_demand.len() == instance.n_items
        && item_supply.len() == instance.n_items
        && order_units
            .iter()
            .zip(instance.orders.iter())
            .all(|(units, order)| *units == order.total_units())
}
