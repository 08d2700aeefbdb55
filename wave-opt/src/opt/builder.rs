use itertools::Itertools;
use log::debug;
use wave_core::entities::{DecisionAssignment, ProblemInstance};
use wave_core::eval::CatalogEntry;
use wave_core::index::DemandSupplyIndex;
use wave_core::util::assertions::assignment_is_canonical;

use crate::mip::{ConstrId, LiveModel, MipSolution, Term, VarId};
use crate::opt::ModelBuildError;

pub const WAVE_SIZE_CONSTRAINT: &str = "wave_size";
pub const AISLE_FLOOR_CONSTRAINT: &str = "min_aisles";

pub fn order_var_name(order: usize) -> String {
    format!("pick_{order}")
}

pub fn aisle_var_name(aisle: usize) -> String {
    format!("open_{aisle}")
}

/// Live model of a wave picking instance together with the handles the optimizer needs to
/// re-weight, tighten and read it back.
pub struct WaveModel {
    pub live: LiveModel,
    /// `pick` variable of every order
    pub picks: Vec<VarId>,
    /// `open` variable of every aisle
    pub opens: Vec<VarId>,
    /// Units demanded by every order
    pub order_units: Vec<u64>,
    pub wave_size: ConstrId,
    /// `Σ open >= k`, only present once the aisle count has been escalated
    aisle_floor: Option<ConstrId>,
    pub n_item_constraints: usize,
}

/// Formulates the boolean model of `instance`:
/// * one `pick` variable per order and one `open` variable per aisle
/// * `max(lb, 1) <= Σ units(o)·pick(o) <= ub`
/// * per demanded item `i`: `Σ demand_i(o)·pick(o) - Σ supply_i(a)·open(a) <= 0`
///
/// Item constraints without any demand are omitted, they cannot be violated.
/// The objective is left empty.
pub fn build_model(instance: &ProblemInstance, index: &DemandSupplyIndex) -> Result<WaveModel, ModelBuildError> {
    check_instance(instance)?;

    let mut live = LiveModel::new();
    let picks = (0..instance.n_orders())
        .map(|o| live.add_bool_var(order_var_name(o)))
        .collect_vec();
    let opens = (0..instance.n_aisles())
        .map(|a| live.add_bool_var(aisle_var_name(a)))
        .collect_vec();

    let wave_size = {
        let bounds = instance.wave_bounds;
        let terms = picks
            .iter()
            .zip(index.order_units.iter())
            .filter(|(_, units)| **units > 0)
            .map(|(&pick, &units)| (pick, units as f64))
            .collect_vec();
        live.add_constraint(WAVE_SIZE_CONSTRAINT, bounds.floored_lb() as f64, bounds.ub as f64, terms)
    };

    //gather the item rows column by column, a row-wise scan over all orders per item is quadratic
    let mut item_rows: Vec<Vec<Term>> = vec![vec![]; instance.n_items];
    for (order, &pick) in instance.orders.iter().zip(picks.iter()) {
        for (item, qty) in order.demand.iter() {
            item_rows[item].push((pick, qty as f64));
        }
    }
    for (aisle, &open) in instance.aisles.iter().zip(opens.iter()) {
        for (item, qty) in aisle.supply.iter() {
            if index.item_demand[item] > 0 {
                item_rows[item].push((open, -(qty as f64)));
            }
        }
    }

    let mut n_item_constraints = 0;
    for (item, row) in item_rows.into_iter().enumerate() {
        if index.item_demand[item] == 0 {
            continue;
        }
        live.add_constraint(format!("item_{item}"), f64::NEG_INFINITY, 0.0, row);
        n_item_constraints += 1;
    }

    debug!(
        "[BUILD] model with {} variables, 1 wave constraint and {} item constraints ({} items without demand omitted)",
        live.n_vars(),
        n_item_constraints,
        instance.n_items - n_item_constraints
    );

    Ok(WaveModel {
        live,
        picks,
        opens,
        order_units: index.order_units.clone(),
        wave_size,
        aisle_floor: None,
        n_item_constraints,
    })
}

fn check_instance(instance: &ProblemInstance) -> Result<(), ModelBuildError> {
    let bounds = instance.wave_bounds;
    if bounds.is_inverted() {
        return Err(ModelBuildError::InvertedWaveBounds {
            lb: bounds.lb,
            ub: bounds.ub,
        });
    }

    //variables, the validator and the solution format all refer to orders and aisles by position
    let order_ids = instance
        .orders
        .iter()
        .enumerate()
        .map(|(pos, o)| (CatalogEntry::Order(pos), o.id));
    let aisle_ids = instance
        .aisles
        .iter()
        .enumerate()
        .map(|(pos, a)| (CatalogEntry::Aisle(pos), a.id));
    if let Some((entry, id)) = order_ids.chain(aisle_ids).find(|(entry, id)| entry.position() != *id) {
        return Err(ModelBuildError::IdMismatch { entry, id });
    }

    let n_items = instance.n_items;
    let order_items = instance
        .orders
        .iter()
        .enumerate()
        .map(|(pos, o)| (CatalogEntry::Order(pos), o.demand.max_item()));
    let aisle_items = instance
        .aisles
        .iter()
        .enumerate()
        .map(|(pos, a)| (CatalogEntry::Aisle(pos), a.supply.max_item()));

    match order_items
        .chain(aisle_items)
        .find_map(|(entry, max_item)| max_item.filter(|&i| i >= n_items).map(|i| (entry, i)))
    {
        Some((entry, item)) => Err(ModelBuildError::ItemOutOfRange { entry, item, n_items }),
        None => Ok(()),
    }
}

impl WaveModel {
    /// Forces the next solves to open at least `floor` aisles.
    /// The constraint is added on first use and only its lower bound is tightened afterwards.
    pub fn require_min_aisles(&mut self, floor: usize) {
        match self.aisle_floor {
            Some(id) => self.live.set_lower_bound(id, floor as f64),
            None => {
                let terms = self.opens.iter().map(|&open| (open, 1.0)).collect_vec();
                let id = self
                    .live
                    .add_constraint(AISLE_FLOOR_CONSTRAINT, floor as f64, f64::INFINITY, terms);
                self.aisle_floor = Some(id);
            }
        }
    }

    /// Current lower bound on the number of opened aisles, if any
    pub fn min_aisles(&self) -> Option<usize> {
        self.aisle_floor
            .map(|id| self.live.constraint(id).lb.round() as usize)
    }

    pub fn n_aisles(&self) -> usize {
        self.opens.len()
    }

    /// Reads the selected orders and opened aisles from a solver solution
    pub fn extract(&self, solution: &MipSolution) -> DecisionAssignment {
        let orders = self
            .picks
            .iter()
            .enumerate()
            .filter(|(_, pick)| solution.is_set(**pick))
            .map(|(o, _)| o);
        let aisles = self
            .opens
            .iter()
            .enumerate()
            .filter(|(_, open)| solution.is_set(**open))
            .map(|(a, _)| a);

        let assignment = DecisionAssignment::new(orders, aisles);
        debug_assert!(assignment_is_canonical(&assignment));
        assignment
    }
}
