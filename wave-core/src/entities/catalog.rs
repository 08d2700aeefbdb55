use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Sparse multiset of items: a list of `(item id, quantity)` pairs.
/// Entries are sorted by item id, unique and never have a zero quantity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemQtys(Vec<(usize, u64)>);

impl ItemQtys {
    /// Collects the entries into a canonical bag. Duplicate item ids are summed, zero quantities dropped.
    pub fn new(entries: impl IntoIterator<Item = (usize, u64)>) -> Self {
        let entries = entries
            .into_iter()
            .sorted_by_key(|(item, _)| *item)
            .coalesce(|(i1, q1), (i2, q2)| match i1 == i2 {
                true => Ok((i1, q1 + q2)),
                false => Err(((i1, q1), (i2, q2))),
            })
            .filter(|(_, qty)| *qty > 0)
            .collect_vec();
        Self(entries)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.0.iter().copied()
    }

    /// Quantity of `item` in the bag, 0 if absent
    pub fn qty(&self, item: usize) -> u64 {
        match self.0.binary_search_by_key(&item, |(i, _)| *i) {
            Ok(pos) => self.0[pos].1,
            Err(_) => 0,
        }
    }

    /// Sum of all quantities
    pub fn total(&self) -> u64 {
        self.0.iter().map(|(_, qty)| qty).sum()
    }

    /// Highest item id present in the bag
    pub fn max_item(&self) -> Option<usize> {
        self.0.last().map(|(item, _)| *item)
    }

    pub fn n_entries(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(usize, u64)> for ItemQtys {
    fn from_iter<T: IntoIterator<Item = (usize, u64)>>(iter: T) -> Self {
        ItemQtys::new(iter)
    }
}

/// A customer order: the quantity demanded of each item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Position of the order in the instance
    pub id: usize,
    pub demand: ItemQtys,
}

impl Order {
    pub fn new(id: usize, demand: ItemQtys) -> Self {
        Self { id, demand }
    }

    /// Total number of units demanded by the order
    pub fn total_units(&self) -> u64 {
        self.demand.total()
    }
}

/// A storage aisle: the quantity available of each item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aisle {
    /// Position of the aisle in the instance
    pub id: usize,
    pub supply: ItemQtys,
}

impl Aisle {
    pub fn new(id: usize, supply: ItemQtys) -> Self {
        Self { id, supply }
    }

    pub fn total_units(&self) -> u64 {
        self.supply.total()
    }
}
