use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use itertools::Itertools;
use log::debug;

use crate::entities::{Aisle, ItemQtys, Order, ProblemInstance, WaveBounds};

/// Reads an instance from a file in the plain text format, see [`parse_instance`].
pub fn read_instance(path: &Path) -> Result<ProblemInstance> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read instance file: {}", path.display()))?;
    let instance = parse_instance(&text)
        .with_context(|| format!("could not parse instance file: {}", path.display()))?;
    debug!(
        "[IO] read instance {} ({} orders, {} aisles, {} items)",
        path.display(),
        instance.n_orders(),
        instance.n_aisles(),
        instance.n_items
    );
    Ok(instance)
}

/// Parses an instance from the plain text format:
/// ```text
/// <n_orders> <n_items> <n_aisles>
/// <k> <item> <qty> ... <item> <qty>     (one line per order)
/// <k> <item> <qty> ... <item> <qty>     (one line per aisle)
/// <wave_size_lb> <wave_size_ub>
/// ```
/// Blank lines are skipped. Repeated items within a line are summed.
pub fn parse_instance(text: &str) -> Result<ProblemInstance> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let (n_orders, n_items, n_aisles) = {
        let (line_nr, line) = lines.next().context("instance is empty")?;
        match parse_numbers(line_nr, line)?[..] {
            [n_orders, n_items, n_aisles] => (n_orders as usize, n_items as usize, n_aisles as usize),
            _ => bail!("line {line_nr}: expected <n_orders> <n_items> <n_aisles>"),
        }
    };

    let orders = (0..n_orders)
        .map(|id| {
            let (line_nr, line) = lines
                .next()
                .with_context(|| format!("missing line for order {id} of {n_orders}"))?;
            let demand = parse_item_line(line_nr, line, n_items)?;
            Ok(Order::new(id, demand))
        })
        .collect::<Result<Vec<Order>>>()?;

    let aisles = (0..n_aisles)
        .map(|id| {
            let (line_nr, line) = lines
                .next()
                .with_context(|| format!("missing line for aisle {id} of {n_aisles}"))?;
            let supply = parse_item_line(line_nr, line, n_items)?;
            Ok(Aisle::new(id, supply))
        })
        .collect::<Result<Vec<Aisle>>>()?;

    let wave_bounds = {
        let (line_nr, line) = lines.next().context("missing wave size bounds")?;
        match parse_numbers(line_nr, line)?[..] {
            [lb, ub] => WaveBounds::new(lb, ub),
            _ => bail!("line {line_nr}: expected <wave_size_lb> <wave_size_ub>"),
        }
    };

    if let Some((line_nr, _)) = lines.next() {
        bail!("line {line_nr}: unexpected content after the wave size bounds");
    }

    Ok(ProblemInstance::new(orders, aisles, n_items, wave_bounds))
}

fn parse_numbers(line_nr: usize, line: &str) -> Result<Vec<u64>> {
    line.split_whitespace()
        .map(|token| {
            token
                .parse::<u64>()
                .with_context(|| format!("line {line_nr}: `{token}` is not a non-negative integer"))
        })
        .collect()
}

fn parse_item_line(line_nr: usize, line: &str, n_items: usize) -> Result<ItemQtys> {
    let numbers = parse_numbers(line_nr, line)?;
    let (&n_entries, pairs) = numbers
        .split_first()
        .with_context(|| format!("line {line_nr}: missing entry count"))?;
    ensure!(
        pairs.len() % 2 == 0 && (pairs.len() / 2) as u64 == n_entries,
        "line {line_nr}: declared {n_entries} entries but found {} values",
        pairs.len()
    );

    let entries = pairs
        .iter()
        .tuples()
        .map(|(&item, &qty)| {
            ensure!(
                (item as usize) < n_items,
                "line {line_nr}: item {item} outside the item universe of {n_items} items"
            );
            ensure!(qty > 0, "line {line_nr}: item {item} has a zero quantity");
            Ok((item as usize, qty))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ItemQtys::new(entries))
}
