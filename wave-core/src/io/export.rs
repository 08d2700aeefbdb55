use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use log::info;

use crate::entities::DecisionAssignment;
use crate::util::assertions::assignment_is_canonical;

/// Formats an assignment in the plain text solution format:
/// ```text
/// <n_selected_orders>
/// <order index>       (one per line)
/// <n_opened_aisles>
/// <aisle index>       (one per line)
/// ```
pub fn format_solution(assignment: &DecisionAssignment) -> String {
    let mut out = String::new();
    for ids in [&assignment.orders, &assignment.aisles] {
        let _ = writeln!(out, "{}", ids.len());
        for id in ids {
            let _ = writeln!(out, "{id}");
        }
    }
    out
}

/// Writes an assignment to `path` in the plain text solution format
pub fn write_solution(assignment: &DecisionAssignment, path: &Path) -> Result<()> {
    fs::write(path, format_solution(assignment))
        .with_context(|| format!("could not write solution file: {}", path.display()))?;
    info!(
        "[IO] solution with {} orders and {} aisles written to {}",
        assignment.n_orders(),
        assignment.n_aisles(),
        path.display()
    );
    Ok(())
}

/// Parses an assignment from the plain text solution format
pub fn parse_solution(text: &str) -> Result<DecisionAssignment> {
    let mut tokens = text.split_whitespace().map(|t| {
        t.parse::<usize>()
            .with_context(|| format!("`{t}` is not a valid index"))
    });

    let mut read_block = |what: &str| -> Result<Vec<usize>> {
        let n = tokens.next().with_context(|| format!("missing number of {what}"))??;
        (0..n)
            .map(|i| tokens.next().with_context(|| format!("missing {what} entry {i} of {n}"))?)
            .collect()
    };

    let orders = read_block("orders")?;
    let aisles = read_block("aisles")?;
    if tokens.next().is_some() {
        bail!("unexpected content after the aisle block");
    }

    let assignment = DecisionAssignment::new(orders.iter().copied(), aisles.iter().copied());
    ensure!(
        assignment.n_orders() == orders.len() && assignment.n_aisles() == aisles.len(),
        "solution lists an order or aisle more than once"
    );
    debug_assert!(assignment_is_canonical(&assignment));
    Ok(assignment)
}

/// Reads an assignment from a file in the plain text solution format
pub fn read_solution(path: &Path) -> Result<DecisionAssignment> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read solution file: {}", path.display()))?;
    parse_solution(&text).with_context(|| format!("could not parse solution file: {}", path.display()))
}
