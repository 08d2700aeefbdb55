//! Data model for the warehouse wave picking problem.
//!
//! Orders demand items, aisles supply them. A wave selects a subset of orders and a subset of aisles;
//! it is feasible when every picked unit is available in the visited aisles and the total number of
//! picked units lies within the wave-size band. Waves are ranked by units picked per aisle visited.

/// Orders, aisles, instances and assignments
pub mod entities;

/// Independent feasibility checks and scoring of assignments
pub mod eval;

/// Per-order and per-item aggregates derived from an instance
pub mod index;

/// Reading instances, writing solutions and serializable summaries
pub mod io;

/// Helper functions which do not belong to any specific module
pub mod util;
