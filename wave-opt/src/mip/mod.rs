//! Seam between the optimizer and the integer programming engine.
//!
//! The optimizer only talks to a [`LiveModel`] and a [`MipBackend`]. Backends translate the live
//! model into the representation of a concrete engine, solve it and report a [`MipSolution`].

#[cfg(feature = "highs")]
mod highs;
mod microlp;
mod model;

#[cfg(feature = "highs")]
pub use self::highs::HighsBackend;
pub use microlp::MicrolpBackend;
pub use model::{
    BoolVar, ConstrId, LinearConstraint, LiveModel, Objective, Sense, SolveParams, Term, VarId,
};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::opt::WaveError;

/// Outcome of a single solve
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Solution found and proven optimal for the current objective
    Optimal,
    /// Solution found, but the engine stopped before proving optimality
    Feasible,
    /// Proven that no solution exists
    Infeasible,
    /// Neither a solution nor a proof of infeasibility
    Unknown,
}

impl SolveStatus {
    pub fn has_solution(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

/// Status and variable values reported by a backend
#[derive(Clone, Debug)]
pub struct MipSolution {
    pub status: SolveStatus,
    /// Value of every variable, indexed by [`VarId::index`]. Empty without a solution.
    values: Vec<f64>,
}

impl MipSolution {
    pub fn new(status: SolveStatus, values: Vec<f64>) -> Self {
        debug_assert!(status.has_solution() || values.is_empty());
        Self { status, values }
    }

    pub fn without_solution(status: SolveStatus) -> Self {
        Self::new(status, vec![])
    }

    pub fn value(&self, var: VarId) -> Option<f64> {
        self.values.get(var.index()).copied()
    }

    /// Whether the boolean variable is set, values are rounded to absorb engine tolerances
    pub fn is_set(&self, var: VarId) -> bool {
        self.value(var).is_some_and(|v| v > 0.5)
    }
}

/// Integer programming engine able to solve a [`LiveModel`].
/// A solve is blocking and should return at or shortly after the model's time limit.
pub trait MipBackend {
    fn name(&self) -> &str;

    fn solve(&mut self, model: &LiveModel) -> Result<MipSolution>;
}

/// Creates the backend registered under `name`.
/// `highs` is only available when the crate is built with the `highs` feature.
pub fn create_backend(name: &str) -> Result<Box<dyn MipBackend>, WaveError> {
    match name {
        MicrolpBackend::NAME => Ok(Box::new(MicrolpBackend::new())),
        #[cfg(feature = "highs")]
        HighsBackend::NAME => Ok(Box::new(HighsBackend::new())),
        _ => Err(WaveError::SolverUnavailable(name.to_string())),
    }
}
