use serde::{Deserialize, Serialize};
use wave_core::io::ext_repr::{ExtInstanceSummary, ExtSolution};

use crate::config::WaveConfig;
use crate::opt::{ExitReason, IterationRecord, SolveReport};

/// JSON report of a run
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct WaveOutput {
    pub instance: ExtInstanceSummary,
    pub solution: Option<ExtSolution>,
    pub exit: ExitReason,
    pub elapsed_ms: u64,
    pub iterations: Vec<IterationRecord>,
    pub config: WaveConfig,
}

impl WaveOutput {
    pub fn new(instance: ExtInstanceSummary, report: &SolveReport, config: WaveConfig) -> Self {
        Self {
            instance,
            solution: report.best.as_ref().map(ExtSolution::from),
            exit: report.exit,
            elapsed_ms: report.elapsed_ms,
            iterations: report.iterations.clone(),
            config,
        }
    }
}
