use std::time::Duration;

use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

use crate::mip::MicrolpBackend;
use crate::opt::SurrogateWeights;

/// Configuration of the wave optimizer
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct WaveConfig {
    /// Wall-clock budget of a full run in seconds, measured from the start of the solve
    pub time_budget_s: u64,
    /// Seconds subtracted from the remaining budget for every solver call
    pub safety_margin_s: u64,
    /// Number of worker threads the backend is asked to use
    pub n_workers: usize,
    /// Cost of opening an aisle in the surrogate objective
    pub aisle_penalty: f64,
    /// Reward per picked unit in the surrogate objective
    pub unit_reward: f64,
    /// Multiplier applied to the best ratio when re-pricing aisles after an unproven solve
    pub reweight_factor: f64,
    /// Consecutive non-improving candidates tolerated while escalating the aisle count
    pub stall_limit: usize,
    /// Name of the integer programming backend
    pub backend: String,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            time_budget_s: 600,
            safety_margin_s: 5,
            n_workers: 8,
            aisle_penalty: 100_000.0,
            unit_reward: 1.0,
            reweight_factor: 1.15,
            stall_limit: 1,
            backend: MicrolpBackend::NAME.to_string(),
        }
    }
}

impl WaveConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.aisle_penalty > 0.0,
            "aisle_penalty must be positive, got {}",
            self.aisle_penalty
        );
        ensure!(
            self.unit_reward > 0.0,
            "unit_reward must be positive, got {}",
            self.unit_reward
        );
        ensure!(
            self.reweight_factor > 0.0,
            "reweight_factor must be positive, got {}",
            self.reweight_factor
        );
        ensure!(self.stall_limit > 0, "stall_limit must be at least 1");
        ensure!(self.n_workers > 0, "n_workers must be at least 1");
        Ok(())
    }

    pub fn time_budget(&self) -> Duration {
        Duration::from_secs(self.time_budget_s)
    }

    pub fn safety_margin(&self) -> Duration {
        Duration::from_secs(self.safety_margin_s)
    }

    pub fn weights(&self) -> SurrogateWeights {
        SurrogateWeights::new(self.aisle_penalty, self.unit_reward)
    }
}
