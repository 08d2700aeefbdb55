use std::fmt::{Display, Formatter};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thousands::Separable;
use wave_core::entities::{DecisionAssignment, ProblemInstance, ScoredSolution};
use wave_core::eval;
use wave_core::index::DemandSupplyIndex;

use crate::config::WaveConfig;
use crate::mip::{MipBackend, MipSolution, SolveStatus, create_backend};
use crate::opt::{RefinementPolicy, SurrogateWeights, WaveError, WaveModel, build_model};
use crate::time::{Stopwatch, TimeBudget, TimeSource};

/// Why the refinement loop stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// The instance has no orders or no aisles, nothing was solved
    EmptyInstance,
    /// The aisle lower bound would exceed the number of aisles
    AislesExhausted,
    /// The last solve returned no solution
    NoSolution,
    /// Too many consecutive candidates failed to improve the best ratio
    Stalled,
    /// Not enough time was left for another solve
    BudgetExhausted,
    /// The single follow-up solve of a non-iterating policy completed
    SinglePassComplete,
}

impl Display for ExitReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExitReason::EmptyInstance => "empty instance",
            ExitReason::AislesExhausted => "all aisles forced open",
            ExitReason::NoSolution => "no solution",
            ExitReason::Stalled => "stalled",
            ExitReason::BudgetExhausted => "time budget exhausted",
            ExitReason::SinglePassComplete => "single pass complete",
        };
        write!(f, "{s}")
    }
}

/// What happened to the solution of a single solve
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CandidateOutcome {
    NoSolution,
    /// The extracted assignment violates the instance and was discarded
    Rejected { reason: String },
    Accepted { improved: bool },
}

/// Trace of one solver invocation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// `None` for the initial solve
    pub policy: Option<RefinementPolicy>,
    pub status: SolveStatus,
    pub time_limit_ms: u64,
    /// Lower bound on the opened aisles at the time of the solve
    pub min_aisles: Option<usize>,
    pub aisles: Option<usize>,
    pub units: Option<u64>,
    pub ratio: Option<f64>,
    pub outcome: CandidateOutcome,
}

/// Result of a full optimization run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolveReport {
    /// Best validated candidate, if any
    pub best: Option<ScoredSolution>,
    pub exit: ExitReason,
    pub iterations: Vec<IterationRecord>,
    pub elapsed_ms: u64,
}

impl SolveReport {
    pub fn n_solves(&self) -> usize {
        self.iterations.len()
    }

    pub fn assignment(&self) -> Option<&DecisionAssignment> {
        self.best.as_ref().map(|s| &s.assignment)
    }
}

/// Maximizes picked units per opened aisle by solving a sequence of linear surrogates.
///
/// The initial solve minimizes the weighted sum `M·Σopen - K·Σunits·pick`.
/// Depending on its outcome a [`RefinementPolicy`] then refines the model in place and solves again,
/// as long as the time budget allows. Every candidate is validated against the instance, the best
/// valid one is returned.
pub struct WaveOptimizer {
    config: WaveConfig,
    backend: Box<dyn MipBackend>,
}

impl WaveOptimizer {
    /// Creates an optimizer with the backend named in `config`
    pub fn new(config: WaveConfig) -> Result<Self, WaveError> {
        let backend = create_backend(&config.backend)?;
        Ok(Self::with_backend(config, backend))
    }

    pub fn with_backend(config: WaveConfig, backend: Box<dyn MipBackend>) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &WaveConfig {
        &self.config
    }

    /// Returns the best wave found within the configured time budget, `None` if no valid wave was found
    pub fn solve(&mut self, instance: &ProblemInstance) -> Result<Option<DecisionAssignment>, WaveError> {
        let report = self.solve_with_report(instance)?;
        Ok(report.best.map(|s| s.assignment))
    }

    /// Same as [`WaveOptimizer::solve`], also returning the trace of the run
    pub fn solve_with_report(&mut self, instance: &ProblemInstance) -> Result<SolveReport, WaveError> {
        let clock = Stopwatch::start();
        self.solve_timed(instance, &clock)
    }

    /// Runs the optimizer with the deadline measured by `clock`
    pub fn solve_timed(
        &mut self,
        instance: &ProblemInstance,
        clock: &dyn TimeSource,
    ) -> Result<SolveReport, WaveError> {
        let index = DemandSupplyIndex::new(instance);
        let mut model = build_model(instance, &index)?;
        log_instance(instance, &index);

        if instance.n_orders() == 0 || instance.n_aisles() == 0 {
            info!("[WAVE] instance without orders or aisles, nothing to solve");
            return Ok(SolveReport {
                best: None,
                exit: ExitReason::EmptyInstance,
                iterations: vec![],
                elapsed_ms: clock.elapsed().as_millis() as u64,
            });
        }

        let weights = self.config.weights();
        weights.apply(&mut model);
        model.live.set_workers(self.config.n_workers);

        let budget = TimeBudget::new(clock, self.config.time_budget(), self.config.safety_margin());
        let mut search = Search {
            instance,
            model,
            backend: self.backend.as_mut(),
            budget,
            best: None,
            iterations: vec![],
        };

        let exit = match search.attempt(None) {
            None => ExitReason::BudgetExhausted,
            Some(initial) => {
                let policy = RefinementPolicy::after(initial.status);
                info!("[WAVE] initial solve {:?}, refining with {}", initial.status, policy);
                match policy {
                    RefinementPolicy::EscalateAisles => {
                        search.escalate(initial.n_aisles.unwrap_or(0), self.config.stall_limit)
                    }
                    RefinementPolicy::ReweightPenalty => {
                        search.reweight(weights, self.config.reweight_factor)
                    }
                    RefinementPolicy::Retry => search.retry(),
                }
            }
        };

        let elapsed_ms = search.budget.elapsed().as_millis() as u64;
        match &search.best {
            Some(best) => info!(
                "[WAVE] finished after {} solves in {}ms ({}): {} orders, {} aisles, {} units, ratio {:.3}",
                search.iterations.len(),
                elapsed_ms.separate_with_commas(),
                exit,
                best.assignment.n_orders(),
                best.assignment.n_aisles(),
                best.units.separate_with_commas(),
                best.ratio
            ),
            None => warn!(
                "[WAVE] finished after {} solves in {}ms ({}) without a valid wave",
                search.iterations.len(),
                elapsed_ms.separate_with_commas(),
                exit
            ),
        }

        Ok(SolveReport {
            best: search.best,
            exit,
            iterations: search.iterations,
            elapsed_ms,
        })
    }
}

/// State of a single optimization run
struct Search<'a> {
    instance: &'a ProblemInstance,
    model: WaveModel,
    backend: &'a mut dyn MipBackend,
    budget: TimeBudget<'a>,
    best: Option<ScoredSolution>,
    iterations: Vec<IterationRecord>,
}

/// Summary of one solve, as needed to pick the next step
struct Attempt {
    status: SolveStatus,
    /// Opened aisles of the extracted solution, valid or not
    n_aisles: Option<usize>,
    improved: bool,
}

impl Search<'_> {
    /// Solves the current model with the remaining time and offers the solution as a candidate.
    /// Returns `None` without solving if the budget does not allow another solve.
    fn attempt(&mut self, policy: Option<RefinementPolicy>) -> Option<Attempt> {
        let Some(limit) = self.budget.solve_limit() else {
            warn!(
                "[WAVE] {}ms left, not enough for another solve",
                self.budget.remaining().as_millis().separate_with_commas()
            );
            return None;
        };
        self.model.live.set_time_limit(limit);
        let min_aisles = self.model.min_aisles();
        debug!(
            "[WAVE] solving with {} (limit {}ms, min aisles {:?})",
            self.backend.name(),
            limit.as_millis().separate_with_commas(),
            min_aisles
        );

        let solution = self.backend.solve(&self.model.live).unwrap_or_else(|e| {
            warn!("[WAVE] backend {} failed: {e:#}", self.backend.name());
            MipSolution::without_solution(SolveStatus::Unknown)
        });
        let status = solution.status;

        let mut record = IterationRecord {
            policy,
            status,
            time_limit_ms: limit.as_millis() as u64,
            min_aisles,
            aisles: None,
            units: None,
            ratio: None,
            outcome: CandidateOutcome::NoSolution,
        };
        let mut improved = false;

        if status.has_solution() {
            let assignment = self.model.extract(&solution);
            record.aisles = Some(assignment.n_aisles());
            record.units = Some(eval::picked_units(self.instance, &assignment));

            match eval::validate(self.instance, &assignment) {
                Err(violation) => {
                    warn!("[WAVE] discarding infeasible candidate: {violation}");
                    record.outcome = CandidateOutcome::Rejected {
                        reason: violation.to_string(),
                    };
                }
                Ok(()) => {
                    let candidate = ScoredSolution::evaluate(self.instance, assignment);
                    record.ratio = Some(candidate.ratio);
                    improved = self
                        .best
                        .as_ref()
                        .is_none_or(|best| candidate.is_better_than(best));
                    if improved {
                        self.best = Some(candidate);
                    }
                    record.outcome = CandidateOutcome::Accepted { improved };
                }
            }
        }

        log_record(self.iterations.len(), &record);
        let attempt = Attempt {
            status,
            n_aisles: record.aisles,
            improved,
        };
        self.iterations.push(record);
        Some(attempt)
    }

    /// Forces ever more aisles open: every step requires at least one aisle more than the last
    /// candidate opened.
    fn escalate(&mut self, initial_aisles: usize, stall_limit: usize) -> ExitReason {
        let n_aisles = self.model.n_aisles();
        let mut last_aisles = initial_aisles;
        let mut n_stalled = 0;

        loop {
            let floor = last_aisles.max(self.model.min_aisles().unwrap_or(0)) + 1;
            if floor > n_aisles {
                return ExitReason::AislesExhausted;
            }
            self.model.require_min_aisles(floor);

            let Some(attempt) = self.attempt(Some(RefinementPolicy::EscalateAisles)) else {
                return ExitReason::BudgetExhausted;
            };
            let Some(aisles) = attempt.n_aisles else {
                return ExitReason::NoSolution;
            };

            if attempt.improved {
                n_stalled = 0;
            } else {
                n_stalled += 1;
                if n_stalled >= stall_limit {
                    return ExitReason::Stalled;
                }
            }
            last_aisles = aisles;
        }
    }

    /// Prices aisles at the best ratio found so far and solves once more
    fn reweight(&mut self, weights: SurrogateWeights, factor: f64) -> ExitReason {
        match &self.best {
            Some(best) => {
                let reweighted = weights.reweighted(best.ratio, factor);
                info!(
                    "[WAVE] aisle penalty {} -> {:.3} (ratio {:.3} x {})",
                    weights.aisle_penalty, reweighted.aisle_penalty, best.ratio, factor
                );
                reweighted.apply(&mut self.model);
            }
            None => warn!("[WAVE] no valid candidate to reweight from, keeping the objective"),
        }

        match self.attempt(Some(RefinementPolicy::ReweightPenalty)) {
            None => ExitReason::BudgetExhausted,
            Some(_) => ExitReason::SinglePassComplete,
        }
    }

    /// Solves the unchanged model once more with all remaining time
    fn retry(&mut self) -> ExitReason {
        match self.attempt(Some(RefinementPolicy::Retry)) {
            None => ExitReason::BudgetExhausted,
            Some(attempt) if attempt.status.has_solution() => ExitReason::SinglePassComplete,
            Some(_) => ExitReason::NoSolution,
        }
    }
}

fn log_instance(instance: &ProblemInstance, index: &DemandSupplyIndex) {
    info!(
        "[WAVE] {} orders, {} aisles, {} items, wave size [{}, {}], {} units demanded, {} supplied",
        instance.n_orders(),
        instance.n_aisles(),
        instance.n_items,
        instance.wave_bounds.lb.separate_with_commas(),
        instance.wave_bounds.ub.separate_with_commas(),
        instance.total_demand().separate_with_commas(),
        instance.total_supply().separate_with_commas()
    );
    let n_short = index.short_items().count();
    if n_short > 0 {
        warn!("[WAVE] {n_short} items are demanded beyond the total supply");
    }
    let n_unservable = index.unservable_orders(instance).count();
    if n_unservable > 0 {
        debug!("[WAVE] {n_unservable} orders can never be picked");
    }
}

fn log_record(i: usize, record: &IterationRecord) {
    let policy = record.policy.map_or("initial", |p| p.name());
    match (&record.outcome, record.aisles, record.units) {
        (CandidateOutcome::Accepted { improved }, Some(aisles), Some(units)) => info!(
            "[WAVE] #{i} {policy} {:?}: {} units over {aisles} aisles, ratio {:.3}{}",
            record.status,
            units.separate_with_commas(),
            record.ratio.unwrap_or(0.0),
            if *improved { " (new best)" } else { "" }
        ),
        (CandidateOutcome::Rejected { .. }, _, _) => {
            info!("[WAVE] #{i} {policy} {:?}: candidate rejected", record.status)
        }
        _ => info!("[WAVE] #{i} {policy} {:?}: no solution", record.status),
    }
}
