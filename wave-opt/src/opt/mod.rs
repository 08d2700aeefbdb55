mod builder;
mod error;
mod refine;
mod surrogate;

pub use builder::{AISLE_FLOOR_CONSTRAINT, WAVE_SIZE_CONSTRAINT, WaveModel, aisle_var_name, build_model, order_var_name};
pub use error::{ModelBuildError, WaveError};
pub use refine::{CandidateOutcome, ExitReason, IterationRecord, SolveReport, WaveOptimizer};
pub use surrogate::{RefinementPolicy, SurrogateWeights};
