use thiserror::Error;
use wave_core::eval::CatalogEntry;

/// Instance rejected while formulating the model
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ModelBuildError {
    #[error("wave upper bound {ub} is below the lower bound {lb}")]
    InvertedWaveBounds { lb: u64, ub: u64 },
    #[error("{entry} carries id {id}, ids must match catalog positions")]
    IdMismatch { entry: CatalogEntry, id: usize },
    #[error("{entry} references item {item}, but the instance has only {n_items} items")]
    ItemOutOfRange {
        entry: CatalogEntry,
        item: usize,
        n_items: usize,
    },
}

/// Fatal errors of an optimization run. Everything else is absorbed by the refinement loop.
#[derive(Debug, Error)]
pub enum WaveError {
    #[error("could not build the model: {0}")]
    ModelBuild(#[from] ModelBuildError),
    #[error("solver backend `{0}` is not available")]
    SolverUnavailable(String),
}
