mod assignment;
mod catalog;
mod instance;

#[doc(inline)]
pub use assignment::DecisionAssignment;
#[doc(inline)]
pub use assignment::ScoredSolution;
#[doc(inline)]
pub use catalog::Aisle;
#[doc(inline)]
pub use catalog::ItemQtys;
#[doc(inline)]
pub use catalog::Order;
#[doc(inline)]
pub use instance::ProblemInstance;
#[doc(inline)]
pub use instance::WaveBounds;
