//! Score types for representing solution quality
//!
//! Scores are ordered vectors of integer levels. All score types are
//! immutable and implement the arithmetic the scoring engine needs to
//! apply and undo per-match impacts.

#[macro_use]
mod macros;

mod hard_medium_soft;
mod hard_soft;
mod initialized;
mod simple;
mod traits;
mod trend;


pub use hard_medium_soft::HardMediumSoftScore;
pub use hard_soft::HardSoftScore;
pub use initialized::InitializedScore;
pub use simple::SimpleScore;
pub use traits::{ParseableScore, Score, ScoreLevel, ScoreParseError};
pub use trend::{InitializingScoreTrend, TrendLevel};
