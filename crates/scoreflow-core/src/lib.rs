//! scoreflow core - value types shared by the scoring engine
//!
//! This crate provides:
//! - Score types (single and multi-level), init scores and bound estimation
//! - Constraint identity and impact polarity
//! - The `Fact` trait implemented by everything inserted into a session
//! - The error taxonomy of the engine

pub mod constraint;
pub mod domain;
pub mod error;
pub mod score;


pub use constraint::{ConstraintRef, ImpactType};
pub use domain::{Fact, PlanningId};
pub use error::{ConfigurationError, DefinitionError, Result, ScoreflowError, StateError};
pub use score::{
    HardMediumSoftScore, HardSoftScore, InitializedScore, InitializingScoreTrend, ParseableScore,
    Score, ScoreLevel, ScoreParseError, SimpleScore, TrendLevel,
};
