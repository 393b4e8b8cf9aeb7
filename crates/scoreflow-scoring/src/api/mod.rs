//! Match analysis and constraint weight configuration.
//!
//! This module provides:
//! - Analysis types returned by a session with match tracking enabled
//! - Weight providers for configurable constraints

pub mod analysis;
pub mod weight_overrides;


pub use analysis::{
    ConstraintAnalysis, ConstraintJustification, ConstraintMatch, ConstraintMatchTotal, EntityRef,
    Indictment, IndictmentMap, ScoreExplanation,
};
pub use weight_overrides::{ConstraintWeightOverrides, WeightProvider};
