//! Incremental constraint-stream scoring for scoreflow.
//!
//! This crate provides:
//! - The fluent constraint stream API (`ConstraintFactory`, `UniConstraintStream`, ...)
//! - Joiners and collectors used by joins and group-bys
//! - Scoring sessions that keep a score current under fact insert/update/retract
//! - Match analysis (`ScoreExplanation`, `IndictmentMap`) and configurable weights
//!
//! # Architecture
//!
//! Typed streams build an untyped plan of node specs over shared tuples.
//! A [`SessionFactory`] compiles the plans of every live constraint into one
//! immutable graph; each [`Session`] instantiates it on a propagation
//! backend, either the live node graph or a from-scratch recomputation.

// Typed closures are erased into boxed callbacks with long signatures
#![allow(clippy::type_complexity)]

pub mod api;
pub(crate) mod node;
pub mod session;
pub mod stream;
pub mod tuple;

// ============================================================================
// Fluent Constraint Stream API
// ============================================================================

pub use stream::{
    BiConstraintStream, Constraint, ConstraintBuilder, ConstraintFactory, ConstraintState,
    ConstraintWeight, QuadConstraintStream, TriConstraintStream, UniConstraintStream,
};
pub use node::GroupKey;

// ============================================================================
// Sessions
// ============================================================================

pub use session::{
    ConstraintProvider, ConstraintTotal, FactHandle, FactId, PropagationBackend, Session,
    SessionFactory, SessionFactoryBuilder,
};

// ============================================================================
// Weights and analysis
// ============================================================================

pub use api::analysis::{
    ConstraintAnalysis, ConstraintJustification, ConstraintMatch, ConstraintMatchTotal, EntityRef,
    Indictment, IndictmentMap, ScoreExplanation,
};
pub use api::weight_overrides::{ConstraintWeightOverrides, WeightProvider};

pub use tuple::Tuple;
