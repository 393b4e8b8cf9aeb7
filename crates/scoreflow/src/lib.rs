//! scoreflow - incremental constraint-stream scoring in Rust
//!
//! Declare constraints with the fluent stream API, compile them once into a
//! [`SessionFactory`], and keep the score of a working solution current
//! while facts are inserted, updated and retracted.
//!
//! # Example
//!
//! ```rust
//! use scoreflow::prelude::*;
//!
//! #[derive(Debug, Clone)]
//! struct Shift { id: u32, employee: u32, hours: u32 }
//!
//! impl PlanningId for Shift {
//!     type Id = u32;
//!     fn planning_id(&self) -> u32 { self.id }
//! }
//! impl Fact for Shift {}
//!
//! let factory = SessionFactory::builder()
//!     .build(|f: &ConstraintFactory<HardSoftScore>| {
//!         vec![f
//!             .for_each::<Shift>()
//!             .group_by_key_collect(|s: &Shift| s.employee, collector::sum(|s: &Shift| s.hours))
//!             .filter(|_: &u32, hours: &u32| *hours > 40)
//!             .penalize_with(HardSoftScore::ONE_SOFT, |_: &u32, hours: &u32| i64::from(*hours - 40))
//!             .as_constraint("Overtime")]
//!     })
//!     .unwrap();
//!
//! let mut session = factory.create_session();
//! session.insert(Shift { id: 1, employee: 7, hours: 30 }).unwrap();
//! session.insert(Shift { id: 2, employee: 7, hours: 15 }).unwrap();
//! assert_eq!(session.calculate_score().unwrap(), HardSoftScore::of(0, -5));
//! ```

pub mod logging;

// Score types
pub use scoreflow_core::score::{
    HardMediumSoftScore, HardSoftScore, InitializedScore, InitializingScoreTrend, ParseableScore,
    Score, SimpleScore,
};

// Domain and errors
pub use scoreflow_core::{
    ConfigurationError, ConstraintRef, DefinitionError, Fact, ImpactType, PlanningId,
    ScoreflowError, StateError,
};

// Configuration
pub use scoreflow_config::{BackendKind, ConfigError, EnvironmentMode, NullityPolicy, ScoringConfig};

// Constraint stream API
pub use scoreflow_scoring::stream;

// Sessions and analysis
pub use scoreflow_scoring::{
    Constraint, ConstraintFactory, ConstraintMatch, ConstraintMatchTotal, ConstraintProvider,
    ConstraintState, ConstraintWeightOverrides, IndictmentMap, ScoreExplanation, Session,
    SessionFactory, WeightProvider,
};

pub mod prelude {
    pub use super::{
        Fact, HardMediumSoftScore, HardSoftScore, PlanningId, Score, SimpleScore,
    };
    pub use super::stream::{collector, joiner, ConstraintFactory};
    pub use super::{Constraint, Session, SessionFactory};
}
