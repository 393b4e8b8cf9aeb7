//! Propagation backends.
//!
//! A session forwards every fact mutation to one backend and asks it for
//! the score. Both implementations compile from the same
//! [`ConstraintGraph`](super::graph::ConstraintGraph):
//! - [`IncrementalBackend`](super::incremental::IncrementalBackend) keeps
//!   live node state and touches only the affected tuples.
//! - [`RecomputeBackend`](super::recompute::RecomputeBackend) keeps the fact
//!   set and evaluates the whole graph from scratch when asked.

use std::any::TypeId;
use std::fmt;

use scoreflow_config::BackendKind;
use scoreflow_core::{Score, StateError};

use crate::tuple::{Element, Tuple};

/// Session-wide identity of an inserted fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactId(pub(crate) u64);

/// A fact as the backends see it: type-erased and shared.
#[derive(Clone)]
pub struct FactHandle {
    pub id: FactId,
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub element: Element,
    /// Unassigned planning variables, for the nullity policy of sources.
    pub uninitialized: u32,
}

impl fmt::Debug for FactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactHandle")
            .field("id", &self.id)
            .field("type", &self.type_name)
            .field("fact", &self.element)
            .finish()
    }
}

/// Score and match count of one live constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstraintTotal<Sc> {
    pub score: Sc,
    pub match_count: usize,
}

impl<Sc: Score> ConstraintTotal<Sc> {
    pub fn zero() -> Self {
        Self {
            score: Sc::zero(),
            match_count: 0,
        }
    }
}

/// Strategy that turns fact mutations into a score.
///
/// Constraint indices refer to the live constraints of the session factory,
/// in declaration order.
pub trait PropagationBackend<Sc: Score>: Send {
    fn kind(&self) -> BackendKind;

    fn insert(&mut self, fact: FactHandle) -> Result<(), StateError>;

    fn retract(&mut self, id: FactId) -> Result<(), StateError>;

    /// Replaces the fact stored under `fact.id`. Observably identical to a
    /// retract followed by an insert.
    fn update(&mut self, fact: FactHandle) -> Result<(), StateError> {
        self.retract(fact.id)?;
        self.insert(fact)
    }

    fn score(&mut self) -> Result<Sc, StateError>;

    fn constraint_totals(&mut self) -> Result<Vec<ConstraintTotal<Sc>>, StateError>;

    /// Current matches of one constraint with their score impact.
    fn matches(&mut self, constraint: usize) -> Result<Vec<(Tuple, Sc)>, StateError>;

    /// Drops all facts and live state.
    fn clear(&mut self);
}
