//! Terminal builder and the constraint value it produces.

use std::fmt;
use std::sync::Arc;

use scoreflow_core::{ConstraintRef, ImpactType, Score};

use super::plan::{FactoryContext, StreamNode};
use crate::tuple::Tuple;

/// Match weight of one tuple reaching a constraint's terminal.
pub(crate) type MatchWeigher = Arc<dyn Fn(&Tuple) -> i64 + Send + Sync>;

pub(crate) fn unit_weigher() -> MatchWeigher {
    Arc::new(|_: &Tuple| 1)
}

/// Constraint weight as declared on the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintWeight<Sc> {
    Fixed(Sc),
    /// Looked up in the weight configuration when the session factory is
    /// built.
    Configurable,
}

/// Lifecycle of a constraint's subgraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintState {
    /// Declared, not yet handed to a session factory.
    Unbuilt,
    /// Compiled into the factory's graph.
    Built,
    /// Weight resolved to zero; excluded from every graph.
    Pruned,
    /// Propagating in an open session.
    Live,
    /// The session was disposed.
    Disposed,
}

/// A stream with its polarity and weights, waiting for a name.
///
/// Returned by the `penalize`, `reward` and `impact` families.
pub struct ConstraintBuilder<Sc: Score> {
    node: Arc<StreamNode>,
    cx: Arc<FactoryContext>,
    impact_type: ImpactType,
    weight: ConstraintWeight<Sc>,
    weigher: MatchWeigher,
}

impl<Sc: Score> ConstraintBuilder<Sc> {
    pub(crate) fn new(
        node: Arc<StreamNode>,
        cx: Arc<FactoryContext>,
        impact_type: ImpactType,
        weight: ConstraintWeight<Sc>,
        weigher: MatchWeigher,
    ) -> Self {
        Self {
            node,
            cx,
            impact_type,
            weight,
            weigher,
        }
    }

    /// Names the constraint in the factory's default package.
    pub fn as_constraint(self, name: impl Into<String>) -> Constraint<Sc> {
        let package = self.cx.default_package.clone();
        self.as_constraint_in(package, name)
    }

    pub fn as_constraint_in(self, package: impl Into<String>, name: impl Into<String>) -> Constraint<Sc> {
        Constraint {
            constraint_ref: ConstraintRef::new(package, name),
            impact_type: self.impact_type,
            weight: self.weight,
            weigher: self.weigher,
            node: self.node,
        }
    }
}

impl<Sc: Score> fmt::Debug for ConstraintBuilder<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintBuilder")
            .field("impact_type", &self.impact_type)
            .field("weight", &self.weight)
            .finish()
    }
}

/// A named rule: pattern, weight and polarity.
///
/// Constraints are plain values until a session factory compiles them.
pub struct Constraint<Sc: Score> {
    constraint_ref: ConstraintRef,
    impact_type: ImpactType,
    weight: ConstraintWeight<Sc>,
    pub(crate) weigher: MatchWeigher,
    pub(crate) node: Arc<StreamNode>,
}

impl<Sc: Score> Constraint<Sc> {
    pub fn constraint_ref(&self) -> &ConstraintRef {
        &self.constraint_ref
    }

    pub fn name(&self) -> &str {
        &self.constraint_ref.name
    }

    pub fn impact_type(&self) -> ImpactType {
        self.impact_type
    }

    pub fn weight(&self) -> ConstraintWeight<Sc> {
        self.weight
    }

    pub fn is_configurable(&self) -> bool {
        matches!(self.weight, ConstraintWeight::Configurable)
    }

    /// Always [`ConstraintState::Unbuilt`]; compiled state is reported by
    /// the session factory and the session.
    pub fn state(&self) -> ConstraintState {
        ConstraintState::Unbuilt
    }
}

impl<Sc: Score> fmt::Debug for Constraint<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("ref", &self.constraint_ref)
            .field("impact_type", &self.impact_type)
            .field("weight", &self.weight)
            .field("stream", &self.node)
            .finish()
    }
}
