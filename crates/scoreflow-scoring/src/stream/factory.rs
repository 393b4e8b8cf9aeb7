//! Constraint factory: the entry point of the stream API.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use scoreflow_config::NullityPolicy;
use scoreflow_core::{Fact, PlanningId, Score};

use super::joiner::{less_than, AndJoiner, ComparisonJoiner, Joiner};
use super::plan::{FactoryContext, StreamNode};
use super::{BiConstraintStream, UniConstraintStream};

type IdOf<A> = fn(&A) -> <A as PlanningId>::Id;

/// Factory for creating constraint streams.
///
/// Session factories hand one to the constraint provider; it carries the
/// configured nullity policy and default constraint package. `new()`
/// creates a stand-alone factory with the defaults.
///
/// # Example
///
/// ```
/// use scoreflow_scoring::ConstraintFactory;
/// use scoreflow_core::{Fact, PlanningId, SimpleScore};
///
/// #[derive(Debug)]
/// struct Lecture { id: u32, room: Option<u32> }
///
/// impl PlanningId for Lecture {
///     type Id = u32;
///     fn planning_id(&self) -> u32 { self.id }
/// }
///
/// impl Fact for Lecture {
///     fn uninitialized_variable_count(&self) -> u32 {
///         u32::from(self.room.is_none())
///     }
/// }
///
/// let factory = ConstraintFactory::<SimpleScore>::new();
/// let constraint = factory
///     .for_each_including_null_vars::<Lecture>()
///     .filter(|l: &Lecture| l.room.is_none())
///     .penalize(SimpleScore::of(1))
///     .as_constraint("Unassigned lecture");
/// assert_eq!(constraint.constraint_ref().full_name(), "Unassigned lecture");
/// ```
pub struct ConstraintFactory<Sc: Score> {
    cx: Arc<FactoryContext>,
    _phantom: PhantomData<fn() -> Sc>,
}

impl<Sc: Score> ConstraintFactory<Sc> {
    pub fn new() -> Self {
        Self::with_context(FactoryContext {
            nullity: NullityPolicy::default(),
            default_package: String::new(),
        })
    }

    pub(crate) fn with_context(cx: FactoryContext) -> Self {
        Self {
            cx: Arc::new(cx),
            _phantom: PhantomData,
        }
    }

    /// Package of constraints named with `as_constraint`.
    pub fn default_package(&self) -> &str {
        &self.cx.default_package
    }

    pub fn nullity_policy(&self) -> NullityPolicy {
        self.cx.nullity
    }

    /// Every inserted `A` fact admitted by the nullity policy.
    pub fn for_each<A: Fact>(&self) -> UniConstraintStream<A, Sc> {
        UniConstraintStream::from_node(self.cx.source::<A>(), Arc::clone(&self.cx))
    }

    /// Every inserted `A` fact, including facts with unassigned variables.
    pub fn for_each_including_null_vars<A: Fact>(&self) -> UniConstraintStream<A, Sc> {
        UniConstraintStream::from_node(
            StreamNode::source::<A>(NullityPolicy::IncludeUninitialized),
            Arc::clone(&self.cx),
        )
    }

    /// Every unordered pair of distinct `A` facts accepted by `joiner`,
    /// each pair once with the lower planning id first.
    ///
    /// Pass `()` to pair every fact with every other fact.
    ///
    /// # Example
    ///
    /// ```
    /// use scoreflow_scoring::stream::joiner::equal;
    /// use scoreflow_scoring::ConstraintFactory;
    /// use scoreflow_core::{Fact, HardSoftScore, PlanningId};
    ///
    /// #[derive(Debug)]
    /// struct Lecture { id: u32, room: u32, period: u32 }
    ///
    /// impl PlanningId for Lecture {
    ///     type Id = u32;
    ///     fn planning_id(&self) -> u32 { self.id }
    /// }
    /// impl Fact for Lecture {}
    ///
    /// let factory = ConstraintFactory::<HardSoftScore>::new();
    /// let conflict = factory
    ///     .for_each_unique_pair::<Lecture, _>(equal(|l: &Lecture| (l.room, l.period)))
    ///     .penalize(HardSoftScore::ONE_HARD)
    ///     .as_constraint("Room conflict");
    /// # let _ = conflict;
    /// ```
    pub fn for_each_unique_pair<A, J>(
        &self,
        joiner: J,
    ) -> BiConstraintStream<A, A, Sc>
    where
        A: Fact,
        A::Id: PartialOrd,
        J: Joiner<(A,), A>,
    {
        let ordered: ComparisonJoiner<IdOf<A>, IdOf<A>> =
            less_than(A::planning_id as IdOf<A>, A::planning_id as IdOf<A>);
        let joiner: AndJoiner<_, J> = ordered.and(joiner);
        self.for_each::<A>().join(self.for_each::<A>(), joiner)
    }
}

impl<Sc: Score> Default for ConstraintFactory<Sc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Sc: Score> Clone for ConstraintFactory<Sc> {
    fn clone(&self) -> Self {
        Self {
            cx: Arc::clone(&self.cx),
            _phantom: PhantomData,
        }
    }
}

impl<Sc: Score> fmt::Debug for ConstraintFactory<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintFactory")
            .field("default_package", &self.cx.default_package)
            .field("nullity", &self.cx.nullity)
            .finish()
    }
}
