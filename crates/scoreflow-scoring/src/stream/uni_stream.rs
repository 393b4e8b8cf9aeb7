//! Streams of single elements.

use std::fmt::Debug;
use std::sync::Arc;

use scoreflow_config::NullityPolicy;
use scoreflow_core::{Fact, Score};

use super::joiner::Joiner;
use super::plan::StreamNode;
use super::BiConstraintStream;
use crate::node::{FlattenSpec, JoinSpec};
use crate::tuple::{Element, Tuple};

impl_arity_stream!(UniConstraintStream, A: 0);

impl<A, Sc> UniConstraintStream<A, Sc>
where
    A: Debug + Send + Sync + 'static,
    Sc: Score,
{
    /// Pairs every element with every element of `other` accepted by
    /// `joiner`. The output is distinct when both inputs are.
    ///
    /// # Example
    ///
    /// ```
    /// use scoreflow_scoring::stream::joiner::equal_bi;
    /// use scoreflow_scoring::ConstraintFactory;
    /// use scoreflow_core::{Fact, PlanningId, SimpleScore};
    ///
    /// #[derive(Debug)]
    /// struct Lecture { id: u32, teacher: u32 }
    /// impl PlanningId for Lecture { type Id = u32; fn planning_id(&self) -> u32 { self.id } }
    /// impl Fact for Lecture {}
    ///
    /// #[derive(Debug)]
    /// struct Unavailable { teacher: u32 }
    /// impl PlanningId for Unavailable { type Id = u32; fn planning_id(&self) -> u32 { self.teacher } }
    /// impl Fact for Unavailable {}
    ///
    /// let factory = ConstraintFactory::<SimpleScore>::new();
    /// let constraint = factory
    ///     .for_each::<Lecture>()
    ///     .join(
    ///         factory.for_each::<Unavailable>(),
    ///         equal_bi(|l: &Lecture| l.teacher, |u: &Unavailable| u.teacher),
    ///     )
    ///     .penalize(SimpleScore::of(1))
    ///     .as_constraint("Unavailable teacher");
    /// assert_eq!(constraint.name(), "Unavailable teacher");
    /// ```
    pub fn join<B, J>(self, other: UniConstraintStream<B, Sc>, joiner: J) -> BiConstraintStream<A, B, Sc>
    where
        B: Debug + Send + Sync + 'static,
        J: Joiner<(A,), B>,
    {
        let distinct = self.node.distinct && other.node.distinct;
        let spec = JoinSpec::<(A,), B, J>::new(joiner);
        BiConstraintStream::from_node(StreamNode::binary(&self.node, &other.node, spec, distinct), self.cx)
    }

    /// Joins with every `B` fact, as `join(factory.for_each::<B>(), joiner)`.
    pub fn join_each<B, J>(self, joiner: J) -> BiConstraintStream<A, B, Sc>
    where
        B: Fact,
        J: Joiner<(A,), B>,
    {
        let other = UniConstraintStream::from_node(self.cx.source::<B>(), Arc::clone(&self.cx));
        self.join(other, joiner)
    }

    /// Replaces the element by each item of `expand(element)`.
    pub fn flatten_last<R, I, F>(self, expand: F) -> UniConstraintStream<R, Sc>
    where
        R: Debug + Send + Sync + 'static,
        I: IntoIterator<Item = R>,
        F: Fn(&A) -> I + Send + Sync + 'static,
    {
        let spec = FlattenSpec::new(move |tuple: &Tuple| -> Vec<Element> {
            expand(tuple.fact::<A>(0))
                .into_iter()
                .map(|item| Arc::new(item) as Element)
                .collect()
        });
        UniConstraintStream::from_node(StreamNode::unary(&self.node, spec, false), self.cx)
    }
}

impl<A, Sc> UniConstraintStream<A, Sc>
where
    A: Fact,
    Sc: Score,
{
    /// Keeps facts for which another `A` fact satisfies `joiner`. A fact
    /// never matches itself.
    pub fn if_exists_other<J>(self, joiner: J) -> Self
    where
        J: Joiner<(A,), A>,
    {
        let right = self.cx.source::<A>();
        self.exists_with::<A, J>(right, joiner, true, true)
    }

    /// Keeps facts for which no other `A` fact satisfies `joiner`.
    pub fn if_not_exists_other<J>(self, joiner: J) -> Self
    where
        J: Joiner<(A,), A>,
    {
        let right = self.cx.source::<A>();
        self.exists_with::<A, J>(right, joiner, false, true)
    }

    pub fn if_exists_other_including_null_vars<J>(self, joiner: J) -> Self
    where
        J: Joiner<(A,), A>,
    {
        let right = StreamNode::source::<A>(NullityPolicy::IncludeUninitialized);
        self.exists_with::<A, J>(right, joiner, true, true)
    }

    pub fn if_not_exists_other_including_null_vars<J>(self, joiner: J) -> Self
    where
        J: Joiner<(A,), A>,
    {
        let right = StreamNode::source::<A>(NullityPolicy::IncludeUninitialized);
        self.exists_with::<A, J>(right, joiner, false, true)
    }
}
