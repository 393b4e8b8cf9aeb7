//! Streams of element pairs.

use std::fmt::Debug;
use std::sync::Arc;

use scoreflow_core::{Fact, Score};

use super::joiner::Joiner;
use super::plan::StreamNode;
use super::{TriConstraintStream, UniConstraintStream};
use crate::node::{FlattenSpec, JoinSpec};
use crate::tuple::{Element, Tuple};

impl_arity_stream!(BiConstraintStream, A: 0, B: 1);

impl<A, B, Sc> BiConstraintStream<A, B, Sc>
where
    A: Debug + Send + Sync + 'static,
    B: Debug + Send + Sync + 'static,
    Sc: Score,
{
    /// Extends every pair with each element of `other` accepted by `joiner`.
    ///
    /// Left mappings of the joiner take both elements of the pair.
    pub fn join<C, J>(self, other: UniConstraintStream<C, Sc>, joiner: J) -> TriConstraintStream<A, B, C, Sc>
    where
        C: Debug + Send + Sync + 'static,
        J: Joiner<(A, B), C>,
    {
        let distinct = self.node.distinct && other.node.distinct;
        let spec = JoinSpec::<(A, B), C, J>::new(joiner);
        TriConstraintStream::from_node(StreamNode::binary(&self.node, &other.node, spec, distinct), self.cx)
    }

    pub fn join_each<C, J>(self, joiner: J) -> TriConstraintStream<A, B, C, Sc>
    where
        C: Fact,
        J: Joiner<(A, B), C>,
    {
        let other = UniConstraintStream::from_node(self.cx.source::<C>(), Arc::clone(&self.cx));
        self.join(other, joiner)
    }

    /// Replaces the second element by each item of `expand(second)`.
    pub fn flatten_last<R, I, F>(self, expand: F) -> BiConstraintStream<A, R, Sc>
    where
        R: Debug + Send + Sync + 'static,
        I: IntoIterator<Item = R>,
        F: Fn(&B) -> I + Send + Sync + 'static,
    {
        let spec = FlattenSpec::new(move |tuple: &Tuple| -> Vec<Element> {
            expand(tuple.fact::<B>(1))
                .into_iter()
                .map(|item| Arc::new(item) as Element)
                .collect()
        });
        BiConstraintStream::from_node(StreamNode::unary(&self.node, spec, false), self.cx)
    }
}
