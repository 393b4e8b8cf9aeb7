//! Streams of element triples.

use std::fmt::Debug;
use std::sync::Arc;

use scoreflow_core::{Fact, Score};

use super::joiner::Joiner;
use super::plan::StreamNode;
use super::{QuadConstraintStream, UniConstraintStream};
use crate::node::{FlattenSpec, JoinSpec};
use crate::tuple::{Element, Tuple};

impl_arity_stream!(TriConstraintStream, A: 0, B: 1, C: 2);

impl<A, B, C, Sc> TriConstraintStream<A, B, C, Sc>
where
    A: Debug + Send + Sync + 'static,
    B: Debug + Send + Sync + 'static,
    C: Debug + Send + Sync + 'static,
    Sc: Score,
{
    pub fn join<D, J>(self, other: UniConstraintStream<D, Sc>, joiner: J) -> QuadConstraintStream<A, B, C, D, Sc>
    where
        D: Debug + Send + Sync + 'static,
        J: Joiner<(A, B, C), D>,
    {
        let distinct = self.node.distinct && other.node.distinct;
        let spec = JoinSpec::<(A, B, C), D, J>::new(joiner);
        QuadConstraintStream::from_node(StreamNode::binary(&self.node, &other.node, spec, distinct), self.cx)
    }

    pub fn join_each<D, J>(self, joiner: J) -> QuadConstraintStream<A, B, C, D, Sc>
    where
        D: Fact,
        J: Joiner<(A, B, C), D>,
    {
        let other = UniConstraintStream::from_node(self.cx.source::<D>(), Arc::clone(&self.cx));
        self.join(other, joiner)
    }

    pub fn flatten_last<R, I, F>(self, expand: F) -> TriConstraintStream<A, B, R, Sc>
    where
        R: Debug + Send + Sync + 'static,
        I: IntoIterator<Item = R>,
        F: Fn(&C) -> I + Send + Sync + 'static,
    {
        let spec = FlattenSpec::new(move |tuple: &Tuple| -> Vec<Element> {
            expand(tuple.fact::<C>(2))
                .into_iter()
                .map(|item| Arc::new(item) as Element)
                .collect()
        });
        TriConstraintStream::from_node(StreamNode::unary(&self.node, spec, false), self.cx)
    }
}
