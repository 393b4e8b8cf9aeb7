//! Streams of element quadruples.
//!
//! Quad is the widest arity; there is no `join` from here.

use std::fmt::Debug;
use std::sync::Arc;

use scoreflow_core::Score;

use super::plan::StreamNode;
use crate::node::FlattenSpec;
use crate::tuple::{Element, Tuple};

impl_arity_stream!(QuadConstraintStream, A: 0, B: 1, C: 2, D: 3);

impl<A, B, C, D, Sc> QuadConstraintStream<A, B, C, D, Sc>
where
    A: Debug + Send + Sync + 'static,
    B: Debug + Send + Sync + 'static,
    C: Debug + Send + Sync + 'static,
    D: Debug + Send + Sync + 'static,
    Sc: Score,
{
    pub fn flatten_last<R, I, F>(self, expand: F) -> QuadConstraintStream<A, B, C, R, Sc>
    where
        R: Debug + Send + Sync + 'static,
        I: IntoIterator<Item = R>,
        F: Fn(&D) -> I + Send + Sync + 'static,
    {
        let spec = FlattenSpec::new(move |tuple: &Tuple| -> Vec<Element> {
            expand(tuple.fact::<D>(3))
                .into_iter()
                .map(|item| Arc::new(item) as Element)
                .collect()
        });
        QuadConstraintStream::from_node(StreamNode::unary(&self.node, spec, false), self.cx)
    }
}
