//! Flatten-last node: expands the last element into zero or more values.

use std::collections::HashMap;
use std::sync::Arc;

use smallvec::SmallVec;

use scoreflow_core::StateError;

use super::{Node, NodeSpec, Propagation, Side};
use crate::tuple::{Element, Tuple, TupleId};

pub(crate) struct FlattenSpec<F> {
    expand: Arc<F>,
}

impl<F> FlattenSpec<F>
where
    F: Fn(&Tuple) -> Vec<Element> + Send + Sync + 'static,
{
    pub(crate) fn new(expand: F) -> Self {
        Self {
            expand: Arc::new(expand),
        }
    }
}

impl<F> NodeSpec for FlattenSpec<F>
where
    F: Fn(&Tuple) -> Vec<Element> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "flatten_last"
    }

    fn instantiate(&self) -> Box<dyn Node> {
        Box::new(FlattenNode {
            expand: Arc::clone(&self.expand),
            outputs: HashMap::new(),
        })
    }

    fn evaluate(&self, inputs: &[&[Tuple]]) -> Vec<Tuple> {
        inputs[0]
            .iter()
            .flat_map(|tuple| {
                (self.expand)(tuple)
                    .into_iter()
                    .map(move |item| tuple.with_last(item))
            })
            .collect()
    }
}

struct FlattenNode<F> {
    expand: Arc<F>,
    outputs: HashMap<TupleId, SmallVec<[TupleId; 4]>>,
}

impl<F> Node for FlattenNode<F>
where
    F: Fn(&Tuple) -> Vec<Element> + Send + Sync + 'static,
{
    fn insert(&mut self, _: Side, id: TupleId, cx: &mut Propagation<'_>) -> Result<(), StateError> {
        let tuple = cx.tuple(id)?;
        let expanded: Vec<Tuple> = (self.expand)(tuple)
            .into_iter()
            .map(|item| tuple.with_last(item))
            .collect();

        let mut outs = SmallVec::new();
        for output in expanded {
            let out = cx.alloc(output);
            outs.push(out);
            cx.insert(out);
        }
        self.outputs.insert(id, outs);
        Ok(())
    }

    fn retract(&mut self, _: Side, id: TupleId, cx: &mut Propagation<'_>) -> Result<(), StateError> {
        let outs = self.outputs.remove(&id).ok_or_else(|| cx.unknown())?;
        for out in outs.into_iter().rev() {
            cx.retract(out);
            cx.release(out);
        }
        Ok(())
    }
}
