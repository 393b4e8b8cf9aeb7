//! Map node: one output tuple per input, holding the mapped value.

use std::collections::HashMap;
use std::sync::Arc;

use scoreflow_core::StateError;

use super::{Node, NodeSpec, Propagation, Side};
use crate::tuple::{Element, Tuple, TupleId};

pub(crate) struct MapSpec<F> {
    mapping: Arc<F>,
}

impl<F> MapSpec<F>
where
    F: Fn(&Tuple) -> Element + Send + Sync + 'static,
{
    pub(crate) fn new(mapping: F) -> Self {
        Self {
            mapping: Arc::new(mapping),
        }
    }
}

impl<F> NodeSpec for MapSpec<F>
where
    F: Fn(&Tuple) -> Element + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "map"
    }

    fn instantiate(&self) -> Box<dyn Node> {
        Box::new(MapNode {
            mapping: Arc::clone(&self.mapping),
            outputs: HashMap::new(),
        })
    }

    fn evaluate(&self, inputs: &[&[Tuple]]) -> Vec<Tuple> {
        inputs[0]
            .iter()
            .map(|tuple| Tuple::of((self.mapping)(tuple)))
            .collect()
    }
}

struct MapNode<F> {
    mapping: Arc<F>,
    outputs: HashMap<TupleId, TupleId>,
}

impl<F> Node for MapNode<F>
where
    F: Fn(&Tuple) -> Element + Send + Sync + 'static,
{
    fn insert(&mut self, _: Side, id: TupleId, cx: &mut Propagation<'_>) -> Result<(), StateError> {
        let mapped = (self.mapping)(cx.tuple(id)?);
        let out = cx.alloc(Tuple::of(mapped));
        self.outputs.insert(id, out);
        cx.insert(out);
        Ok(())
    }

    fn retract(&mut self, _: Side, id: TupleId, cx: &mut Propagation<'_>) -> Result<(), StateError> {
        let out = self.outputs.remove(&id).ok_or_else(|| cx.unknown())?;
        cx.retract(out);
        cx.release(out);
        Ok(())
    }
}
