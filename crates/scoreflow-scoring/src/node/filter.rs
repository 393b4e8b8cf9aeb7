//! Filter node.

use std::collections::HashSet;
use std::sync::Arc;

use scoreflow_core::StateError;

use super::{Node, NodeSpec, Propagation, Side};
use crate::tuple::{Tuple, TupleId};

pub(crate) struct FilterSpec<P> {
    predicate: Arc<P>,
}

impl<P> FilterSpec<P>
where
    P: Fn(&Tuple) -> bool + Send + Sync + 'static,
{
    pub(crate) fn new(predicate: P) -> Self {
        Self {
            predicate: Arc::new(predicate),
        }
    }
}

impl<P> NodeSpec for FilterSpec<P>
where
    P: Fn(&Tuple) -> bool + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "filter"
    }

    fn instantiate(&self) -> Box<dyn Node> {
        Box::new(FilterNode {
            predicate: Arc::clone(&self.predicate),
            passed: HashSet::new(),
        })
    }

    fn evaluate(&self, inputs: &[&[Tuple]]) -> Vec<Tuple> {
        inputs[0]
            .iter()
            .filter(|tuple| (self.predicate)(*tuple))
            .cloned()
            .collect()
    }
}

struct FilterNode<P> {
    predicate: Arc<P>,
    // Inputs that passed; the predicate is not re-run on retract.
    passed: HashSet<TupleId>,
}

impl<P> Node for FilterNode<P>
where
    P: Fn(&Tuple) -> bool + Send + Sync + 'static,
{
    fn insert(&mut self, _: Side, id: TupleId, cx: &mut Propagation<'_>) -> Result<(), StateError> {
        if (self.predicate)(cx.tuple(id)?) {
            self.passed.insert(id);
            cx.insert(id);
        }
        Ok(())
    }

    fn retract(&mut self, _: Side, id: TupleId, cx: &mut Propagation<'_>) -> Result<(), StateError> {
        if self.passed.remove(&id) {
            cx.retract(id);
        }
        Ok(())
    }
}
