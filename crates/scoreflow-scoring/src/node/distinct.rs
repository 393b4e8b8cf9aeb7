//! Distinct node: passes one representative per group of equal tuples.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use scoreflow_core::StateError;

use super::{Node, NodeSpec, Propagation, Side};
use crate::tuple::{Tuple, TupleId};

pub(crate) struct DistinctSpec<KF> {
    key: Arc<KF>,
}

impl<K, KF> DistinctSpec<KF>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    KF: Fn(&Tuple) -> K + Send + Sync + 'static,
{
    pub(crate) fn new(key: KF) -> Self {
        Self { key: Arc::new(key) }
    }
}

impl<K, KF> NodeSpec for DistinctSpec<KF>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    KF: Fn(&Tuple) -> K + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "distinct"
    }

    fn instantiate(&self) -> Box<dyn Node> {
        Box::new(DistinctNode::<K, KF> {
            key: Arc::clone(&self.key),
            groups: HashMap::new(),
            members: HashMap::new(),
        })
    }

    fn evaluate(&self, inputs: &[&[Tuple]]) -> Vec<Tuple> {
        let mut first: IndexMap<K, &Tuple> = IndexMap::new();
        for tuple in inputs[0] {
            first.entry((self.key)(tuple)).or_insert(tuple);
        }
        first.into_values().cloned().collect()
    }
}

struct DistinctNode<K, KF> {
    key: Arc<KF>,
    // Equal tuples in arrival order; the first one is propagated.
    groups: HashMap<K, IndexSet<TupleId>>,
    members: HashMap<TupleId, K>,
}

impl<K, KF> Node for DistinctNode<K, KF>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    KF: Fn(&Tuple) -> K + Send + Sync + 'static,
{
    fn insert(&mut self, _: Side, id: TupleId, cx: &mut Propagation<'_>) -> Result<(), StateError> {
        let key = (self.key)(cx.tuple(id)?);
        let group = self.groups.entry(key.clone()).or_default();
        group.insert(id);
        if group.len() == 1 {
            cx.insert(id);
        }
        self.members.insert(id, key);
        Ok(())
    }

    fn retract(&mut self, _: Side, id: TupleId, cx: &mut Propagation<'_>) -> Result<(), StateError> {
        let key = self.members.remove(&id).ok_or_else(|| cx.unknown())?;
        let group = self.groups.get_mut(&key).ok_or_else(|| cx.unknown())?;
        let was_representative = group.first() == Some(&id);
        group.shift_remove(&id);
        if was_representative {
            cx.retract(id);
            if let Some(&next) = group.first() {
                cx.insert(next);
            }
        }
        if group.is_empty() {
            self.groups.remove(&key);
        }
        Ok(())
    }
}
