//! Join node: pairs left tuples with right facts whose joiner keys are
//! equal and whose residual joiner tests hold.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use scoreflow_core::StateError;

use super::{Node, NodeSpec, Propagation, Side};
use crate::stream::joiner::{order_violation, Joiner};
use crate::tuple::{Tuple, TupleId};

pub(crate) struct JoinSpec<L, R, J> {
    joiner: Arc<J>,
    _marker: PhantomData<fn() -> (L, R)>,
}

impl<L, R, J> JoinSpec<L, R, J>
where
    L: 'static,
    R: 'static,
    J: Joiner<L, R>,
{
    pub(crate) fn new(joiner: J) -> Self {
        Self {
            joiner: Arc::new(joiner),
            _marker: PhantomData,
        }
    }
}

impl<L, R, J> NodeSpec for JoinSpec<L, R, J>
where
    L: 'static,
    R: 'static,
    J: Joiner<L, R>,
{
    fn name(&self) -> &'static str {
        "join"
    }

    fn input_count(&self) -> usize {
        2
    }

    fn instantiate(&self) -> Box<dyn Node> {
        Box::new(JoinNode::<L, R, J> {
            joiner: Arc::clone(&self.joiner),
            lefts: HashMap::new(),
            rights: HashMap::new(),
            left_index: HashMap::new(),
            right_index: HashMap::new(),
            _marker: PhantomData,
        })
    }

    fn evaluate(&self, inputs: &[&[Tuple]]) -> Vec<Tuple> {
        let mut index: HashMap<J::Key, Vec<&Tuple>> = HashMap::new();
        for right in inputs[1] {
            index.entry(self.joiner.right_key(right)).or_default().push(right);
        }
        let mut joined = Vec::new();
        for left in inputs[0] {
            let Some(bucket) = index.get(&self.joiner.left_key(left)) else {
                continue;
            };
            for right in bucket {
                if self.joiner.test(left, right) {
                    joined.push(left.concat(right));
                }
            }
        }
        joined
    }

    fn joiner_order_violation(&self) -> Option<&'static str> {
        order_violation::<L, R, J>(&self.joiner)
    }
}

struct Entry<K> {
    key: K,
    // Partner on the other side -> joined output tuple.
    partners: IndexMap<TupleId, TupleId>,
}

struct JoinNode<L, R, J: Joiner<L, R>> {
    joiner: Arc<J>,
    lefts: HashMap<TupleId, Entry<J::Key>>,
    rights: HashMap<TupleId, Entry<J::Key>>,
    left_index: HashMap<J::Key, IndexSet<TupleId>>,
    right_index: HashMap<J::Key, IndexSet<TupleId>>,
    _marker: PhantomData<fn() -> (L, R)>,
}

impl<L, R, J> JoinNode<L, R, J>
where
    L: 'static,
    R: 'static,
    J: Joiner<L, R>,
{
    fn insert_left(&mut self, id: TupleId, cx: &mut Propagation<'_>) -> Result<(), StateError> {
        let left = cx.tuple(id)?;
        let key = self.joiner.left_key(left);
        let mut matched = Vec::new();
        if let Some(bucket) = self.right_index.get(&key) {
            for &right_id in bucket {
                let right = cx.tuple(right_id)?;
                if self.joiner.test(left, right) {
                    matched.push((right_id, left.concat(right)));
                }
            }
        }

        let mut partners = IndexMap::with_capacity(matched.len());
        for (right_id, joined) in matched {
            let out = cx.alloc(joined);
            partners.insert(right_id, out);
            if let Some(right) = self.rights.get_mut(&right_id) {
                right.partners.insert(id, out);
            }
            cx.insert(out);
        }
        self.left_index.entry(key.clone()).or_default().insert(id);
        self.lefts.insert(id, Entry { key, partners });
        Ok(())
    }

    fn insert_right(&mut self, id: TupleId, cx: &mut Propagation<'_>) -> Result<(), StateError> {
        let right = cx.tuple(id)?;
        let key = self.joiner.right_key(right);
        let mut matched = Vec::new();
        if let Some(bucket) = self.left_index.get(&key) {
            for &left_id in bucket {
                let left = cx.tuple(left_id)?;
                if self.joiner.test(left, right) {
                    matched.push((left_id, left.concat(right)));
                }
            }
        }

        let mut partners = IndexMap::with_capacity(matched.len());
        for (left_id, joined) in matched {
            let out = cx.alloc(joined);
            partners.insert(left_id, out);
            if let Some(left) = self.lefts.get_mut(&left_id) {
                left.partners.insert(id, out);
            }
            cx.insert(out);
        }
        self.right_index.entry(key.clone()).or_default().insert(id);
        self.rights.insert(id, Entry { key, partners });
        Ok(())
    }
}

/// Removes `id` from its index bucket and every partner entry, retracting
/// the joined outputs.
fn detach<K: std::hash::Hash + Eq>(
    id: TupleId,
    own: &mut HashMap<TupleId, Entry<K>>,
    own_index: &mut HashMap<K, IndexSet<TupleId>>,
    others: &mut HashMap<TupleId, Entry<K>>,
    cx: &mut Propagation<'_>,
) -> Result<(), StateError> {
    let entry = own.remove(&id).ok_or_else(|| cx.unknown())?;
    if let Some(bucket) = own_index.get_mut(&entry.key) {
        bucket.swap_remove(&id);
        if bucket.is_empty() {
            own_index.remove(&entry.key);
        }
    }
    for (partner, out) in entry.partners {
        if let Some(other) = others.get_mut(&partner) {
            other.partners.swap_remove(&id);
        }
        cx.retract(out);
        cx.release(out);
    }
    Ok(())
}

impl<L, R, J> Node for JoinNode<L, R, J>
where
    L: 'static,
    R: 'static,
    J: Joiner<L, R>,
{
    fn insert(&mut self, side: Side, id: TupleId, cx: &mut Propagation<'_>) -> Result<(), StateError> {
        match side {
            Side::Left => self.insert_left(id, cx),
            Side::Right => self.insert_right(id, cx),
        }
    }

    fn retract(&mut self, side: Side, id: TupleId, cx: &mut Propagation<'_>) -> Result<(), StateError> {
        match side {
            Side::Left => detach(id, &mut self.lefts, &mut self.left_index, &mut self.rights, cx),
            Side::Right => detach(id, &mut self.rights, &mut self.right_index, &mut self.lefts, cx),
        }
    }
}
