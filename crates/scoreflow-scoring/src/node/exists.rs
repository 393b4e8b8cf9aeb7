//! Existence node (`if_exists` / `if_not_exists`).
//!
//! Passes a left tuple through while the number of matching right facts is
//! non-zero (exists) or zero (not exists). Only crossings of zero are
//! propagated; additional matches change nothing downstream.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use indexmap::IndexSet;

use scoreflow_core::StateError;

use super::{Node, NodeSpec, Propagation, Side};
use crate::stream::joiner::{order_violation, Joiner};
use crate::tuple::{Tuple, TupleId};

pub(crate) struct ExistsSpec<L, R, J> {
    joiner: Arc<J>,
    should_exist: bool,
    // Never count a right fact that is the left tuple's own first element.
    exclude_self: bool,
    _marker: PhantomData<fn() -> (L, R)>,
}

impl<L, R, J> ExistsSpec<L, R, J>
where
    L: 'static,
    R: 'static,
    J: Joiner<L, R>,
{
    pub(crate) fn new(joiner: J, should_exist: bool, exclude_self: bool) -> Self {
        Self {
            joiner: Arc::new(joiner),
            should_exist,
            exclude_self,
            _marker: PhantomData,
        }
    }
}

fn is_self(left: &Tuple, right: &Tuple) -> bool {
    Arc::ptr_eq(&left.elements()[0], &right.elements()[0])
}

impl<L, R, J> NodeSpec for ExistsSpec<L, R, J>
where
    L: 'static,
    R: 'static,
    J: Joiner<L, R>,
{
    fn name(&self) -> &'static str {
        if self.should_exist {
            "if_exists"
        } else {
            "if_not_exists"
        }
    }

    fn input_count(&self) -> usize {
        2
    }

    fn instantiate(&self) -> Box<dyn Node> {
        Box::new(ExistsNode::<L, R, J> {
            joiner: Arc::clone(&self.joiner),
            should_exist: self.should_exist,
            exclude_self: self.exclude_self,
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
        inputs[0]
            .iter()
            .filter(|left| {
                let exists = index
                    .get(&self.joiner.left_key(left))
                    .is_some_and(|bucket| {
                        bucket.iter().any(|right| {
                            !(self.exclude_self && is_self(left, right))
                                && self.joiner.test(left, right)
                        })
                    });
                exists == self.should_exist
            })
            .cloned()
            .collect()
    }

    fn joiner_order_violation(&self) -> Option<&'static str> {
        order_violation::<L, R, J>(&self.joiner)
    }
}

struct LeftEntry<K> {
    key: K,
    matches: IndexSet<TupleId>,
    propagated: bool,
}

struct RightEntry<K> {
    key: K,
    matches: IndexSet<TupleId>,
}

struct ExistsNode<L, R, J: Joiner<L, R>> {
    joiner: Arc<J>,
    should_exist: bool,
    exclude_self: bool,
    lefts: HashMap<TupleId, LeftEntry<J::Key>>,
    rights: HashMap<TupleId, RightEntry<J::Key>>,
    left_index: HashMap<J::Key, IndexSet<TupleId>>,
    right_index: HashMap<J::Key, IndexSet<TupleId>>,
    _marker: PhantomData<fn() -> (L, R)>,
}

impl<L, R, J> ExistsNode<L, R, J>
where
    L: 'static,
    R: 'static,
    J: Joiner<L, R>,
{
    fn matches(&self, left: &Tuple, right: &Tuple) -> bool {
        !(self.exclude_self && is_self(left, right)) && self.joiner.test(left, right)
    }

    /// Brings the downstream view of `left_id` in line with its count.
    fn sync(&mut self, left_id: TupleId, cx: &mut Propagation<'_>) {
        let Some(entry) = self.lefts.get_mut(&left_id) else {
            return;
        };
        let pass = entry.matches.is_empty() != self.should_exist;
        if pass && !entry.propagated {
            entry.propagated = true;
            cx.insert(left_id);
        } else if !pass && entry.propagated {
            entry.propagated = false;
            cx.retract(left_id);
        }
    }

    fn insert_left(&mut self, id: TupleId, cx: &mut Propagation<'_>) -> Result<(), StateError> {
        let left = cx.tuple(id)?;
        let key = self.joiner.left_key(left);
        let mut matches = IndexSet::new();
        if let Some(bucket) = self.right_index.get(&key) {
            for &right_id in bucket {
                if self.matches(left, cx.tuple(right_id)?) {
                    matches.insert(right_id);
                }
            }
        }
        for right_id in &matches {
            if let Some(right) = self.rights.get_mut(right_id) {
                right.matches.insert(id);
            }
        }
        self.left_index.entry(key.clone()).or_default().insert(id);
        self.lefts.insert(
            id,
            LeftEntry {
                key,
                matches,
                propagated: false,
            },
        );
        self.sync(id, cx);
        Ok(())
    }

    fn insert_right(&mut self, id: TupleId, cx: &mut Propagation<'_>) -> Result<(), StateError> {
        let right = cx.tuple(id)?;
        let key = self.joiner.right_key(right);
        let mut matches = IndexSet::new();
        if let Some(bucket) = self.left_index.get(&key) {
            for &left_id in bucket {
                if self.matches(cx.tuple(left_id)?, right) {
                    matches.insert(left_id);
                }
            }
        }
        self.right_index.entry(key.clone()).or_default().insert(id);
        self.rights.insert(
            id,
            RightEntry {
                key,
                matches: matches.clone(),
            },
        );
        for left_id in matches {
            if let Some(left) = self.lefts.get_mut(&left_id) {
                left.matches.insert(id);
            }
            self.sync(left_id, cx);
        }
        Ok(())
    }

    fn retract_left(&mut self, id: TupleId, cx: &mut Propagation<'_>) -> Result<(), StateError> {
        let entry = self.lefts.remove(&id).ok_or_else(|| cx.unknown())?;
        if let Some(bucket) = self.left_index.get_mut(&entry.key) {
            bucket.swap_remove(&id);
            if bucket.is_empty() {
                self.left_index.remove(&entry.key);
            }
        }
        for right_id in &entry.matches {
            if let Some(right) = self.rights.get_mut(right_id) {
                right.matches.swap_remove(&id);
            }
        }
        if entry.propagated {
            cx.retract(id);
        }
        Ok(())
    }

    fn retract_right(&mut self, id: TupleId, cx: &mut Propagation<'_>) -> Result<(), StateError> {
        let entry = self.rights.remove(&id).ok_or_else(|| cx.unknown())?;
        if let Some(bucket) = self.right_index.get_mut(&entry.key) {
            bucket.swap_remove(&id);
            if bucket.is_empty() {
                self.right_index.remove(&entry.key);
            }
        }
        for left_id in entry.matches {
            if let Some(left) = self.lefts.get_mut(&left_id) {
                left.matches.swap_remove(&id);
            }
            self.sync(left_id, cx);
        }
        Ok(())
    }
}

impl<L, R, J> Node for ExistsNode<L, R, J>
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
            Side::Left => self.retract_left(id, cx),
            Side::Right => self.retract_right(id, cx),
        }
    }
}
