//! Group-by node.
//!
//! Partitions its input by key and folds every partition through a
//! [`CollectorSet`]. Each non-empty group owns exactly one output tuple
//! `(keys.., results..)`; any membership change retracts that tuple and
//! inserts its replacement.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use indexmap::IndexMap;
use smallvec::SmallVec;

use scoreflow_core::StateError;

use super::{Node, NodeSpec, Propagation, Side};
use crate::stream::collector::CollectorSet;
use crate::tuple::{Element, Tuple, TupleId};

/// Composite key of a group-by: `()` or a tuple of up to four values.
///
/// Every key component becomes one element of the group's output tuple.
pub trait GroupKey: Eq + Hash + Clone + Send + Sync + 'static {
    fn push_elements(&self, out: &mut SmallVec<[Element; 4]>);
}

impl GroupKey for () {
    fn push_elements(&self, _out: &mut SmallVec<[Element; 4]>) {}
}

macro_rules! impl_group_key {
    ($($k:ident : $idx:tt),+) => {
        impl<$($k),+> GroupKey for ($($k,)+)
        where
            $($k: Eq + Hash + Clone + Debug + Send + Sync + 'static,)+
        {
            fn push_elements(&self, out: &mut SmallVec<[Element; 4]>) {
                $(out.push(Arc::new(self.$idx.clone()));)+
            }
        }
    };
}

impl_group_key!(K1: 0);
impl_group_key!(K1: 0, K2: 1);
impl_group_key!(K1: 0, K2: 1, K3: 2);
impl_group_key!(K1: 0, K2: 1, K3: 2, K4: 3);

pub(crate) struct GroupSpec<K, KF, CS, Args> {
    key: Arc<KF>,
    collectors: Arc<CS>,
    _marker: PhantomData<fn() -> (K, Args)>,
}

impl<K, KF, CS, Args> GroupSpec<K, KF, CS, Args>
where
    K: GroupKey,
    KF: Fn(&Tuple) -> K + Send + Sync + 'static,
    CS: CollectorSet<Args>,
    Args: 'static,
{
    pub(crate) fn new(key: KF, collectors: CS) -> Self {
        Self {
            key: Arc::new(key),
            collectors: Arc::new(collectors),
            _marker: PhantomData,
        }
    }
}

fn output<K: GroupKey, CS: CollectorSet<Args>, Args>(key: &K, accumulators: &CS::Accumulators) -> Tuple {
    let mut elements = SmallVec::new();
    key.push_elements(&mut elements);
    CS::finish(accumulators, &mut elements);
    Tuple::from_elements(elements)
}

impl<K, KF, CS, Args> NodeSpec for GroupSpec<K, KF, CS, Args>
where
    K: GroupKey,
    KF: Fn(&Tuple) -> K + Send + Sync + 'static,
    CS: CollectorSet<Args>,
    Args: 'static,
{
    fn name(&self) -> &'static str {
        "group_by"
    }

    fn instantiate(&self) -> Box<dyn Node> {
        Box::new(GroupNode::<K, KF, CS, Args> {
            key: Arc::clone(&self.key),
            collectors: Arc::clone(&self.collectors),
            groups: IndexMap::new(),
            members: HashMap::new(),
        })
    }

    fn evaluate(&self, inputs: &[&[Tuple]]) -> Vec<Tuple> {
        let mut groups: IndexMap<K, CS::Accumulators> = IndexMap::new();
        for tuple in inputs[0] {
            let values = self.collectors.extract(tuple);
            let accumulators = groups
                .entry((self.key)(tuple))
                .or_insert_with(|| self.collectors.create_accumulators());
            CS::accumulate(accumulators, &values);
        }
        groups
            .iter()
            .map(|(key, accumulators)| output::<K, CS, Args>(key, accumulators))
            .collect()
    }
}

struct Group<Acc> {
    accumulators: Acc,
    size: usize,
    output: Option<TupleId>,
}

struct GroupNode<K, KF, CS: CollectorSet<Args>, Args> {
    key: Arc<KF>,
    collectors: Arc<CS>,
    groups: IndexMap<K, Group<CS::Accumulators>>,
    // Key and extracted values of every member, for exact retraction.
    members: HashMap<TupleId, (K, CS::Values)>,
}

impl<K, KF, CS, Args> GroupNode<K, KF, CS, Args>
where
    K: GroupKey,
    CS: CollectorSet<Args>,
{
    /// Replaces the output tuple of `key`'s group, dropping the group
    /// once it is empty.
    fn refresh(&mut self, key: &K, cx: &mut Propagation<'_>) {
        let Some(group) = self.groups.get_mut(key) else {
            return;
        };
        if let Some(old) = group.output.take() {
            cx.retract(old);
            cx.release(old);
        }
        if group.size == 0 {
            self.groups.shift_remove(key);
            return;
        }
        let out = cx.alloc(output::<K, CS, Args>(key, &group.accumulators));
        group.output = Some(out);
        cx.insert(out);
    }
}

impl<K, KF, CS, Args> Node for GroupNode<K, KF, CS, Args>
where
    K: GroupKey,
    KF: Fn(&Tuple) -> K + Send + Sync + 'static,
    CS: CollectorSet<Args>,
    Args: 'static,
{
    fn insert(&mut self, _: Side, id: TupleId, cx: &mut Propagation<'_>) -> Result<(), StateError> {
        let tuple = cx.tuple(id)?;
        let key = (self.key)(tuple);
        let values = self.collectors.extract(tuple);

        let collectors = &self.collectors;
        let group = self.groups.entry(key.clone()).or_insert_with(|| Group {
            accumulators: collectors.create_accumulators(),
            size: 0,
            output: None,
        });
        CS::accumulate(&mut group.accumulators, &values);
        group.size += 1;

        self.members.insert(id, (key.clone(), values));
        self.refresh(&key, cx);
        Ok(())
    }

    fn retract(&mut self, _: Side, id: TupleId, cx: &mut Propagation<'_>) -> Result<(), StateError> {
        let (key, values) = self.members.remove(&id).ok_or_else(|| cx.unknown())?;
        let group = self.groups.get_mut(&key).ok_or_else(|| cx.unknown())?;
        if group.size == 0 {
            return Err(StateError::NegativeGroupSize { node: cx.node });
        }
        CS::retract(&mut group.accumulators, &values);
        group.size -= 1;
        self.refresh(&key, cx);
        Ok(())
    }
}
