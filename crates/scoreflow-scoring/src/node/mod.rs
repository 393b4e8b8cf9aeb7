//! Node graph of the incremental backend.
//!
//! Every stream operation compiles to a [`NodeSpec`]: an immutable,
//! shareable description that can both instantiate a live [`Node`] for a
//! session and evaluate itself in batch over whole input lists.
//!
//! Live nodes never call each other. They receive one insert or retract at
//! a time and push their own outputs onto the session's operation queue
//! through a [`Propagation`] context, which the backend drains in FIFO
//! order.

mod distinct;
mod exists;
mod filter;
mod flatten;
mod group;
mod join;
mod map;

#[cfg(test)]
mod tests;

use std::collections::VecDeque;

use scoreflow_core::StateError;

use crate::tuple::{Tuple, TupleArena, TupleId};

pub(crate) use distinct::DistinctSpec;
pub(crate) use exists::ExistsSpec;
pub(crate) use filter::FilterSpec;
pub(crate) use flatten::FlattenSpec;
pub(crate) use group::GroupSpec;
pub use group::GroupKey;
pub(crate) use join::JoinSpec;
pub(crate) use map::MapSpec;

/// Input side of a node. Single-input nodes only use `Left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Side {
    Left,
    Right,
}

/// Receiver of a node's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Node { index: usize, side: Side },
    /// Index of a live constraint's scorer.
    Terminal(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signal {
    Insert,
    Retract,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Operation {
    pub(crate) target: Target,
    pub(crate) signal: Signal,
    pub(crate) tuple: TupleId,
}

/// Everything a node may touch while handling one operation.
pub(crate) struct Propagation<'a> {
    pub(crate) node: &'static str,
    pub(crate) arena: &'a mut TupleArena,
    pub(crate) queue: &'a mut VecDeque<Operation>,
    pub(crate) released: &'a mut Vec<TupleId>,
    pub(crate) children: &'a [Target],
}

impl Propagation<'_> {
    /// Resolves a tuple this node holds.
    #[inline]
    pub(crate) fn tuple(&self, id: TupleId) -> Result<&Tuple, StateError> {
        self.arena
            .get(id)
            .ok_or(StateError::UnknownTuple { node: self.node })
    }

    /// Stores a new output tuple.
    #[inline]
    pub(crate) fn alloc(&mut self, tuple: Tuple) -> TupleId {
        self.arena.insert(tuple)
    }

    /// Sends `id` to every child as an insert.
    pub(crate) fn insert(&mut self, id: TupleId) {
        self.emit(id, Signal::Insert);
    }

    /// Sends `id` to every child as a retract.
    pub(crate) fn retract(&mut self, id: TupleId) {
        self.emit(id, Signal::Retract);
    }

    /// Frees an output tuple once the queue has drained; children may still
    /// have to look it up while handling the retract.
    pub(crate) fn release(&mut self, id: TupleId) {
        self.released.push(id);
    }

    fn emit(&mut self, tuple: TupleId, signal: Signal) {
        for &target in self.children {
            self.queue.push_back(Operation {
                target,
                signal,
                tuple,
            });
        }
    }

    pub(crate) fn unknown(&self) -> StateError {
        StateError::UnknownTuple { node: self.node }
    }
}

/// Live node state of one session.
pub(crate) trait Node: Send {
    fn insert(&mut self, side: Side, tuple: TupleId, cx: &mut Propagation<'_>)
        -> Result<(), StateError>;

    fn retract(&mut self, side: Side, tuple: TupleId, cx: &mut Propagation<'_>)
        -> Result<(), StateError>;
}

/// Immutable description of a stream operation.
pub(crate) trait NodeSpec: Send + Sync {
    /// Short operation name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Number of inputs: 1, or 2 for joins and existence checks.
    fn input_count(&self) -> usize {
        1
    }

    fn instantiate(&self) -> Box<dyn Node>;

    /// Output of this operation over complete input lists, one list per
    /// input.
    fn evaluate(&self, inputs: &[&[Tuple]]) -> Vec<Tuple>;

    /// The first indexable joiner declared after a filtering joiner.
    fn joiner_order_violation(&self) -> Option<&'static str> {
        None
    }
}

/// Passthrough node of a fact-type source.
pub(crate) struct SourceNode;

impl Node for SourceNode {
    fn insert(&mut self, _: Side, tuple: TupleId, cx: &mut Propagation<'_>) -> Result<(), StateError> {
        cx.insert(tuple);
        Ok(())
    }

    fn retract(&mut self, _: Side, tuple: TupleId, cx: &mut Propagation<'_>) -> Result<(), StateError> {
        cx.retract(tuple);
        Ok(())
    }
}
