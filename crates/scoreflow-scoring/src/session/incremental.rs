//! Incremental backend: live node state per session.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::trace;

use scoreflow_config::BackendKind;
use scoreflow_core::{Score, StateError};

use super::backend::{ConstraintTotal, FactHandle, FactId, PropagationBackend};
use super::graph::ConstraintGraph;
use crate::node::{Node, Operation, Propagation, Side, Signal, SourceNode, Target};
use crate::tuple::{Tuple, TupleArena, TupleId};

/// Running total of one constraint.
struct Scorer<Sc> {
    /// Impact of every tuple currently matching.
    matches: IndexMap<TupleId, Sc>,
    total: Sc,
}

/// Source tuples created for one fact, in insertion order.
struct FactRecord {
    sources: SmallVec<[(usize, TupleId); 2]>,
}

pub(crate) struct IncrementalBackend<Sc> {
    graph: Arc<ConstraintGraph<Sc>>,
    nodes: Vec<Box<dyn Node>>,
    scorers: Vec<Scorer<Sc>>,
    arena: TupleArena,
    queue: VecDeque<Operation>,
    released: Vec<TupleId>,
    facts: HashMap<FactId, FactRecord>,
}

impl<Sc: Score> IncrementalBackend<Sc> {
    pub(crate) fn new(graph: Arc<ConstraintGraph<Sc>>) -> Self {
        let nodes = Self::instantiate(&graph);
        let scorers = Self::fresh_scorers(&graph);
        Self {
            graph,
            nodes,
            scorers,
            arena: TupleArena::new(),
            queue: VecDeque::new(),
            released: Vec::new(),
            facts: HashMap::new(),
        }
    }

    fn instantiate(graph: &ConstraintGraph<Sc>) -> Vec<Box<dyn Node>> {
        graph
            .nodes
            .iter()
            .map(|node| match node.spec() {
                Some(spec) => spec.instantiate(),
                None => Box::new(SourceNode) as Box<dyn Node>,
            })
            .collect()
    }

    fn fresh_scorers(graph: &ConstraintGraph<Sc>) -> Vec<Scorer<Sc>> {
        graph
            .constraints
            .iter()
            .map(|_| Scorer {
                matches: IndexMap::new(),
                total: Sc::zero(),
            })
            .collect()
    }

    /// Tuples currently allocated across all nodes.
    #[cfg(test)]
    pub(crate) fn live_tuple_count(&self) -> usize {
        self.arena.len()
    }

    /// Processes queued operations until the graph is quiet, then frees the
    /// tuples retracted on the way.
    fn drain(&mut self) -> Result<(), StateError> {
        while let Some(op) = self.queue.pop_front() {
            match op.target {
                Target::Node { index, side } => {
                    let graph_node = &self.graph.nodes[index];
                    let mut cx = Propagation {
                        node: graph_node.name(),
                        arena: &mut self.arena,
                        queue: &mut self.queue,
                        released: &mut self.released,
                        children: &graph_node.children,
                    };
                    let node = &mut self.nodes[index];
                    match op.signal {
                        Signal::Insert => node.insert(side, op.tuple, &mut cx)?,
                        Signal::Retract => node.retract(side, op.tuple, &mut cx)?,
                    }
                }
                Target::Terminal(constraint) => self.score_tuple(constraint, op.signal, op.tuple)?,
            }
        }
        let released = self.released.len();
        for id in self.released.drain(..) {
            self.arena.release(id);
        }
        trace!(event = "drain", released, live_tuples = self.arena.len());
        Ok(())
    }

    fn score_tuple(&mut self, constraint: usize, signal: Signal, id: TupleId) -> Result<(), StateError> {
        let scorer = &mut self.scorers[constraint];
        match signal {
            Signal::Insert => {
                let tuple = self
                    .arena
                    .get(id)
                    .ok_or(StateError::UnknownTuple { node: "scorer" })?;
                let impact = self.graph.constraints[constraint].impact(tuple)?;
                scorer.matches.insert(id, impact);
                scorer.total = scorer.total + impact;
            }
            Signal::Retract => {
                let impact = scorer
                    .matches
                    .swap_remove(&id)
                    .ok_or(StateError::UnknownTuple { node: "scorer" })?;
                scorer.total = scorer.total - impact;
            }
        }
        Ok(())
    }
}

impl<Sc: Score> PropagationBackend<Sc> for IncrementalBackend<Sc> {
    fn kind(&self) -> BackendKind {
        BackendKind::Incremental
    }

    fn insert(&mut self, fact: FactHandle) -> Result<(), StateError> {
        if self.facts.contains_key(&fact.id) {
            return Err(StateError::FactAlreadyInserted {
                fact_type: fact.type_name,
                id: format!("{:?}", fact.id),
            });
        }
        let mut sources = SmallVec::new();
        for index in self.graph.sources_for(fact.type_id, fact.uninitialized) {
            let id = self.arena.insert(Tuple::of(Arc::clone(&fact.element)));
            sources.push((index, id));
            self.queue.push_back(Operation {
                target: Target::Node {
                    index,
                    side: Side::Left,
                },
                signal: Signal::Insert,
                tuple: id,
            });
        }
        self.facts.insert(fact.id, FactRecord { sources });
        self.drain()
    }

    fn retract(&mut self, id: FactId) -> Result<(), StateError> {
        let record = self.facts.remove(&id).ok_or_else(|| StateError::FactNotInserted {
            fact_type: "fact",
            id: format!("{:?}", id),
        })?;
        for &(index, tuple) in record.sources.iter().rev() {
            self.queue.push_back(Operation {
                target: Target::Node {
                    index,
                    side: Side::Left,
                },
                signal: Signal::Retract,
                tuple,
            });
            self.released.push(tuple);
        }
        self.drain()
    }

    fn score(&mut self) -> Result<Sc, StateError> {
        Ok(self
            .scorers
            .iter()
            .fold(Sc::zero(), |total, scorer| total + scorer.total))
    }

    fn constraint_totals(&mut self) -> Result<Vec<ConstraintTotal<Sc>>, StateError> {
        Ok(self
            .scorers
            .iter()
            .map(|scorer| ConstraintTotal {
                score: scorer.total,
                match_count: scorer.matches.len(),
            })
            .collect())
    }

    fn matches(&mut self, constraint: usize) -> Result<Vec<(Tuple, Sc)>, StateError> {
        let scorer = &self.scorers[constraint];
        scorer
            .matches
            .iter()
            .map(|(&id, &impact)| {
                self.arena
                    .get(id)
                    .cloned()
                    .map(|tuple| (tuple, impact))
                    .ok_or(StateError::UnknownTuple { node: "scorer" })
            })
            .collect()
    }

    fn clear(&mut self) {
        self.nodes = Self::instantiate(&self.graph);
        self.scorers = Self::fresh_scorers(&self.graph);
        self.arena.clear();
        self.queue.clear();
        self.released.clear();
        self.facts.clear();
    }
}
