//! From-scratch backend: keeps the fact set and evaluates every node in
//! batch when a score is requested.

use std::collections::BTreeMap;
use std::sync::Arc;

use scoreflow_config::BackendKind;
use scoreflow_core::{Score, StateError};

use super::backend::{ConstraintTotal, FactHandle, FactId, PropagationBackend};
use super::graph::ConstraintGraph;
use crate::tuple::Tuple;

/// Matches of every live constraint, computed for one fact set.
struct Evaluation<Sc> {
    matches: Vec<Vec<(Tuple, Sc)>>,
}

pub(crate) struct RecomputeBackend<Sc> {
    graph: Arc<ConstraintGraph<Sc>>,
    facts: BTreeMap<FactId, FactHandle>,
    cached: Option<Evaluation<Sc>>,
}

impl<Sc: Score> RecomputeBackend<Sc> {
    pub(crate) fn new(graph: Arc<ConstraintGraph<Sc>>) -> Self {
        Self {
            graph,
            facts: BTreeMap::new(),
            cached: None,
        }
    }

    fn evaluation(&mut self) -> Result<&Evaluation<Sc>, StateError> {
        if self.cached.is_none() {
            let evaluation = self.evaluate()?;
            self.cached = Some(evaluation);
        }
        self.cached.as_ref().ok_or(StateError::SessionCorrupted)
    }

    /// Nodes are stored in post-order, so a single forward pass sees every
    /// input before the node that reads it.
    fn evaluate(&self) -> Result<Evaluation<Sc>, StateError> {
        let mut outputs: Vec<Vec<Tuple>> = Vec::with_capacity(self.graph.nodes.len());
        for node in &self.graph.nodes {
            let output = match (node.source(), node.spec()) {
                (Some((type_id, policy)), _) => self
                    .facts
                    .values()
                    .filter(|fact| fact.type_id == type_id && policy.admits(fact.uninitialized))
                    .map(|fact| Tuple::of(Arc::clone(&fact.element)))
                    .collect(),
                (None, Some(spec)) => {
                    let inputs: Vec<&[Tuple]> = node
                        .inputs
                        .iter()
                        .map(|&input| outputs[input].as_slice())
                        .collect();
                    spec.evaluate(&inputs)
                }
                (None, None) => Vec::new(),
            };
            outputs.push(output);
        }

        let mut matches = Vec::with_capacity(self.graph.constraints.len());
        for constraint in &self.graph.constraints {
            let scored = outputs[constraint.node]
                .iter()
                .map(|tuple| constraint.impact(tuple).map(|impact| (tuple.clone(), impact)))
                .collect::<Result<Vec<_>, _>>()?;
            matches.push(scored);
        }
        Ok(Evaluation { matches })
    }
}

impl<Sc: Score> PropagationBackend<Sc> for RecomputeBackend<Sc> {
    fn kind(&self) -> BackendKind {
        BackendKind::Recompute
    }

    fn insert(&mut self, fact: FactHandle) -> Result<(), StateError> {
        if self.facts.contains_key(&fact.id) {
            return Err(StateError::FactAlreadyInserted {
                fact_type: fact.type_name,
                id: format!("{:?}", fact.id),
            });
        }
        self.cached = None;
        self.facts.insert(fact.id, fact);
        Ok(())
    }

    fn retract(&mut self, id: FactId) -> Result<(), StateError> {
        self.facts.remove(&id).ok_or_else(|| StateError::FactNotInserted {
            fact_type: "fact",
            id: format!("{:?}", id),
        })?;
        self.cached = None;
        Ok(())
    }

    fn update(&mut self, fact: FactHandle) -> Result<(), StateError> {
        match self.facts.get_mut(&fact.id) {
            Some(slot) => {
                *slot = fact;
                self.cached = None;
                Ok(())
            }
            None => Err(StateError::FactNotInserted {
                fact_type: fact.type_name,
                id: format!("{:?}", fact.id),
            }),
        }
    }

    fn score(&mut self) -> Result<Sc, StateError> {
        let evaluation = self.evaluation()?;
        Ok(evaluation
            .matches
            .iter()
            .flatten()
            .fold(Sc::zero(), |total, (_, impact)| total + *impact))
    }

    fn constraint_totals(&mut self) -> Result<Vec<ConstraintTotal<Sc>>, StateError> {
        let evaluation = self.evaluation()?;
        Ok(evaluation
            .matches
            .iter()
            .map(|matches| ConstraintTotal {
                score: matches
                    .iter()
                    .fold(Sc::zero(), |total, (_, impact)| total + *impact),
                match_count: matches.len(),
            })
            .collect())
    }

    fn matches(&mut self, constraint: usize) -> Result<Vec<(Tuple, Sc)>, StateError> {
        let evaluation = self.evaluation()?;
        Ok(evaluation.matches.get(constraint).cloned().unwrap_or_default())
    }

    fn clear(&mut self) {
        self.facts.clear();
        self.cached = None;
    }
}
