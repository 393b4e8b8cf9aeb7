//! Compilation of constraint plans into one shared node graph.
//!
//! Every live constraint's stream plan is walked depth first. Plan nodes
//! shared by pointer compile once, and sources of the same fact type and
//! nullity policy collapse into one node, so a fact enters the graph once
//! per source no matter how many constraints read it. Nodes are numbered in
//! post-order: every node comes after all of its inputs.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use smallvec::SmallVec;

use scoreflow_config::NullityPolicy;
use scoreflow_core::{ConstraintRef, DefinitionError, ImpactType, Score, ScoreLevel, StateError};

use crate::node::{NodeSpec, Side, Target};
use crate::stream::builder::MatchWeigher;
use crate::stream::plan::{StreamNode, StreamOp};
use crate::tuple::Tuple;

pub(crate) struct GraphNode {
    pub(crate) stream: Arc<StreamNode>,
    pub(crate) inputs: SmallVec<[usize; 2]>,
    pub(crate) children: Vec<Target>,
}

impl GraphNode {
    pub(crate) fn name(&self) -> &'static str {
        self.stream.name()
    }

    pub(crate) fn spec(&self) -> Option<&dyn NodeSpec> {
        match &self.stream.op {
            StreamOp::Source { .. } => None,
            StreamOp::Operation(spec) => Some(spec.as_ref()),
        }
    }

    /// Fact type and policy, for source nodes.
    pub(crate) fn source(&self) -> Option<(TypeId, NullityPolicy)> {
        match &self.stream.op {
            StreamOp::Source { type_id, policy, .. } => Some((*type_id, *policy)),
            StreamOp::Operation(_) => None,
        }
    }
}

/// A live constraint with its weight resolved.
pub(crate) struct CompiledConstraint<Sc> {
    pub(crate) constraint_ref: ConstraintRef,
    pub(crate) impact_type: ImpactType,
    pub(crate) weight: Sc,
    pub(crate) weigher: MatchWeigher,
    /// Graph node feeding this constraint's terminal.
    pub(crate) node: usize,
}

impl<Sc: Score> CompiledConstraint<Sc> {
    /// Score delta of one match.
    pub(crate) fn impact(&self, tuple: &Tuple) -> Result<Sc, StateError> {
        let match_weight = (self.weigher)(tuple);
        if !self.impact_type.accepts(match_weight) {
            return Err(StateError::InvalidMatchWeight {
                constraint: self.constraint_ref.full_name(),
                match_weight,
            });
        }
        Ok(self.impact_type.apply(self.weight, match_weight))
    }

    /// A constraint is hard when the first non-zero level of its weight is a
    /// hard level.
    pub(crate) fn is_hard(&self) -> bool {
        self.weight
            .to_level_numbers()
            .iter()
            .position(|&level| level != 0)
            .is_some_and(|index| Sc::level_label(index) == ScoreLevel::Hard)
    }
}

/// Immutable graph template shared by every session of a factory.
pub(crate) struct ConstraintGraph<Sc> {
    pub(crate) nodes: Vec<GraphNode>,
    pub(crate) constraints: Vec<CompiledConstraint<Sc>>,
}

impl<Sc: Score> ConstraintGraph<Sc> {
    pub(crate) fn compile(live: Vec<(ConstraintRef, ImpactType, Sc, MatchWeigher, Arc<StreamNode>)>) -> Self {
        let mut builder = GraphBuilder::default();
        let mut constraints = Vec::with_capacity(live.len());
        for (constraint_ref, impact_type, weight, weigher, stream) in live {
            let node = builder.visit(&stream);
            builder.nodes[node]
                .children
                .push(Target::Terminal(constraints.len()));
            constraints.push(CompiledConstraint {
                constraint_ref,
                impact_type,
                weight,
                weigher,
                node,
            });
        }
        Self {
            nodes: builder.nodes,
            constraints,
        }
    }

    /// Indices of the source nodes `fact` of type `type_id` enters.
    pub(crate) fn sources_for(&self, type_id: TypeId, uninitialized: u32) -> impl Iterator<Item = usize> + '_ {
        self.nodes.iter().enumerate().filter_map(move |(index, node)| match node.source() {
            Some((source_type, policy)) if source_type == type_id && policy.admits(uninitialized) => Some(index),
            _ => None,
        })
    }
}

#[derive(Default)]
struct GraphBuilder {
    nodes: Vec<GraphNode>,
    by_stream: HashMap<*const StreamNode, usize>,
    by_source: HashMap<(TypeId, NullityPolicy), usize>,
}

impl GraphBuilder {
    fn visit(&mut self, stream: &Arc<StreamNode>) -> usize {
        let key = Arc::as_ptr(stream);
        if let Some(&index) = self.by_stream.get(&key) {
            return index;
        }
        let index = match &stream.op {
            StreamOp::Source { type_id, policy, .. } => {
                match self.by_source.get(&(*type_id, *policy)) {
                    Some(&index) => index,
                    None => {
                        let index = self.push(stream, SmallVec::new());
                        self.by_source.insert((*type_id, *policy), index);
                        index
                    }
                }
            }
            StreamOp::Operation(_) => {
                let inputs: SmallVec<[usize; 2]> =
                    stream.parents.iter().map(|parent| self.visit(parent)).collect();
                let index = self.push(stream, inputs.clone());
                for (position, &input) in inputs.iter().enumerate() {
                    let side = if position == 0 { Side::Left } else { Side::Right };
                    self.nodes[input].children.push(Target::Node { index, side });
                }
                index
            }
        };
        self.by_stream.insert(key, index);
        index
    }

    fn push(&mut self, stream: &Arc<StreamNode>, inputs: SmallVec<[usize; 2]>) -> usize {
        self.nodes.push(GraphNode {
            stream: Arc::clone(stream),
            inputs,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }
}

/// Rejects plans a graph cannot be compiled from: operations without a
/// source, and joiner chains with an indexable joiner after a filtering one.
pub(crate) fn validate_plan(constraint: &ConstraintRef, root: &Arc<StreamNode>) -> Result<(), DefinitionError> {
    let mut seen = HashSet::new();
    let mut stack = vec![Arc::clone(root)];
    while let Some(stream) = stack.pop() {
        if !seen.insert(Arc::as_ptr(&stream)) {
            continue;
        }
        if let StreamOp::Operation(spec) = &stream.op {
            if stream.parents.len() != spec.input_count() {
                return Err(DefinitionError::NoSource {
                    constraint: constraint.full_name(),
                });
            }
            if let Some(joiner) = spec.joiner_order_violation() {
                return Err(DefinitionError::JoinerOrder {
                    constraint: constraint.full_name(),
                    joiner,
                });
            }
        }
        stack.extend(stream.parents.iter().cloned());
    }
    Ok(())
}
