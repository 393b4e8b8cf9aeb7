//! Untyped stream plan shared by all typed streams.
//!
//! Every typed stream is a thin wrapper around an `Arc<StreamNode>`. The
//! plan is a DAG: an operation points at its parent streams, and streams
//! reused by several constraints are shared by pointer. The session factory
//! later compiles the plans of all live constraints into one node graph.

use std::any::{type_name, TypeId};
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use scoreflow_config::NullityPolicy;
use scoreflow_core::Fact;

use crate::node::NodeSpec;

pub(crate) enum StreamOp {
    /// Every inserted fact of one type that passes the nullity policy.
    Source {
        type_id: TypeId,
        type_name: &'static str,
        policy: NullityPolicy,
    },
    Operation(Box<dyn NodeSpec>),
}

pub(crate) struct StreamNode {
    pub(crate) op: StreamOp,
    pub(crate) parents: SmallVec<[Arc<StreamNode>; 2]>,
    /// True when the stream never emits two equal tuples.
    pub(crate) distinct: bool,
}

impl StreamNode {
    pub(crate) fn source<A: Fact>(policy: NullityPolicy) -> Arc<Self> {
        Arc::new(Self {
            op: StreamOp::Source {
                type_id: TypeId::of::<A>(),
                type_name: type_name::<A>(),
                policy,
            },
            parents: SmallVec::new(),
            distinct: true,
        })
    }

    pub(crate) fn unary(parent: &Arc<Self>, spec: impl NodeSpec + 'static, distinct: bool) -> Arc<Self> {
        let mut parents = SmallVec::new();
        parents.push(Arc::clone(parent));
        Arc::new(Self {
            op: StreamOp::Operation(Box::new(spec)),
            parents,
            distinct,
        })
    }

    pub(crate) fn binary(
        left: &Arc<Self>,
        right: &Arc<Self>,
        spec: impl NodeSpec + 'static,
        distinct: bool,
    ) -> Arc<Self> {
        let mut parents = SmallVec::new();
        parents.push(Arc::clone(left));
        parents.push(Arc::clone(right));
        Arc::new(Self {
            op: StreamOp::Operation(Box::new(spec)),
            parents,
            distinct,
        })
    }

    pub(crate) fn name(&self) -> &'static str {
        match &self.op {
            StreamOp::Source { .. } => "source",
            StreamOp::Operation(spec) => spec.name(),
        }
    }
}

impl fmt::Debug for StreamNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.op {
            StreamOp::Source {
                type_name, policy, ..
            } => f
                .debug_struct("Source")
                .field("type", type_name)
                .field("policy", policy)
                .finish(),
            StreamOp::Operation(spec) => f
                .debug_struct("Operation")
                .field("name", &spec.name())
                .field("parents", &self.parents.len())
                .field("distinct", &self.distinct)
                .finish(),
        }
    }
}

/// Settings a stream needs while it is being declared.
#[derive(Debug, Clone)]
pub(crate) struct FactoryContext {
    /// Policy of `for_each` and plain `if_exists`/`if_not_exists`.
    pub(crate) nullity: NullityPolicy,
    pub(crate) default_package: String,
}

impl FactoryContext {
    pub(crate) fn source<A: Fact>(&self) -> Arc<StreamNode> {
        StreamNode::source::<A>(self.nullity)
    }
}
