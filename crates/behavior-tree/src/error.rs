//! Error types raised while building a tree.
//!
//! Ticking never fails; these only come out of the construction API.

use thiserror::Error;

use crate::node::{NodeId, NodeLabel};

/// Errors surfaced by tree construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node {0} does not exist in this tree")]
    UnknownNode(NodeId),

    #[error("node {0} cannot be its own child")]
    SelfChild(NodeId),

    #[error("node {child} was created under {expected:?}, not under {parent}")]
    ForeignChild {
        child: NodeId,
        parent: NodeId,
        expected: Option<NodeId>,
    },

    #[error("action node {0} cannot have children")]
    LeafParent(NodeId),

    #[error("loop node {0} already has its single child")]
    LoopArity(NodeId),

    #[error("node {node} is a {actual}, expected a {expected}")]
    KindMismatch {
        node: NodeId,
        expected: NodeLabel,
        actual: NodeLabel,
    },
}

pub type Result<T> = std::result::Result<T, TreeError>;
