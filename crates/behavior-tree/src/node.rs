//! Node identity, kinds, and per-node storage.
//!
//! Nodes live in the [`Tree`](crate::Tree) arena and are addressed by
//! [`NodeId`]. Each node carries a [`NodeKind`] that owns the variant's
//! private cursor state; the tree dispatches the protocol by matching on it.

use core::fmt;

use crate::action::{Action, Leaf};
use crate::composite::{FinishPolicy, Parallel, Selector, SelectorPolicy, Sequence};
use crate::condition::Condition;
use crate::decorator::Loop;

/// Handle to a node inside one [`Tree`](crate::Tree).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Position of this node in the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Fieldless tag naming a node's kind, used for logging and errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum NodeLabel {
    Selector,
    Sequence,
    Parallel,
    Loop,
    Action,
}

/// The shape of a node together with its cursor state.
pub enum NodeKind<I, O> {
    /// Picks the first applicable child each cycle.
    Selector(Selector),
    /// Runs children one after another.
    Sequence(Sequence),
    /// Runs all children side by side.
    Parallel(Parallel),
    /// Repeats its single child a fixed number of times.
    Loop(Loop),
    /// A leaf driving a caller-supplied [`Action`].
    Action(Leaf<I, O>),
}

impl<I, O> NodeKind<I, O> {
    /// A selector that preempts lower-priority children.
    pub fn priority_selector() -> Self {
        NodeKind::Selector(Selector::new(SelectorPolicy::Priority))
    }

    /// A selector using the non-priority policy.
    pub fn non_priority_selector() -> Self {
        NodeKind::Selector(Selector::new(SelectorPolicy::NonPriority))
    }

    pub fn sequence() -> Self {
        NodeKind::Sequence(Sequence::default())
    }

    pub fn parallel(policy: FinishPolicy) -> Self {
        NodeKind::Parallel(Parallel::new(policy))
    }

    /// A loop running its child `count` times. Zero never qualifies.
    pub fn repeat(count: u32) -> Self {
        NodeKind::Loop(Loop::new(count))
    }

    pub fn action<A>(action: A) -> Self
    where
        A: Action<I, O> + 'static,
    {
        NodeKind::Action(Leaf::new(Box::new(action)))
    }

    /// Returns the tag for this kind.
    pub fn label(&self) -> NodeLabel {
        match self {
            NodeKind::Selector(_) => NodeLabel::Selector,
            NodeKind::Sequence(_) => NodeLabel::Sequence,
            NodeKind::Parallel(_) => NodeLabel::Parallel,
            NodeKind::Loop(_) => NodeLabel::Loop,
            NodeKind::Action(_) => NodeLabel::Action,
        }
    }
}

impl<I, O> fmt::Debug for NodeKind<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Selector(state) => fmt::Debug::fmt(state, f),
            NodeKind::Sequence(state) => fmt::Debug::fmt(state, f),
            NodeKind::Parallel(state) => fmt::Debug::fmt(state, f),
            NodeKind::Loop(state) => fmt::Debug::fmt(state, f),
            NodeKind::Action(leaf) => fmt::Debug::fmt(leaf, f),
        }
    }
}

/// Arena slot for one node.
pub(crate) struct Node<I, O> {
    /// Fixed at insertion; used only for active-node bubbling.
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) condition: Condition<I>,
    pub(crate) name: Option<String>,
    pub(crate) active: Option<NodeId>,
    pub(crate) last_active: Option<NodeId>,
    pub(crate) kind: NodeKind<I, O>,
}

impl<I, O> Node<I, O> {
    pub(crate) fn new(parent: Option<NodeId>, kind: NodeKind<I, O>) -> Self {
        Self {
            parent,
            children: Vec::new(),
            condition: Condition::True,
            name: None,
            active: None,
            last_active: None,
            kind,
        }
    }
}

impl<I, O> fmt::Debug for Node<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("kind", &self.kind)
            .field("condition", &self.condition)
            .field("active", &self.active)
            .finish()
    }
}
