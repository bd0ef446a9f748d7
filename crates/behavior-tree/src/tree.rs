//! The node arena and the Evaluate/Tick/Reset protocol.
//!
//! A [`Tree`] owns every node. Children are referenced by [`NodeId`] and the
//! parent link is a plain back-reference index, so ownership stays a strict
//! tree while any node can still walk its ancestor chain.
//!
//! # Protocol
//!
//! - [`Tree::evaluate`]: is the node applicable right now? The node's
//!   [`Condition`] is checked first, then the kind-specific logic.
//! - [`Tree::tick`]: advance by one cycle. The only operation that commits
//!   cursor state or writes output.
//! - [`Tree::reset`]: return to the initial state, running leaf exit hooks.
//!
//! Unknown ids and out-of-range child positions are inert: evaluation says
//! no, ticking finishes without work, resetting does nothing.

use core::fmt;

use tracing::{debug, trace, warn};

use crate::composite::FinishPolicy;
use crate::condition::Condition;
use crate::error::{Result, TreeError};
use crate::node::{Node, NodeId, NodeKind, NodeLabel};
use crate::status::Status;

/// A behavior tree over input snapshots `I` and output buffers `O`.
pub struct Tree<I, O> {
    nodes: Vec<Node<I, O>>,
}

impl<I, O> Default for Tree<I, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, O> fmt::Debug for Tree<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree").field("nodes", &self.nodes).finish()
    }
}

impl<I, O> Tree<I, O> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Creates an empty tree with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Number of nodes in the arena, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Inserts a node whose parent back-reference is `parent`.
    ///
    /// The parent link is fixed for the node's lifetime. The node is not
    /// attached as a child yet; call [`Tree::add_child`] for that.
    pub fn insert(&mut self, parent: Option<NodeId>, kind: NodeKind<I, O>) -> Result<NodeId> {
        if let Some(parent) = parent {
            let node = self.node(parent).ok_or(TreeError::UnknownNode(parent))?;
            if node.kind.label() == NodeLabel::Action {
                return Err(TreeError::LeafParent(parent));
            }
        }

        let id = NodeId::new(self.nodes.len());
        trace!(node = %id, kind = %kind.label(), parent = ?parent, "insert node");
        self.nodes.push(Node::new(parent, kind));
        Ok(id)
    }

    /// Inserts a node under `parent` and attaches it in one step.
    pub fn attach(&mut self, parent: NodeId, kind: NodeKind<I, O>) -> Result<NodeId> {
        let child = self.insert(Some(parent), kind)?;
        self.add_child(parent, child)?;
        Ok(child)
    }

    /// Appends `child` to `parent`'s ordered child list.
    ///
    /// Returns `Ok(false)` if `child` is already attached there.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool> {
        if parent == child {
            return Err(TreeError::SelfChild(parent));
        }
        let expected = self.node(child).ok_or(TreeError::UnknownNode(child))?.parent;
        let node = self.node(parent).ok_or(TreeError::UnknownNode(parent))?;
        if expected != Some(parent) {
            return Err(TreeError::ForeignChild {
                child,
                parent,
                expected,
            });
        }
        if node.children.contains(&child) {
            debug!(%parent, %child, "child already attached, ignoring");
            return Ok(false);
        }
        match node.kind.label() {
            NodeLabel::Action => return Err(TreeError::LeafParent(parent)),
            NodeLabel::Loop if !node.children.is_empty() => {
                return Err(TreeError::LoopArity(parent));
            }
            _ => {}
        }

        self.nodes[parent.index()].children.push(child);
        Ok(true)
    }

    /// Detaches `child` from `parent`. The node itself stays in the arena.
    ///
    /// Returns `Ok(false)` if `child` was not attached to `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool> {
        let node = self.node_mut(parent).ok_or(TreeError::UnknownNode(parent))?;
        match node.children.iter().position(|c| *c == child) {
            Some(position) => {
                node.children.remove(position);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Replaces the node's condition.
    pub fn set_condition(&mut self, id: NodeId, condition: Condition<I>) -> Result<()> {
        self.node_mut(id).ok_or(TreeError::UnknownNode(id))?.condition = condition;
        Ok(())
    }

    /// Restores the always-true condition.
    pub fn clear_condition(&mut self, id: NodeId) -> Result<()> {
        self.set_condition(id, Condition::True)
    }

    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> Result<()> {
        self.node_mut(id).ok_or(TreeError::UnknownNode(id))?.name = Some(name.into());
        Ok(())
    }

    /// Changes the finish policy of a parallel node.
    pub fn set_finish_policy(&mut self, id: NodeId, policy: FinishPolicy) -> Result<()> {
        let node = self.node_mut(id).ok_or(TreeError::UnknownNode(id))?;
        match &mut node.kind {
            NodeKind::Parallel(parallel) => {
                parallel.policy = policy;
                Ok(())
            }
            other => Err(TreeError::KindMismatch {
                node: id,
                expected: NodeLabel::Parallel,
                actual: other.label(),
            }),
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id)?.name.as_deref()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Ordered children of `id`; empty for unknown nodes.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.node(id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    /// Child at `position`, or `None` when out of range.
    pub fn child_at(&self, id: NodeId, position: usize) -> Option<NodeId> {
        self.children(id).get(position).copied()
    }

    pub fn condition(&self, id: NodeId) -> Option<&Condition<I>> {
        self.node(id).map(|n| &n.condition)
    }

    /// The node's kind and cursor state.
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind<I, O>> {
        self.node(id).map(|n| &n.kind)
    }

    /// The leaf most recently reported as executing beneath `id`.
    pub fn active_node(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.active
    }

    /// The active pointer `id` held before the latest report.
    pub fn last_active_node(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.last_active
    }

    /// Human-readable name for logs: the node name, or its kind and id.
    pub fn describe(&self, id: NodeId) -> String {
        match self.node(id) {
            Some(Node {
                name: Some(name), ..
            }) => name.clone(),
            Some(node) => format!("{}{}", node.kind.label(), id),
            None => format!("unknown{id}"),
        }
    }

    // ------------------------------------------------------------------
    // Protocol
    // ------------------------------------------------------------------

    /// Returns `true` if `id` may be ticked this cycle.
    ///
    /// Composites record their candidate here but never commit to it.
    pub fn evaluate(&mut self, id: NodeId, input: &I) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        if !node.condition.check(input) {
            trace!(node = %id, "condition rejected");
            return false;
        }

        match node.kind.label() {
            NodeLabel::Selector => self.evaluate_selector(id, input),
            NodeLabel::Sequence => self.evaluate_sequence(id, input),
            NodeLabel::Parallel => self.evaluate_parallel(id, input),
            NodeLabel::Loop => self.evaluate_loop(id, input),
            NodeLabel::Action => self.evaluate_action(id, input),
        }
    }

    /// Advances `id` by one cycle.
    pub fn tick(&mut self, id: NodeId, input: &I, output: &mut O) -> Status {
        let Some(label) = self.node(id).map(|n| n.kind.label()) else {
            return Status::Finished;
        };

        let status = match label {
            NodeLabel::Selector => self.tick_selector(id, input, output),
            NodeLabel::Sequence => self.tick_sequence(id, input, output),
            NodeLabel::Parallel => self.tick_parallel(id, input, output),
            NodeLabel::Loop => self.tick_loop(id, input, output),
            NodeLabel::Action => self.tick_action(id, input, output),
        };
        trace!(node = %id, kind = %label, %status, "tick");
        status
    }

    /// Returns `id` and the children it considers active to their initial
    /// state. Safe to call in any state and more than once.
    pub fn reset(&mut self, id: NodeId, input: &I) {
        let Some(label) = self.node(id).map(|n| n.kind.label()) else {
            warn!(node = %id, "reset of unknown node ignored");
            return;
        };

        trace!(node = %id, kind = %label, "reset");
        match label {
            NodeLabel::Selector => self.reset_selector(id, input),
            NodeLabel::Sequence => self.reset_sequence(id, input),
            NodeLabel::Parallel => self.reset_parallel(id, input),
            NodeLabel::Loop => self.reset_loop(id, input),
            NodeLabel::Action => self.reset_action(id, input),
        }
    }

    // ------------------------------------------------------------------
    // Active-node bubbling
    // ------------------------------------------------------------------

    /// Records `active` on `from` and every ancestor, shifting the previous
    /// pointer into `last_active`. `None` clears the chain.
    pub(crate) fn set_active_node(&mut self, from: NodeId, active: Option<NodeId>) {
        let mut cursor = Some(from);
        while let Some(id) = cursor {
            let Some(node) = self.node_mut(id) else {
                break;
            };
            node.last_active = node.active;
            node.active = active;
            cursor = node.parent;
        }
    }

    /// Clears the active pointer on every ancestor that still points at
    /// `leaf`, leaving pointers to other leaves alone.
    pub(crate) fn release_active_node(&mut self, leaf: NodeId) {
        let mut cursor = Some(leaf);
        while let Some(id) = cursor {
            let Some(node) = self.node_mut(id) else {
                break;
            };
            if node.active == Some(leaf) {
                node.last_active = node.active;
                node.active = None;
            }
            cursor = node.parent;
        }
    }

    // ------------------------------------------------------------------
    // Arena access
    // ------------------------------------------------------------------

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> Option<&Node<I, O>> {
        self.nodes.get(id.index())
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<I, O>> {
        self.nodes.get_mut(id.index())
    }

    #[inline]
    pub(crate) fn kind_mut(&mut self, id: NodeId) -> Option<&mut NodeKind<I, O>> {
        self.node_mut(id).map(|n| &mut n.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::FnAction;

    type TestTree = Tree<(), Vec<&'static str>>;

    fn finish_now() -> NodeKind<(), Vec<&'static str>> {
        NodeKind::action(FnAction::new(|_: &(), _: &mut Vec<&'static str>| {
            Status::Finished
        }))
    }

    #[test]
    fn duplicate_child_is_ignored() {
        let mut tree = TestTree::new();
        let root = tree.insert(None, NodeKind::sequence()).unwrap();
        let leaf = tree.attach(root, finish_now()).unwrap();

        assert_eq!(tree.add_child(root, leaf), Ok(false));
        assert_eq!(tree.children(root), &[leaf]);
    }

    #[test]
    fn child_must_be_created_under_parent() {
        let mut tree = TestTree::new();
        let root = tree.insert(None, NodeKind::sequence()).unwrap();
        let other = tree.attach(root, NodeKind::sequence()).unwrap();
        let leaf = tree.insert(Some(other), finish_now()).unwrap();

        assert_eq!(
            tree.add_child(root, leaf),
            Err(TreeError::ForeignChild {
                child: leaf,
                parent: root,
                expected: Some(other),
            })
        );
        assert_eq!(tree.add_child(root, root), Err(TreeError::SelfChild(root)));
    }

    #[test]
    fn loop_accepts_one_child() {
        let mut tree = TestTree::new();
        let root = tree.insert(None, NodeKind::repeat(2)).unwrap();
        tree.attach(root, finish_now()).unwrap();

        assert_eq!(
            tree.attach(root, finish_now()),
            Err(TreeError::LoopArity(root))
        );
    }

    #[test]
    fn leaves_cannot_parent() {
        let mut tree = TestTree::new();
        let leaf = tree.insert(None, finish_now()).unwrap();
        assert_eq!(
            tree.insert(Some(leaf), finish_now()),
            Err(TreeError::LeafParent(leaf))
        );
    }

    #[test]
    fn unknown_nodes_are_inert() {
        let mut tree = TestTree::new();
        let ghost = NodeId::new(7);
        let mut out = Vec::new();

        assert!(!tree.evaluate(ghost, &()));
        assert_eq!(tree.tick(ghost, &(), &mut out), Status::Finished);
        tree.reset(ghost, &());
        assert!(out.is_empty());
        assert_eq!(tree.child_at(ghost, 0), None);
    }

    #[test]
    fn condition_gates_evaluation() {
        let mut tree = TestTree::new();
        let leaf = tree.insert(None, finish_now()).unwrap();
        assert!(tree.evaluate(leaf, &()));

        tree.set_condition(leaf, Condition::False).unwrap();
        assert!(!tree.evaluate(leaf, &()));

        tree.clear_condition(leaf).unwrap();
        assert!(tree.evaluate(leaf, &()));
    }

    #[test]
    fn remove_child_detaches() {
        let mut tree = TestTree::new();
        let root = tree.insert(None, NodeKind::priority_selector()).unwrap();
        let a = tree.attach(root, finish_now()).unwrap();
        let b = tree.attach(root, finish_now()).unwrap();

        assert_eq!(tree.remove_child(root, a), Ok(true));
        assert_eq!(tree.remove_child(root, a), Ok(false));
        assert_eq!(tree.children(root), &[b]);
        // The back-reference is fixed, so the node can be re-attached.
        assert_eq!(tree.add_child(root, a), Ok(true));
        assert_eq!(tree.children(root), &[b, a]);
    }

    #[test]
    fn finish_policy_only_on_parallel() {
        let mut tree = TestTree::new();
        let seq = tree.insert(None, NodeKind::sequence()).unwrap();
        assert_eq!(
            tree.set_finish_policy(seq, FinishPolicy::And),
            Err(TreeError::KindMismatch {
                node: seq,
                expected: NodeLabel::Parallel,
                actual: NodeLabel::Sequence,
            })
        );
    }

    #[test]
    fn describe_prefers_name() {
        let mut tree = TestTree::new();
        let root = tree.insert(None, NodeKind::sequence()).unwrap();
        assert_eq!(tree.describe(root), "sequence#0");
        tree.set_name(root, "patrol").unwrap();
        assert_eq!(tree.describe(root), "patrol");
        assert_eq!(tree.name(root), Some("patrol"));
    }
}
