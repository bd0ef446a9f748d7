//! Builder utilities for ergonomic tree construction.
//!
//! Building a tree through [`Tree::insert`] and [`Tree::add_child`] means
//! threading parent ids by hand. This module describes a subtree as a nested
//! [`Blueprint`] instead, built from short helpers like `sequence(vec![...])`,
//! and inserts it in one call.
//!
//! ```rust
//! use behavior_tree::builder::{action_fn, priority_selector, sequence};
//! use behavior_tree::{Condition, Status};
//!
//! let (mut tree, root) = priority_selector(vec![
//!     action_fn(|_: &i32, out: &mut Vec<&'static str>| {
//!         out.push("flee");
//!         Status::Finished
//!     })
//!     .when(Condition::delegate(|hp: &i32| *hp < 30)),
//!     sequence(vec![
//!         action_fn(|_: &i32, out: &mut Vec<&'static str>| {
//!             out.push("patrol");
//!             Status::Finished
//!         }),
//!     ]),
//! ])
//! .into_tree()
//! .unwrap();
//!
//! let mut out = Vec::new();
//! assert!(tree.evaluate(root, &10));
//! tree.tick(root, &10, &mut out);
//! assert_eq!(out, ["flee"]);
//! ```

use crate::action::{Action, FnAction};
use crate::composite::FinishPolicy;
use crate::condition::Condition;
use crate::error::Result;
use crate::node::{NodeId, NodeKind};
use crate::status::Status;
use crate::tree::Tree;

/// Declarative description of a subtree.
pub struct Blueprint<I, O> {
    kind: NodeKind<I, O>,
    condition: Option<Condition<I>>,
    name: Option<String>,
    children: Vec<Blueprint<I, O>>,
}

impl<I, O> Blueprint<I, O> {
    pub fn new(kind: NodeKind<I, O>) -> Self {
        Self {
            kind,
            condition: None,
            name: None,
            children: Vec::new(),
        }
    }

    /// Names the node.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Gates the node with `condition`.
    #[must_use]
    pub fn when(mut self, condition: Condition<I>) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Appends a child blueprint.
    #[must_use]
    pub fn child(mut self, child: Blueprint<I, O>) -> Self {
        self.children.push(child);
        self
    }

    /// Inserts this subtree under `parent` (or as a root) and returns its id.
    ///
    /// The returned node is not attached to `parent`'s child list; use
    /// [`Tree::add_child`] or build the parent from a blueprint too.
    pub fn build(self, tree: &mut Tree<I, O>, parent: Option<NodeId>) -> Result<NodeId> {
        let id = tree.insert(parent, self.kind)?;
        if let Some(condition) = self.condition {
            tree.set_condition(id, condition)?;
        }
        if let Some(name) = self.name {
            tree.set_name(id, name)?;
        }
        for child in self.children {
            let child = child.build(tree, Some(id))?;
            tree.add_child(id, child)?;
        }
        Ok(id)
    }

    /// Builds a fresh tree rooted at this blueprint.
    pub fn into_tree(self) -> Result<(Tree<I, O>, NodeId)> {
        let mut tree = Tree::new();
        let root = self.build(&mut tree, None)?;
        Ok((tree, root))
    }
}

fn with_children<I, O>(kind: NodeKind<I, O>, children: Vec<Blueprint<I, O>>) -> Blueprint<I, O> {
    Blueprint {
        children,
        ..Blueprint::new(kind)
    }
}

/// Creates a priority selector blueprint.
#[inline]
pub fn priority_selector<I, O>(children: Vec<Blueprint<I, O>>) -> Blueprint<I, O> {
    with_children(NodeKind::priority_selector(), children)
}

/// Creates a non-priority selector blueprint.
#[inline]
pub fn non_priority_selector<I, O>(children: Vec<Blueprint<I, O>>) -> Blueprint<I, O> {
    with_children(NodeKind::non_priority_selector(), children)
}

/// Creates a sequence blueprint.
#[inline]
pub fn sequence<I, O>(children: Vec<Blueprint<I, O>>) -> Blueprint<I, O> {
    with_children(NodeKind::sequence(), children)
}

/// Creates a parallel blueprint with the given finish policy.
#[inline]
pub fn parallel<I, O>(policy: FinishPolicy, children: Vec<Blueprint<I, O>>) -> Blueprint<I, O> {
    with_children(NodeKind::parallel(policy), children)
}

/// Creates a loop blueprint repeating `child` `count` times.
#[inline]
pub fn repeat<I, O>(count: u32, child: Blueprint<I, O>) -> Blueprint<I, O> {
    with_children(NodeKind::repeat(count), vec![child])
}

/// Creates a leaf blueprint for `action`.
#[inline]
pub fn action<I, O, A>(action: A) -> Blueprint<I, O>
where
    A: Action<I, O> + 'static,
{
    Blueprint::new(NodeKind::action(action))
}

/// Creates a leaf blueprint from an execute closure.
#[inline]
pub fn action_fn<I, O, F>(execute: F) -> Blueprint<I, O>
where
    F: FnMut(&I, &mut O) -> Status + Send + 'static,
{
    action(FnAction::new(execute))
}
