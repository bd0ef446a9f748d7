//! Leaf actions.
//!
//! This module defines the [`Action`] trait, the template every concrete
//! behavior implements, and the [`Leaf`] node that drives it through its
//! Enter/Execute/Exit lifecycle. The trait is generic over the input snapshot
//! `I` and the output buffer `O`.

use core::fmt;

use crate::node::{NodeId, NodeKind};
use crate::status::Status;
use crate::tree::Tree;

/// A concrete behavior at the bottom of the tree.
///
/// All hooks have defaults: an action that overrides nothing is always
/// applicable and finishes on its first execution.
pub trait Action<I, O>: Send {
    /// Leaf-specific applicability, checked after the node's condition.
    fn evaluate(&self, _input: &I) -> bool {
        true
    }

    /// Runs once when the leaf starts a new activation.
    fn enter(&mut self, _input: &I) {}

    /// Advances the behavior by one cycle.
    ///
    /// # Returns
    ///
    /// - `Status::Executing` to be executed again next cycle
    /// - `Status::Finished` when done; `exit` runs in the same cycle
    /// - `Status::ErrorTransition` to abort abnormally; the leaf stays
    ///   running until it is reset
    fn execute(&mut self, _input: &I, _output: &mut O) -> Status {
        Status::Finished
    }

    /// Runs when the leaf finishes and whenever it is reset.
    fn exit(&mut self, _input: &I) {}
}

/// Blanket implementation for boxed actions.
///
/// This allows `Box<dyn Action<I, O>>` to be handed anywhere an action is
/// expected, e.g. when actions are chosen at runtime.
impl<I, O> Action<I, O> for Box<dyn Action<I, O>> {
    #[inline]
    fn evaluate(&self, input: &I) -> bool {
        (**self).evaluate(input)
    }

    #[inline]
    fn enter(&mut self, input: &I) {
        (**self).enter(input);
    }

    #[inline]
    fn execute(&mut self, input: &I, output: &mut O) -> Status {
        (**self).execute(input, output)
    }

    #[inline]
    fn exit(&mut self, input: &I) {
        (**self).exit(input);
    }
}

/// An action whose only behavior is an execute closure.
pub struct FnAction<F> {
    execute: F,
}

impl<F> FnAction<F> {
    pub fn new(execute: F) -> Self {
        Self { execute }
    }
}

impl<I, O, F> Action<I, O> for FnAction<F>
where
    F: FnMut(&I, &mut O) -> Status + Send,
{
    fn execute(&mut self, input: &I, output: &mut O) -> Status {
        (self.execute)(input, output)
    }
}

/// Lifecycle phase of a leaf. Private to the leaf; never surfaced as a
/// [`Status`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Ready,
    Running,
    Finished,
}

/// Leaf node state: the action and where it is in its lifecycle.
pub struct Leaf<I, O> {
    pub(crate) phase: Phase,
    pub(crate) action: Box<dyn Action<I, O>>,
}

impl<I, O> Leaf<I, O> {
    pub fn new(action: Box<dyn Action<I, O>>) -> Self {
        Self {
            phase: Phase::Ready,
            action,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl<I, O> fmt::Debug for Leaf<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Leaf")
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl<I, O> Tree<I, O> {
    fn leaf_mut(&mut self, id: NodeId) -> Option<&mut Leaf<I, O>> {
        match self.kind_mut(id)? {
            NodeKind::Action(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub(crate) fn evaluate_action(&mut self, id: NodeId, input: &I) -> bool {
        match self.kind(id) {
            Some(NodeKind::Action(leaf)) => leaf.action.evaluate(input),
            _ => false,
        }
    }

    /// Ready -> Running -> Finished -> Ready, as far as one cycle allows.
    pub(crate) fn tick_action(&mut self, id: NodeId, input: &I, output: &mut O) -> Status {
        let Some(leaf) = self.leaf_mut(id) else {
            return Status::Finished;
        };

        let mut status = Status::Finished;
        if leaf.phase == Phase::Ready {
            leaf.action.enter(input);
            leaf.phase = Phase::Running;
        }

        let executed = leaf.phase == Phase::Running;
        if executed {
            status = leaf.action.execute(input, output);
            if status.is_finished() {
                leaf.phase = Phase::Finished;
            }
        }

        let finished = leaf.phase == Phase::Finished;
        if finished {
            leaf.action.exit(input);
            leaf.phase = Phase::Ready;
        }

        if executed {
            self.set_active_node(id, Some(id));
        }
        if finished {
            self.set_active_node(id, None);
        }
        status
    }

    pub(crate) fn reset_action(&mut self, id: NodeId, input: &I) {
        let Some(leaf) = self.leaf_mut(id) else {
            return;
        };
        leaf.action.exit(input);
        leaf.phase = Phase::Ready;
        self.release_active_node(id);
    }
}
