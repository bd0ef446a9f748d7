//! Decorator nodes.
//!
//! Decorators wrap a single child and change how often or whether it runs.
//! This module provides [`Loop`], which repeats its child a fixed number of
//! times.

use tracing::debug;

use crate::node::{NodeId, NodeKind, NodeLabel};
use crate::status::Status;
use crate::tree::Tree;

/// Repeats its single child `count` times.
///
/// # Semantics
///
/// - Applicable while iterations remain and the child is applicable
/// - Each time the child finishes, the iteration counter advances and a
///   composite child is reset so the next iteration starts from its first
///   step
/// - After the last iteration the counter wraps to zero and the loop
///   finishes, so the next activation starts over
///
/// A loop with `count == 0` or without a child never qualifies. Attaching a
/// second child is rejected at construction time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Loop {
    pub(crate) count: u32,
    pub(crate) current: u32,
}

impl Loop {
    pub fn new(count: u32) -> Self {
        Self { count, current: 0 }
    }

    /// Configured number of iterations.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Iterations completed in the current activation.
    pub fn current(&self) -> u32 {
        self.current
    }

    fn has_remaining(&self) -> bool {
        self.count > 0 && self.current < self.count
    }
}

impl<I, O> Tree<I, O> {
    fn loop_state(&self, id: NodeId) -> Option<Loop> {
        match self.kind(id)? {
            NodeKind::Loop(state) => Some(*state),
            _ => None,
        }
    }

    fn store_loop_iteration(&mut self, id: NodeId, current: u32) {
        if let Some(NodeKind::Loop(state)) = self.kind_mut(id) {
            state.current = current;
        }
    }

    pub(crate) fn evaluate_loop(&mut self, id: NodeId, input: &I) -> bool {
        let Some(state) = self.loop_state(id) else {
            return false;
        };
        if !state.has_remaining() {
            return false;
        }
        match self.child_at(id, 0) {
            Some(child) => self.evaluate(child, input),
            None => false,
        }
    }

    pub(crate) fn tick_loop(&mut self, id: NodeId, input: &I, output: &mut O) -> Status {
        let Some(state) = self.loop_state(id) else {
            return Status::Finished;
        };
        let Some(child) = self.child_at(id, 0) else {
            return Status::Finished;
        };

        let status = self.tick(child, input, output);
        if !status.is_finished() {
            return status;
        }

        let current = state.current + 1;
        if current < state.count {
            self.store_loop_iteration(id, current);
            // Leaves are back in Ready after finishing; composites keep their
            // cursors until reset.
            let composite = self
                .kind(child)
                .is_some_and(|kind| kind.label() != NodeLabel::Action);
            if composite {
                self.reset(child, input);
            }
            Status::Executing
        } else {
            debug!(node = %self.describe(id), iterations = state.count, "loop finished");
            self.store_loop_iteration(id, 0);
            Status::Finished
        }
    }

    pub(crate) fn reset_loop(&mut self, id: NodeId, input: &I) {
        if self.loop_state(id).is_none() {
            return;
        }
        if let Some(child) = self.child_at(id, 0) {
            self.reset(child, input);
        }
        self.store_loop_iteration(id, 0);
    }
}
