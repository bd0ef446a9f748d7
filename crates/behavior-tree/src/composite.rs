//! Composite nodes.
//!
//! Composite nodes control the execution flow of multiple children. This
//! module provides the selectors ([`Selector`]), the step-by-step
//! [`Sequence`], and the side-by-side [`Parallel`]. Each type is the node's
//! private cursor state; the algorithms live on [`Tree`] because they recurse
//! into children stored in the same arena.

use core::mem;

use tracing::debug;

use crate::node::{NodeId, NodeKind};
use crate::status::Status;
use crate::tree::Tree;

/// How a [`Selector`] picks its candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum SelectorPolicy {
    /// First applicable child in order wins and preempts whatever runs.
    #[default]
    Priority,
    /// Reserved for selectors that do not strictly follow child order.
    ///
    /// Currently picks candidates exactly like [`SelectorPolicy::Priority`].
    NonPriority,
}

/// Selects one applicable child per cycle.
///
/// # Semantics
///
/// - Evaluation scans children in order and remembers the first applicable
///   one as the candidate
/// - Ticking switches to the candidate, resetting the previously running
///   child if the candidate changed, then ticks it
/// - When the running child finishes, so does the selector
///
/// This models reactive priorities: a higher-priority child that becomes
/// applicable abandons the lower-priority child's in-flight work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selector {
    pub(crate) policy: SelectorPolicy,
    pub(crate) candidate: Option<usize>,
    pub(crate) committed: Option<usize>,
}

impl Selector {
    pub fn new(policy: SelectorPolicy) -> Self {
        Self {
            policy,
            candidate: None,
            committed: None,
        }
    }

    pub fn policy(&self) -> SelectorPolicy {
        self.policy
    }

    /// Child position chosen by the latest evaluation.
    pub fn candidate(&self) -> Option<usize> {
        self.candidate
    }

    /// Child position currently being ticked.
    pub fn committed(&self) -> Option<usize> {
        self.committed
    }
}

/// Runs children one after another.
///
/// # Semantics
///
/// - Applicable iff the current step is applicable
/// - When the current step finishes, the cursor moves on; the sequence
///   finishes with its last step
/// - The cursor is not rewound on completion: a finished sequence stays
///   inapplicable until it is reset
///
/// An empty sequence is never applicable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sequence {
    pub(crate) cursor: Option<usize>,
}

impl Sequence {
    /// Position of the current step, if evaluation has started.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }
}

/// When a [`Parallel`] node counts as finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum FinishPolicy {
    /// As soon as any child finishes.
    #[default]
    Or,
    /// Once every child has finished.
    And,
}

/// Runs all children in the same cycle.
///
/// # Semantics
///
/// - Applicable only if every child is applicable
/// - Each cycle ticks the children that have not finished yet, in order
/// - [`FinishPolicy::Or`] stops at the first finished child;
///   [`FinishPolicy::And`] waits for all of them
/// - A finished child is not ticked again until the parallel is reset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parallel {
    pub(crate) policy: FinishPolicy,
    pub(crate) results: Vec<Option<Status>>,
}

impl Parallel {
    pub fn new(policy: FinishPolicy) -> Self {
        Self {
            policy,
            results: Vec::new(),
        }
    }

    pub fn policy(&self) -> FinishPolicy {
        self.policy
    }

    /// Last result reported by the child at `position` this activation.
    pub fn result(&self, position: usize) -> Option<Status> {
        self.results.get(position).copied().flatten()
    }
}

impl<I, O> Tree<I, O> {
    fn selector(&self, id: NodeId) -> Option<Selector> {
        match self.kind(id)? {
            NodeKind::Selector(state) => Some(*state),
            _ => None,
        }
    }

    fn store_selector(&mut self, id: NodeId, state: Selector) {
        if let Some(NodeKind::Selector(slot)) = self.kind_mut(id) {
            *slot = state;
        }
    }

    fn first_applicable(&mut self, id: NodeId, input: &I) -> Option<usize> {
        let count = self.child_count(id);
        (0..count).find(|&position| match self.child_at(id, position) {
            Some(child) => self.evaluate(child, input),
            None => false,
        })
    }

    pub(crate) fn evaluate_selector(&mut self, id: NodeId, input: &I) -> bool {
        let Some(mut state) = self.selector(id) else {
            return false;
        };

        state.candidate = match state.policy {
            SelectorPolicy::Priority | SelectorPolicy::NonPriority => {
                self.first_applicable(id, input)
            }
        };
        self.store_selector(id, state);
        state.candidate.is_some()
    }

    pub(crate) fn tick_selector(&mut self, id: NodeId, input: &I, output: &mut O) -> Status {
        let Some(mut state) = self.selector(id) else {
            return Status::Finished;
        };

        if let Some(candidate) = state
            .candidate
            .filter(|&position| position < self.child_count(id))
        {
            if state.committed != Some(candidate) {
                if let Some(previous) = state.committed.and_then(|p| self.child_at(id, p)) {
                    debug!(
                        selector = %self.describe(id),
                        from = %self.describe(previous),
                        to = %self.describe(self.children(id)[candidate]),
                        "preempting running child"
                    );
                    self.reset(previous, input);
                }
            }
            state.committed = Some(candidate);
        }

        let status = match state.committed.and_then(|p| self.child_at(id, p)) {
            Some(child) => self.tick(child, input, output),
            None => Status::Finished,
        };
        if status.is_finished() {
            state.committed = None;
        }
        self.store_selector(id, state);
        status
    }

    pub(crate) fn reset_selector(&mut self, id: NodeId, input: &I) {
        let Some(state) = self.selector(id) else {
            return;
        };

        // The candidate may have been picked by an evaluation that was never
        // followed by a tick, so both positions are reset.
        let pending = state.candidate.filter(|c| state.committed != Some(*c));
        for position in [state.committed, pending].into_iter().flatten() {
            if let Some(child) = self.child_at(id, position) {
                self.reset(child, input);
            }
        }
        self.store_selector(id, Selector::new(state.policy));
    }

    fn sequence_cursor(&self, id: NodeId) -> Option<Option<usize>> {
        match self.kind(id)? {
            NodeKind::Sequence(state) => Some(state.cursor),
            _ => None,
        }
    }

    fn store_sequence_cursor(&mut self, id: NodeId, cursor: Option<usize>) {
        if let Some(NodeKind::Sequence(state)) = self.kind_mut(id) {
            state.cursor = cursor;
        }
    }

    pub(crate) fn evaluate_sequence(&mut self, id: NodeId, input: &I) -> bool {
        let Some(cursor) = self.sequence_cursor(id) else {
            return false;
        };

        let position = cursor.unwrap_or(0);
        self.store_sequence_cursor(id, Some(position));
        match self.child_at(id, position) {
            Some(child) => self.evaluate(child, input),
            None => false,
        }
    }

    pub(crate) fn tick_sequence(&mut self, id: NodeId, input: &I, output: &mut O) -> Status {
        let Some(position) = self.sequence_cursor(id).flatten() else {
            return Status::Finished;
        };
        let Some(child) = self.child_at(id, position) else {
            return Status::Finished;
        };

        let status = self.tick(child, input, output);
        if !status.is_finished() {
            return status;
        }

        let next = position + 1;
        self.store_sequence_cursor(id, Some(next));
        if next < self.child_count(id) {
            debug!(sequence = %self.describe(id), step = next, "advancing");
            Status::Executing
        } else {
            debug!(sequence = %self.describe(id), "all steps finished");
            Status::Finished
        }
    }

    pub(crate) fn reset_sequence(&mut self, id: NodeId, input: &I) {
        let Some(cursor) = self.sequence_cursor(id) else {
            return;
        };

        if let Some(child) = cursor.and_then(|p| self.child_at(id, p)) {
            self.reset(child, input);
        }
        self.store_sequence_cursor(id, None);
    }

    fn parallel_mut(&mut self, id: NodeId) -> Option<&mut Parallel> {
        match self.kind_mut(id)? {
            NodeKind::Parallel(state) => Some(state),
            _ => None,
        }
    }

    pub(crate) fn evaluate_parallel(&mut self, id: NodeId, input: &I) -> bool {
        let count = self.child_count(id);
        if count == 0 {
            return false;
        }
        (0..count).all(|position| match self.child_at(id, position) {
            Some(child) => self.evaluate(child, input),
            None => false,
        })
    }

    pub(crate) fn tick_parallel(&mut self, id: NodeId, input: &I, output: &mut O) -> Status {
        let count = self.child_count(id);
        let Some(state) = self.parallel_mut(id) else {
            return Status::Finished;
        };
        if count == 0 {
            return Status::Finished;
        }

        let policy = state.policy;
        let mut results = mem::take(&mut state.results);
        results.resize(count, None);

        let mut finished = 0;
        let mut outcome = Status::Executing;
        for position in 0..count {
            let previous = results[position];
            let status = match previous {
                None | Some(Status::Executing) => {
                    let Some(child) = self.child_at(id, position) else {
                        continue;
                    };
                    let status = self.tick(child, input, output);
                    results[position] = Some(status);
                    status
                }
                Some(done) => done,
            };

            match status {
                Status::Executing => {}
                Status::Finished => {
                    finished += 1;
                    if policy == FinishPolicy::Or || finished == count {
                        outcome = Status::Finished;
                        break;
                    }
                }
                Status::ErrorTransition => {
                    outcome = Status::ErrorTransition;
                    break;
                }
            }
        }

        if outcome.is_terminal() {
            debug!(parallel = %self.describe(id), %policy, %outcome, finished, "parallel done");
        }
        if let Some(state) = self.parallel_mut(id) {
            state.results = results;
        }
        outcome
    }

    pub(crate) fn reset_parallel(&mut self, id: NodeId, input: &I) {
        let Some(state) = self.parallel_mut(id) else {
            return;
        };
        state.results.clear();

        for position in 0..self.child_count(id) {
            if let Some(child) = self.child_at(id, position) {
                self.reset(child, input);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;

    /// Input: which children are currently applicable.
    struct TestContext {
        ready: [bool; 3],
    }

    impl TestContext {
        fn all() -> Self {
            Self { ready: [true; 3] }
        }
    }

    type Log = Vec<String>;

    /// Finishes after `ticks` executions; logs every hook into the output
    /// buffer or, for hooks without one, into `exits`.
    struct Countdown {
        name: &'static str,
        slot: usize,
        ticks: u32,
        left: u32,
    }

    impl Countdown {
        fn new(name: &'static str, slot: usize, ticks: u32) -> Self {
            Self {
                name,
                slot,
                ticks,
                left: ticks,
            }
        }
    }

    impl Action<TestContext, Log> for Countdown {
        fn evaluate(&self, input: &TestContext) -> bool {
            input.ready[self.slot]
        }

        fn enter(&mut self, _input: &TestContext) {
            self.left = self.ticks;
        }

        fn execute(&mut self, _input: &TestContext, output: &mut Log) -> Status {
            output.push(format!("{}:tick", self.name));
            self.left = self.left.saturating_sub(1);
            if self.left == 0 {
                Status::Finished
            } else {
                Status::Executing
            }
        }
    }

    fn tree_with(
        kind: NodeKind<TestContext, Log>,
        children: Vec<Countdown>,
    ) -> (Tree<TestContext, Log>, NodeId, Vec<NodeId>) {
        let mut tree = Tree::new();
        let root = tree.insert(None, kind).unwrap();
        let ids = children
            .into_iter()
            .map(|c| tree.attach(root, NodeKind::action(c)).unwrap())
            .collect();
        (tree, root, ids)
    }

    #[test]
    fn selector_picks_first_applicable() {
        let (mut tree, root, _) = tree_with(
            NodeKind::priority_selector(),
            vec![Countdown::new("a", 0, 1), Countdown::new("b", 1, 1)],
        );
        let input = TestContext {
            ready: [false, true, true],
        };
        let mut log = Log::new();

        assert!(tree.evaluate(root, &input));
        assert_eq!(tree.tick(root, &input, &mut log), Status::Finished);
        assert_eq!(log, ["b:tick"]);
    }

    #[test]
    fn selector_without_candidate_is_inapplicable() {
        let (mut tree, root, _) = tree_with(
            NodeKind::priority_selector(),
            vec![Countdown::new("a", 0, 1)],
        );
        let input = TestContext {
            ready: [false; 3],
        };
        assert!(!tree.evaluate(root, &input));

        let mut log = Log::new();
        assert_eq!(tree.tick(root, &input, &mut log), Status::Finished);
        assert!(log.is_empty());
    }

    #[test]
    fn selector_keeps_running_child_until_finished() {
        let (mut tree, root, _) = tree_with(
            NodeKind::priority_selector(),
            vec![Countdown::new("a", 0, 3)],
        );
        let input = TestContext::all();
        let mut log = Log::new();

        for expected in [Status::Executing, Status::Executing, Status::Finished] {
            assert!(tree.evaluate(root, &input));
            assert_eq!(tree.tick(root, &input, &mut log), expected);
        }
        let Some(NodeKind::Selector(state)) = tree.kind(root) else {
            panic!("selector expected");
        };
        assert_eq!(state.committed(), None);
    }

    #[test]
    fn non_priority_selector_matches_priority_today() {
        let (mut tree, root, _) = tree_with(
            NodeKind::non_priority_selector(),
            vec![Countdown::new("a", 0, 1), Countdown::new("b", 1, 1)],
        );
        let input = TestContext::all();
        assert!(tree.evaluate(root, &input));
        let Some(NodeKind::Selector(state)) = tree.kind(root) else {
            panic!("selector expected");
        };
        assert_eq!(state.policy(), SelectorPolicy::NonPriority);
        assert_eq!(state.candidate(), Some(0));
    }

    fn selector_state(tree: &Tree<TestContext, Log>, id: NodeId) -> Selector {
        match tree.kind(id) {
            Some(NodeKind::Selector(state)) => *state,
            _ => panic!("selector expected"),
        }
    }

    #[test]
    fn selector_reset_rewinds_pending_candidate() {
        let mut tree: Tree<TestContext, Log> = Tree::new();
        let root = tree.insert(None, NodeKind::priority_selector()).unwrap();
        let body = tree.attach(root, NodeKind::sequence()).unwrap();
        tree.attach(body, NodeKind::action(Countdown::new("a", 0, 1))).unwrap();
        let input = TestContext::all();
        let mut log = Log::new();

        // Evaluation alone picks the candidate and starts the sequence cursor.
        assert!(tree.evaluate(root, &input));
        assert_eq!(selector_state(&tree, root).candidate(), Some(0));
        tree.reset(root, &input);
        assert_eq!(selector_state(&tree, root).candidate(), None);
        let Some(NodeKind::Sequence(sequence)) = tree.kind(body) else {
            panic!("sequence expected");
        };
        assert_eq!(sequence.cursor(), None);

        // A finished child is only reachable through the stale candidate.
        assert!(tree.evaluate(root, &input));
        assert_eq!(tree.tick(root, &input, &mut log), Status::Finished);
        let state = selector_state(&tree, root);
        assert_eq!(state.committed(), None);
        assert_eq!(state.candidate(), Some(0));

        tree.reset(root, &input);
        let state = selector_state(&tree, root);
        assert_eq!(state.candidate(), None);
        assert_eq!(state.committed(), None);
        assert!(tree.evaluate(root, &input));
        assert_eq!(tree.tick(root, &input, &mut log), Status::Finished);
        assert_eq!(log, ["a:tick", "a:tick"]);
    }

    #[test]
    fn sequence_runs_steps_in_order() {
        let (mut tree, root, _) = tree_with(
            NodeKind::sequence(),
            vec![Countdown::new("a", 0, 1), Countdown::new("b", 1, 2)],
        );
        let input = TestContext::all();
        let mut log = Log::new();

        let mut statuses = Vec::new();
        while tree.evaluate(root, &input) {
            statuses.push(tree.tick(root, &input, &mut log));
        }
        assert_eq!(
            statuses,
            [Status::Executing, Status::Executing, Status::Finished]
        );
        assert_eq!(log, ["a:tick", "b:tick", "b:tick"]);
    }

    #[test]
    fn sequence_waits_on_blocked_step() {
        let (mut tree, root, _) = tree_with(
            NodeKind::sequence(),
            vec![Countdown::new("a", 0, 1), Countdown::new("b", 1, 1)],
        );
        let mut log = Log::new();
        let blocked = TestContext {
            ready: [true, false, false],
        };

        assert!(tree.evaluate(root, &blocked));
        assert_eq!(tree.tick(root, &blocked, &mut log), Status::Executing);
        assert!(!tree.evaluate(root, &blocked));
        assert!(tree.evaluate(root, &TestContext::all()));
    }

    #[test]
    fn empty_sequence_is_inapplicable() {
        let mut tree: Tree<TestContext, Log> = Tree::new();
        let root = tree.insert(None, NodeKind::sequence()).unwrap();
        assert!(!tree.evaluate(root, &TestContext::all()));
        assert_eq!(
            tree.tick(root, &TestContext::all(), &mut Log::new()),
            Status::Finished
        );
    }

    #[test]
    fn sequence_reset_rewinds() {
        let (mut tree, root, _) = tree_with(
            NodeKind::sequence(),
            vec![Countdown::new("a", 0, 1)],
        );
        let input = TestContext::all();
        let mut log = Log::new();

        assert!(tree.evaluate(root, &input));
        assert_eq!(tree.tick(root, &input, &mut log), Status::Finished);
        assert!(!tree.evaluate(root, &input));

        tree.reset(root, &input);
        assert!(tree.evaluate(root, &input));
    }

    #[test]
    fn parallel_requires_whole_cohort() {
        let (mut tree, root, _) = tree_with(
            NodeKind::parallel(FinishPolicy::And),
            vec![Countdown::new("a", 0, 1), Countdown::new("b", 1, 1)],
        );
        let partial = TestContext {
            ready: [true, false, true],
        };
        assert!(!tree.evaluate(root, &partial));
        assert!(tree.evaluate(root, &TestContext::all()));
    }

    #[test]
    fn empty_parallel_is_inapplicable() {
        let mut tree: Tree<TestContext, Log> = Tree::new();
        let root = tree.insert(None, NodeKind::parallel(FinishPolicy::And)).unwrap();
        assert!(!tree.evaluate(root, &TestContext::all()));
    }

    #[test]
    fn parallel_records_results_and_reset_clears_them() {
        let (mut tree, root, _) = tree_with(
            NodeKind::parallel(FinishPolicy::And),
            vec![Countdown::new("a", 0, 1), Countdown::new("b", 1, 2)],
        );
        let input = TestContext::all();
        let mut log = Log::new();

        assert_eq!(tree.tick(root, &input, &mut log), Status::Executing);
        let Some(NodeKind::Parallel(state)) = tree.kind(root) else {
            panic!("parallel expected");
        };
        assert_eq!(state.result(0), Some(Status::Finished));
        assert_eq!(state.result(1), Some(Status::Executing));

        tree.reset(root, &input);
        let Some(NodeKind::Parallel(state)) = tree.kind(root) else {
            panic!("parallel expected");
        };
        assert_eq!(state.result(0), None);
    }

    #[test]
    fn parallel_policy_can_change() {
        let (mut tree, root, _) = tree_with(
            NodeKind::parallel(FinishPolicy::And),
            vec![Countdown::new("a", 0, 1), Countdown::new("b", 1, 2)],
        );
        tree.set_finish_policy(root, FinishPolicy::Or).unwrap();

        let mut log = Log::new();
        assert_eq!(
            tree.tick(root, &TestContext::all(), &mut log),
            Status::Finished
        );
        assert_eq!(log, ["a:tick"]);
    }
}
