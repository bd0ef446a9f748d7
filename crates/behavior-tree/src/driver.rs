//! The control loop around a tree.
//!
//! An [`Agent`] owns a tree and its root and runs one control cycle at a
//! time: evaluate the root, tick it if applicable, and reset it after it
//! finishes. Aborting in-flight work is an explicit [`Agent::abort`].

use tracing::{debug, info};

use crate::config::DriverConfig;
use crate::node::NodeId;
use crate::status::Status;
use crate::tree::Tree;

/// Summary of [`Agent::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Cycles spent, including cycles where the root was not applicable.
    pub cycles: u64,
    /// Status of the last tick, if the root ever ran.
    pub last_status: Option<Status>,
}

impl RunReport {
    /// Returns `true` if the run ended because the root terminated.
    pub fn completed(&self) -> bool {
        self.last_status.is_some_and(Status::is_terminal)
    }
}

/// A tree together with the driver state that advances it.
#[derive(Debug)]
pub struct Agent<I, O> {
    tree: Tree<I, O>,
    root: NodeId,
    config: DriverConfig,
    cycles: u64,
}

impl<I, O> Agent<I, O> {
    pub fn new(tree: Tree<I, O>, root: NodeId) -> Self {
        Self::with_config(tree, root, DriverConfig::default())
    }

    pub fn with_config(tree: Tree<I, O>, root: NodeId, config: DriverConfig) -> Self {
        Self {
            tree,
            root,
            config,
            cycles: 0,
        }
    }

    pub fn tree(&self) -> &Tree<I, O> {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree<I, O> {
        &mut self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Total cycles driven so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// The leaf currently executing anywhere in the tree.
    pub fn active_leaf(&self) -> Option<NodeId> {
        self.tree.active_node(self.root)
    }

    /// Runs one control cycle.
    ///
    /// Returns `None` if the root was not applicable this cycle, otherwise
    /// the status of its tick.
    pub fn cycle(&mut self, input: &I, output: &mut O) -> Option<Status> {
        self.cycles += 1;
        if !self.tree.evaluate(self.root, input) {
            debug!(cycle = self.cycles, "root not applicable");
            return None;
        }

        let status = self.tree.tick(self.root, input, output);
        if self.config.trace_active {
            let active = self.active_leaf().map(|leaf| self.tree.describe(leaf));
            info!(cycle = self.cycles, %status, active = ?active, "cycle");
        }
        if status.is_terminal() && self.config.reset_on_finish {
            self.tree.reset(self.root, input);
        }
        Some(status)
    }

    /// Cycles with a fixed input until the root terminates or the cycle
    /// budget runs out.
    pub fn run(&mut self, input: &I, output: &mut O) -> RunReport {
        let mut report = RunReport {
            cycles: 0,
            last_status: None,
        };
        while report.cycles < self.config.max_cycles {
            report.cycles += 1;
            if let Some(status) = self.cycle(input, output) {
                report.last_status = Some(status);
                if status.is_terminal() {
                    break;
                }
            }
        }
        debug!(cycles = report.cycles, last = ?report.last_status, "run ended");
        report
    }

    /// Abandons whatever is in flight, running exit hooks of active leaves.
    pub fn abort(&mut self, input: &I) {
        debug!(root = %self.tree.describe(self.root), "abort");
        self.tree.reset(self.root, input);
    }

    /// Releases the tree.
    pub fn into_tree(self) -> Tree<I, O> {
        self.tree
    }
}
