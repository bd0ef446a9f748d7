//! Reactive behavior tree engine for game agents.
//!
//! This library drives decision-making agents through a hierarchy of
//! composable nodes that are checked for applicability and then advanced
//! once per control cycle.
//!
//! - **Evaluate / Tick / Reset**: every node answers "may I run?", advances
//!   by one step, and can be forced back to its initial state
//! - **Running state**: actions may span several cycles by reporting
//!   [`Status::Executing`]
//! - **Arena storage**: nodes live in a [`Tree`] and reference each other by
//!   [`NodeId`], parents by back-reference only
//! - **Active-node bubbling**: every ancestor of a running leaf knows which
//!   leaf is executing
//!
//! # Architecture
//!
//! - [`Tree`]: node arena, construction API, and protocol dispatch
//! - [`Status`]: Executing, Finished, or ErrorTransition
//! - [`Condition`]: AND/OR/XOR/NOT gates on node applicability
//! - Composite nodes: [`Selector`], [`Sequence`], [`Parallel`]
//! - Decorator nodes: [`Loop`]
//! - Leaf nodes: [`Action`] implementations driven by [`Leaf`]
//! - [`Agent`]: the per-cycle driver, configured by [`DriverConfig`]

pub mod action;
pub mod builder;
pub mod composite;
pub mod condition;
pub mod config;
pub mod decorator;
pub mod driver;
pub mod error;
pub mod node;
pub mod status;
pub mod tree;

// Re-export core types for ergonomic API
pub use action::{Action, FnAction, Leaf, Phase};
pub use builder::Blueprint;
pub use composite::{FinishPolicy, Parallel, Selector, SelectorPolicy, Sequence};
pub use condition::{Condition, Delegate, Group, Predicate};
pub use config::DriverConfig;
pub use decorator::Loop;
pub use driver::{Agent, RunReport};
pub use error::{Result, TreeError};
pub use node::{NodeId, NodeKind, NodeLabel};
pub use status::Status;
pub use tree::Tree;
