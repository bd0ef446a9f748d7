//! Single-active-state machine keyed by state type.
//!
//! Each state is registered once under its own Rust type. Exactly one state
//! is current at a time; switching runs the old state's leave hook and the
//! new state's enter hook. States request switches by returning a
//! [`Transition`] from their update hook.
//!
//! The machine is independent of the behavior tree; a game loop can drive
//! both side by side.

pub mod error;
pub mod machine;
pub mod state;

pub use error::{Result, StateMachineError};
pub use machine::StateMachine;
pub use state::{State, StateKey, Transition};
