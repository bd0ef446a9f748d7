//! Error types raised by the state machine.

use thiserror::Error;

/// Errors surfaced by [`StateMachine`](crate::StateMachine).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateMachineError {
    #[error("state {0} is not registered")]
    UnknownState(&'static str),
}

pub type Result<T> = std::result::Result<T, StateMachineError>;
