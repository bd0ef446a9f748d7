//! State trait and transition requests.

use core::any::{TypeId, type_name};
use core::fmt;

/// Identifies a registered state by its Rust type.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateKey {
    id: TypeId,
    name: &'static str,
}

impl StateKey {
    /// Key for state type `S`.
    pub fn of<S: 'static>() -> Self {
        Self {
            id: TypeId::of::<S>(),
            name: type_name::<S>(),
        }
    }

    pub(crate) fn id(self) -> TypeId {
        self.id
    }

    /// Full type name of the state.
    pub fn name(self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// What the current state wants after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transition {
    /// Remain in the current state.
    #[default]
    Stay,
    /// Switch to the state registered under the key.
    Change(StateKey),
}

impl Transition {
    /// Requests a switch to state type `S`.
    pub fn to<S: 'static>() -> Self {
        Transition::Change(StateKey::of::<S>())
    }
}

/// One state of a [`StateMachine`](crate::StateMachine) over context `C`.
pub trait State<C>: Send + 'static {
    /// Runs when the machine switches into this state.
    fn on_enter(&mut self, _ctx: &mut C) {}

    /// Runs once per machine update while this state is current.
    fn on_update(&mut self, ctx: &mut C) -> Transition;

    /// Runs when the machine switches away from this state.
    fn on_leave(&mut self, _ctx: &mut C) {}
}
