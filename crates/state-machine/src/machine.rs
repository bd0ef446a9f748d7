//! The state registry and its single current state.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::error::{Result, StateMachineError};
use crate::state::{State, StateKey, Transition};

/// Registry of states keyed by type, with at most one current state.
pub struct StateMachine<C> {
    states: HashMap<StateKey, Box<dyn State<C>>>,
    current: Option<StateKey>,
}

impl<C: 'static> Default for StateMachine<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> fmt::Debug for StateMachine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("states", &self.states.keys().collect::<Vec<_>>())
            .field("current", &self.current)
            .finish()
    }
}

impl<C: 'static> StateMachine<C> {
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
            current: None,
        }
    }

    /// Registers `state` under its type.
    ///
    /// Returns `false` and keeps the existing state if that type is already
    /// registered.
    pub fn add_state<S: State<C>>(&mut self, state: S) -> bool {
        let key = StateKey::of::<S>();
        if self.states.contains_key(&key) {
            debug!(state = key.name(), "state already registered, ignoring");
            return false;
        }
        self.states.insert(key, Box::new(state));
        true
    }

    /// Switches to state type `S`.
    pub fn change_state<S: State<C>>(&mut self, ctx: &mut C) -> Result<()> {
        self.change_to(StateKey::of::<S>(), ctx)
    }

    /// Switches to the state registered under `key`.
    ///
    /// The current state (if any) leaves first, even when `key` names it, so
    /// re-entering a state runs both hooks.
    pub fn change_to(&mut self, key: StateKey, ctx: &mut C) -> Result<()> {
        if !self.states.contains_key(&key) {
            return Err(StateMachineError::UnknownState(key.name()));
        }

        if let Some(previous) = self.current.take() {
            if let Some(state) = self.states.get_mut(&previous) {
                state.on_leave(ctx);
            }
            debug!(from = previous.name(), to = key.name(), "state change");
        } else {
            debug!(to = key.name(), "initial state");
        }

        self.current = Some(key);
        if let Some(state) = self.states.get_mut(&key) {
            state.on_enter(ctx);
        }
        Ok(())
    }

    /// Updates the current state and applies the transition it requests.
    ///
    /// Does nothing without a current state.
    pub fn on_update(&mut self, ctx: &mut C) -> Result<()> {
        let Some(key) = self.current else {
            return Ok(());
        };
        let transition = match self.states.get_mut(&key) {
            Some(state) => state.on_update(ctx),
            None => Transition::Stay,
        };
        match transition {
            Transition::Stay => Ok(()),
            Transition::Change(next) => self.change_to(next, ctx),
        }
    }

    /// Forgets every state. No leave hook runs.
    pub fn reset(&mut self) {
        self.states.clear();
        self.current = None;
    }

    pub fn current(&self) -> Option<StateKey> {
        self.current
    }

    /// Returns `true` if `S` is the current state.
    pub fn is_in<S: 'static>(&self) -> bool {
        self.current
            .is_some_and(|key| key.id() == StateKey::of::<S>().id())
    }

    pub fn current_state_name(&self) -> Option<&'static str> {
        self.current.map(StateKey::name)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct TestContext {
        log: Vec<&'static str>,
        stamina: i32,
    }

    struct Resting;
    impl State<TestContext> for Resting {
        fn on_enter(&mut self, ctx: &mut TestContext) {
            ctx.log.push("rest:enter");
        }

        fn on_update(&mut self, ctx: &mut TestContext) -> Transition {
            ctx.stamina += 2;
            if ctx.stamina >= 4 {
                Transition::to::<Working>()
            } else {
                Transition::Stay
            }
        }

        fn on_leave(&mut self, ctx: &mut TestContext) {
            ctx.log.push("rest:leave");
        }
    }

    struct Working;
    impl State<TestContext> for Working {
        fn on_enter(&mut self, ctx: &mut TestContext) {
            ctx.log.push("work:enter");
        }

        fn on_update(&mut self, ctx: &mut TestContext) -> Transition {
            ctx.stamina -= 1;
            if ctx.stamina <= 0 {
                Transition::to::<Resting>()
            } else {
                Transition::Stay
            }
        }
    }

    fn machine() -> StateMachine<TestContext> {
        let mut fsm = StateMachine::new();
        assert!(fsm.add_state(Resting));
        assert!(fsm.add_state(Working));
        fsm
    }

    #[test]
    fn update_without_state_is_noop() {
        let mut fsm = machine();
        let mut ctx = TestContext::default();
        fsm.on_update(&mut ctx).unwrap();
        assert!(ctx.log.is_empty());
        assert_eq!(fsm.current(), None);
    }

    #[test]
    fn transitions_run_hooks_in_order() {
        let mut fsm = machine();
        let mut ctx = TestContext::default();

        fsm.change_state::<Resting>(&mut ctx).unwrap();
        fsm.on_update(&mut ctx).unwrap();
        assert!(fsm.is_in::<Resting>());
        fsm.on_update(&mut ctx).unwrap();
        assert!(fsm.is_in::<Working>());

        for _ in 0..4 {
            fsm.on_update(&mut ctx).unwrap();
        }
        assert!(fsm.is_in::<Resting>());
        assert_eq!(
            ctx.log,
            ["rest:enter", "rest:leave", "work:enter", "rest:enter"]
        );
    }

    #[test]
    fn duplicate_registration_is_ignored() {
        let mut fsm = machine();
        assert!(!fsm.add_state(Resting));
        assert_eq!(fsm.len(), 2);
    }

    #[test]
    fn unknown_state_is_an_error() {
        struct Sleeping;
        impl State<TestContext> for Sleeping {
            fn on_update(&mut self, _ctx: &mut TestContext) -> Transition {
                Transition::Stay
            }
        }

        let mut fsm = machine();
        let mut ctx = TestContext::default();
        let err = fsm.change_state::<Sleeping>(&mut ctx).unwrap_err();
        assert!(matches!(err, StateMachineError::UnknownState(name) if name.ends_with("Sleeping")));
        assert_eq!(fsm.current(), None);
    }

    #[test]
    fn reentering_runs_leave_and_enter() {
        let mut fsm = machine();
        let mut ctx = TestContext::default();
        fsm.change_state::<Resting>(&mut ctx).unwrap();
        fsm.change_state::<Resting>(&mut ctx).unwrap();
        assert_eq!(ctx.log, ["rest:enter", "rest:leave", "rest:enter"]);
    }

    #[test]
    fn reset_forgets_everything() {
        let mut fsm = machine();
        let mut ctx = TestContext::default();
        fsm.change_state::<Working>(&mut ctx).unwrap();
        fsm.reset();
        assert!(fsm.is_empty());
        assert_eq!(fsm.current_state_name(), None);
    }
}
