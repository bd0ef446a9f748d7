//! Alert level of the guard, tracked by a small state machine.

use state_machine::{State, StateMachine, Transition};

/// Quiet cycles needed before an alarmed guard calms down.
const CALM_DOWN_CYCLES: u32 = 3;

/// Context shared with the alert states.
#[derive(Debug, Default)]
pub struct Senses {
    pub intruder_visible: bool,
    pub alarmed: bool,
}

pub struct Calm;

impl State<Senses> for Calm {
    fn on_enter(&mut self, senses: &mut Senses) {
        senses.alarmed = false;
    }

    fn on_update(&mut self, senses: &mut Senses) -> Transition {
        if senses.intruder_visible {
            Transition::to::<Alarmed>()
        } else {
            Transition::Stay
        }
    }
}

pub struct Alarmed {
    quiet: u32,
}

impl State<Senses> for Alarmed {
    fn on_enter(&mut self, senses: &mut Senses) {
        self.quiet = 0;
        senses.alarmed = true;
        tracing::info!("guard is alarmed");
    }

    fn on_update(&mut self, senses: &mut Senses) -> Transition {
        if senses.intruder_visible {
            self.quiet = 0;
            return Transition::Stay;
        }
        self.quiet += 1;
        if self.quiet >= CALM_DOWN_CYCLES {
            Transition::to::<Calm>()
        } else {
            Transition::Stay
        }
    }

    fn on_leave(&mut self, _senses: &mut Senses) {
        tracing::info!("guard calms down");
    }
}

/// Builds the alert machine, starting calm.
pub fn alert_machine(senses: &mut Senses) -> state_machine::Result<StateMachine<Senses>> {
    let mut fsm = StateMachine::new();
    fsm.add_state(Calm);
    fsm.add_state(Alarmed { quiet: 0 });
    fsm.change_state::<Calm>(senses)?;
    Ok(fsm)
}
