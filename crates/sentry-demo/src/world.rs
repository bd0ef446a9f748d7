//! The guard's view of the world and the leaf actions acting on it.

use behavior_tree::builder::{action, parallel, priority_selector, repeat, sequence};
use behavior_tree::{Action, Blueprint, Condition, FinishPolicy, Status};

/// Snapshot handed to the tree each cycle.
#[derive(Clone, Debug, Default)]
pub struct World {
    pub cycle: u64,
    /// Distance to the intruder, if one is visible.
    pub intruder: Option<i32>,
    pub health: i32,
    /// Set while the alert state machine is in its alarmed state.
    pub alarmed: bool,
}

/// What the guard decided to do this cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Walk { waypoint: usize },
    Chase,
    Strike,
    Shout,
    Retreat,
    Bandage,
}

pub type Orders = Vec<Command>;

/// Walks to a waypoint over a fixed number of cycles.
struct WalkTo {
    waypoint: usize,
    distance: u32,
    left: u32,
}

impl WalkTo {
    fn new(waypoint: usize, distance: u32) -> Self {
        Self {
            waypoint,
            distance,
            left: distance,
        }
    }
}

impl Action<World, Orders> for WalkTo {
    fn enter(&mut self, _input: &World) {
        self.left = self.distance;
    }

    fn execute(&mut self, _input: &World, output: &mut Orders) -> Status {
        output.push(Command::Walk {
            waypoint: self.waypoint,
        });
        self.left = self.left.saturating_sub(1);
        if self.left == 0 {
            Status::Finished
        } else {
            Status::Executing
        }
    }
}

/// Closes in on the intruder; finishes once adjacent.
struct Chase;

impl Action<World, Orders> for Chase {
    fn execute(&mut self, input: &World, output: &mut Orders) -> Status {
        match input.intruder {
            Some(distance) if distance <= 1 => {
                output.push(Command::Strike);
                Status::Finished
            }
            Some(_) => {
                output.push(Command::Chase);
                Status::Executing
            }
            None => Status::Finished,
        }
    }
}

/// Raises the alarm once per engagement and then keeps quiet.
struct Shout {
    shouted: bool,
}

impl Action<World, Orders> for Shout {
    fn enter(&mut self, _input: &World) {
        self.shouted = false;
    }

    fn execute(&mut self, _input: &World, output: &mut Orders) -> Status {
        if !self.shouted {
            output.push(Command::Shout);
            self.shouted = true;
        }
        Status::Executing
    }
}

/// Emits a single command and finishes.
struct Emit(Command);

impl Action<World, Orders> for Emit {
    fn execute(&mut self, _input: &World, output: &mut Orders) -> Status {
        output.push(self.0);
        Status::Finished
    }
}

/// Builds the guard's decision tree.
///
/// Retreating beats engaging, which beats patrolling.
pub fn guard_tree() -> Blueprint<World, Orders> {
    let wounded = Condition::delegate(|w: &World| w.health < 30);
    let sees_intruder = Condition::delegate(|w: &World| w.intruder.is_some());
    let alarmed = Condition::delegate(|w: &World| w.alarmed);

    priority_selector(vec![
        sequence(vec![
            action(Emit(Command::Retreat)).named("retreat"),
            action(Emit(Command::Bandage)).named("bandage"),
        ])
        .named("recover")
        .when(wounded),
        parallel(
            FinishPolicy::Or,
            vec![
                action(Chase).named("chase"),
                action(Shout { shouted: false }).named("shout"),
            ],
        )
        .named("engage")
        .when(sees_intruder | alarmed),
        repeat(
            2,
            sequence(vec![
                action(WalkTo::new(0, 2)).named("to-gate"),
                action(WalkTo::new(1, 3)).named("to-tower"),
            ])
            .named("lap"),
        )
        .named("patrol"),
    ])
    .named("guard")
}
