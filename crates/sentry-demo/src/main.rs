//! Guard AI demo: one driver loop advancing a behavior tree and an alert
//! state machine side by side.
mod mood;
mod world;

use anyhow::Result;
use behavior_tree::{Agent, DriverConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::mood::{Senses, alert_machine};
use crate::world::{Orders, World, guard_tree};

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    setup_logging();

    let config = DriverConfig::from_env();
    tracing::info!(?config, "starting guard");

    let (tree, root) = guard_tree().into_tree()?;
    let mut agent = Agent::with_config(tree, root, config);

    let mut senses = Senses::default();
    let mut fsm = alert_machine(&mut senses)?;

    let mut world = World {
        health: 100,
        ..World::default()
    };

    for cycle in 0..agent.config().max_cycles {
        world.cycle = cycle;
        world.intruder = intruder_distance(cycle);
        if world.intruder == Some(1) {
            // The intruder fights back when cornered.
            world.health -= 25;
        }

        senses.intruder_visible = world.intruder.is_some();
        fsm.on_update(&mut senses)?;
        world.alarmed = senses.alarmed;

        let mut orders = Orders::new();
        let status = agent.cycle(&world, &mut orders);
        tracing::info!(
            cycle,
            mood = fsm.current_state_name().unwrap_or("none"),
            health = world.health,
            ?status,
            ?orders,
            "cycle"
        );

        if world.health < 30 && world.intruder.is_none() {
            world.health = 100;
        }
    }

    agent.abort(&world);
    tracing::info!(cycles = agent.cycles(), "guard dismissed");
    Ok(())
}

/// Scripted intruder: approaches, gets close, then vanishes for a while.
fn intruder_distance(cycle: u64) -> Option<i32> {
    let phase = cycle % 24;
    match phase {
        8..=12 => Some(13 - phase as i32),
        _ => None,
    }
}

/// Setup logging to stderr, filtered by `RUST_LOG`.
fn setup_logging() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
