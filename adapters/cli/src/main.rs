#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays a scripted session through the governor.
//!
//! The driver stands in for a real host: it loads a configuration snapshot,
//! builds a small world, connects a player, and pushes a scripted sequence
//! of kills through the command/event pump so the adjustment decisions can
//! be observed end to end.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use respawn_governor_config as config;
use respawn_governor_core::{
    AreaFlags, AreaId, Command, ConfigSnapshot, CreatureTemplateId, Event, UnitRef,
};
use respawn_governor_system_adjustment::RespawnAdjustment;
use respawn_governor_system_bootstrap::Bootstrap;
use respawn_governor_world::{self as world, query, World};
use tracing_subscriber::EnvFilter;

const DUNGEON: AreaId = AreaId::new(230);
const RAID: AreaId = AreaId::new(469);
const FIELD: AreaId = AreaId::new(1);

/// Arguments accepted by the demo driver.
#[derive(Debug, Parser)]
#[command(
    name = "respawn-governor",
    about = "Replays a scripted kill session through the respawn governor"
)]
struct Args {
    /// Path to a TOML configuration file; documented defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let snapshot = match &args.config {
        Some(path) => config::load_path(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ConfigSnapshot::default(),
    };

    run_session(&snapshot);
    Ok(())
}

/// Drains a command queue to quiescence: world mutations first, then every
/// system reacts to the emitted events with follow-up commands.
fn pump(
    instance: &mut World,
    engine: &mut RespawnAdjustment,
    bootstrap: &Bootstrap,
    snapshot: &ConfigSnapshot,
    commands: Vec<Command>,
) -> Vec<Event> {
    let mut observed = Vec::new();
    let mut queue = commands;
    while !queue.is_empty() {
        let mut emitted = Vec::new();
        for command in queue.drain(..) {
            world::apply(instance, command, &mut emitted);
        }

        let creatures = query::creature_view(instance);
        let areas = query::area_view(instance);
        let mut followups = Vec::new();
        engine.handle(&emitted, &creatures, &areas, snapshot, &mut followups);
        bootstrap.handle(&emitted, snapshot, &mut followups);

        observed.extend(emitted);
        queue = followups;
    }
    observed
}

fn run_session(snapshot: &ConfigSnapshot) {
    let mut instance = World::new();
    let mut engine = RespawnAdjustment::new();
    let bootstrap = Bootstrap::new();

    let setup = vec![
        Command::RegisterArea {
            area: DUNGEON,
            flags: AreaFlags::DUNGEON,
        },
        Command::RegisterArea {
            area: RAID,
            flags: AreaFlags::RAID,
        },
        Command::RegisterArea {
            area: FIELD,
            flags: AreaFlags::WORLD,
        },
        Command::SpawnCreature {
            template: CreatureTemplateId::new(6500),
            area: DUNGEON,
            respawn_delay: Duration::from_secs(600),
        },
        Command::SpawnCreature {
            template: CreatureTemplateId::new(7100),
            area: RAID,
            respawn_delay: Duration::from_secs(7200),
        },
        Command::SpawnCreature {
            template: CreatureTemplateId::new(90),
            area: FIELD,
            respawn_delay: Duration::from_secs(120),
        },
        Command::ConnectPlayer,
    ];
    let events = pump(&mut instance, &mut engine, &bootstrap, snapshot, setup);

    let player = events.iter().find_map(|event| match event {
        Event::PlayerConnected { player } => Some(*player),
        _ => None,
    });
    let creatures: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::CreatureSpawned { creature, .. } => Some(*creature),
            _ => None,
        })
        .collect();

    if let Some(player) = player {
        for line in query::player_messages(&instance, player) {
            println!("[login] {line}");
        }
    }

    // Scripted kills: every creature falls to the player, then the dungeon
    // creature respawns and falls again to show the pristine-delay cache.
    let killer = player.map(UnitRef::Player);
    let mut script: Vec<Command> = creatures
        .iter()
        .map(|creature| Command::KillUnit {
            victim: UnitRef::Creature(*creature),
            killer,
        })
        .collect();
    script.push(Command::Tick {
        dt: Duration::from_secs(86_400),
    });
    if let Some(first) = creatures.first() {
        script.push(Command::KillUnit {
            victim: UnitRef::Creature(*first),
            killer,
        });
    }

    let outcome = pump(&mut instance, &mut engine, &bootstrap, snapshot, script);
    for event in &outcome {
        if let Event::RespawnDelayAdjusted { creature, from, to } = event {
            println!(
                "[adjust] creature {} respawn delay {} s -> {} s",
                creature.get(),
                from.as_secs(),
                to.as_secs()
            );
        }
    }

    println!("[state] clock at {} s", query::clock(&instance).as_secs());
    for creature in query::creature_view(&instance).iter() {
        println!(
            "[state] creature {} (template {}) delay {} s, {}",
            creature.id.get(),
            creature.template.get(),
            creature.respawn_delay.as_secs(),
            if creature.alive { "alive" } else { "dead" }
        );
    }
}
