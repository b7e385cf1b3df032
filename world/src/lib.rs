#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the respawn governor harness.
//!
//! The world owns areas, creatures, players, and the simulation clock. It
//! mutates exclusively through [`apply`] and reports every observable change
//! as an [`Event`], which is what the pure systems consume. Nothing in this
//! crate decides whether a respawn delay should change; it only executes the
//! commands systems hand back.

use std::collections::BTreeMap;
use std::time::Duration;

use respawn_governor_core::{
    AreaFlags, AreaId, Command, CreatureId, CreatureTemplateId, Event, PlayerId,
};

/// Authoritative simulation state.
#[derive(Debug, Default)]
pub struct World {
    areas: BTreeMap<AreaId, AreaFlags>,
    creatures: Vec<Creature>,
    players: Vec<Player>,
    next_creature: u64,
    next_player: u32,
    clock: Duration,
}

impl World {
    /// Creates an empty world with the clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn creature_mut(&mut self, id: CreatureId) -> Option<&mut Creature> {
        self.creatures.iter_mut().find(|creature| creature.id == id)
    }

    fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|player| player.id == id)
    }

    fn allocate_creature(&mut self) -> CreatureId {
        let id = CreatureId::new(self.next_creature);
        self.next_creature += 1;
        id
    }

    fn allocate_player(&mut self) -> PlayerId {
        let id = PlayerId::new(self.next_player);
        self.next_player += 1;
        id
    }
}

#[derive(Debug)]
struct Creature {
    id: CreatureId,
    template: CreatureTemplateId,
    area: AreaId,
    respawn_delay: Duration,
    alive: bool,
    respawn_at: Option<Duration>,
}

#[derive(Debug)]
struct Player {
    id: PlayerId,
    messages: Vec<String>,
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::RegisterArea { area, flags } => {
            let _ = world.areas.insert(area, flags);
            out_events.push(Event::AreaRegistered { area });
        }
        Command::SpawnCreature {
            template,
            area,
            respawn_delay,
        } => {
            let creature = world.allocate_creature();
            world.creatures.push(Creature {
                id: creature,
                template,
                area,
                respawn_delay,
                alive: true,
                respawn_at: None,
            });
            out_events.push(Event::CreatureSpawned {
                creature,
                template,
                area,
            });
        }
        Command::ConnectPlayer => {
            let player = world.allocate_player();
            world.players.push(Player {
                id: player,
                messages: Vec::new(),
            });
            out_events.push(Event::PlayerConnected { player });
        }
        Command::KillUnit { victim, killer } => {
            if let Some(id) = victim.as_creature() {
                let now = world.clock;
                let Some(creature) = world.creature_mut(id) else {
                    return;
                };
                if !creature.alive {
                    return;
                }
                creature.alive = false;
                creature.respawn_at = Some(now.saturating_add(creature.respawn_delay));
            }
            out_events.push(Event::UnitDied { victim, killer });
        }
        Command::AdjustRespawnDelay { creature, delay } => {
            let now = world.clock;
            let Some(entry) = world.creature_mut(creature) else {
                return;
            };
            let from = entry.respawn_delay;
            entry.respawn_delay = delay;
            if !entry.alive {
                entry.respawn_at = Some(now.saturating_add(delay));
            }
            out_events.push(Event::RespawnDelayAdjusted {
                creature,
                from,
                to: delay,
            });
        }
        Command::RemoveCreature { creature } => {
            let before = world.creatures.len();
            world.creatures.retain(|entry| entry.id != creature);
            if world.creatures.len() != before {
                out_events.push(Event::CreatureRemoved { creature });
            }
        }
        Command::DeliverSystemMessage { player, text } => {
            let Some(entry) = world.player_mut(player) else {
                return;
            };
            entry.messages.push(text);
            out_events.push(Event::SystemMessageDelivered { player });
        }
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });

            let now = world.clock;
            for creature in world.creatures.iter_mut() {
                let due = matches!(creature.respawn_at, Some(at) if at <= now);
                if !creature.alive && due {
                    creature.alive = true;
                    creature.respawn_at = None;
                    out_events.push(Event::CreatureRespawned {
                        creature: creature.id,
                    });
                }
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use respawn_governor_core::{
        AreaSnapshot, AreaView, CreatureId, CreatureSnapshot, CreatureView, PlayerId,
    };

    use super::World;

    /// Captures an immutable snapshot of every creature in the world.
    #[must_use]
    pub fn creature_view(world: &World) -> CreatureView {
        let snapshots: Vec<CreatureSnapshot> = world
            .creatures
            .iter()
            .map(|creature| CreatureSnapshot {
                id: creature.id,
                template: creature.template,
                area: creature.area,
                respawn_delay: creature.respawn_delay,
                alive: creature.alive,
            })
            .collect();
        CreatureView::from_snapshots(snapshots)
    }

    /// Captures an immutable snapshot of every registered area.
    #[must_use]
    pub fn area_view(world: &World) -> AreaView {
        let snapshots: Vec<AreaSnapshot> = world
            .areas
            .iter()
            .map(|(id, flags)| AreaSnapshot {
                id: *id,
                flags: *flags,
            })
            .collect();
        AreaView::from_snapshots(snapshots)
    }

    /// Current simulation time accumulated from tick commands.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Absolute simulation time at which the creature will respawn, if dead.
    #[must_use]
    pub fn pending_respawn(world: &World, creature: CreatureId) -> Option<Duration> {
        world
            .creatures
            .iter()
            .find(|entry| entry.id == creature)
            .and_then(|entry| entry.respawn_at)
    }

    /// Informational lines delivered to the player so far, oldest first.
    #[must_use]
    pub fn player_messages(world: &World, player: PlayerId) -> &[String] {
        world
            .players
            .iter()
            .find(|entry| entry.id == player)
            .map(|entry| entry.messages.as_slice())
            .unwrap_or(&[])
    }
}
