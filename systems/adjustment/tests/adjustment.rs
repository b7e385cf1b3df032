use std::time::Duration;

use respawn_governor_core::{
    AreaFlags, AreaId, Command, ConfigSnapshot, CreatureId, CreatureTemplateId, Event, PlayerId,
    UnitRef, RESPAWN_DISABLED_DELAY,
};
use respawn_governor_system_adjustment::{Decision, RespawnAdjustment, SkipReason};
use respawn_governor_world::{self as world, query, World};

const DUNGEON: AreaId = AreaId::new(230);
const RAID: AreaId = AreaId::new(469);
const FIELD: AreaId = AreaId::new(1);
const TEMPLATE: CreatureTemplateId = CreatureTemplateId::new(6500);

fn setup_world() -> World {
    let mut instance = World::new();
    let mut events = Vec::new();
    for (area, flags) in [
        (DUNGEON, AreaFlags::DUNGEON),
        (RAID, AreaFlags::RAID),
        (FIELD, AreaFlags::WORLD),
    ] {
        world::apply(
            &mut instance,
            Command::RegisterArea { area, flags },
            &mut events,
        );
    }
    instance
}

fn spawn(instance: &mut World, area: AreaId, delay_secs: u64) -> CreatureId {
    let mut events = Vec::new();
    world::apply(
        instance,
        Command::SpawnCreature {
            template: TEMPLATE,
            area,
            respawn_delay: Duration::from_secs(delay_secs),
        },
        &mut events,
    );
    match events.as_slice() {
        [Event::CreatureSpawned { creature, .. }] => *creature,
        other => panic!("unexpected spawn events: {other:?}"),
    }
}

fn player_kill() -> Option<UnitRef> {
    Some(UnitRef::Player(PlayerId::new(0)))
}

/// Kills the creature, runs the engine over the emitted events, and applies
/// any resulting command back to the world. Returns the adjusted delay when
/// the engine decided to act.
fn kill_and_adjust(
    instance: &mut World,
    engine: &mut RespawnAdjustment,
    creature: CreatureId,
    killer: Option<UnitRef>,
    config: &ConfigSnapshot,
) -> Option<Duration> {
    let mut events = Vec::new();
    world::apply(
        instance,
        Command::KillUnit {
            victim: UnitRef::Creature(creature),
            killer,
        },
        &mut events,
    );

    let creatures = query::creature_view(instance);
    let areas = query::area_view(instance);
    let mut commands = Vec::new();
    engine.handle(&events, &creatures, &areas, config, &mut commands);

    let mut adjusted = None;
    for command in commands {
        if let Command::AdjustRespawnDelay { delay, .. } = command {
            adjusted = Some(delay);
        }
        let mut followup = Vec::new();
        world::apply(instance, command, &mut followup);
    }
    adjusted
}

/// Advances the clock far enough for every pending respawn to fire.
fn revive(instance: &mut World, dt_secs: u64) {
    let mut events = Vec::new();
    world::apply(
        instance,
        Command::Tick {
            dt: Duration::from_secs(dt_secs),
        },
        &mut events,
    );
}

#[test]
fn dungeon_death_scales_by_global_and_area_multiplier() {
    let mut instance = setup_world();
    let mut engine = RespawnAdjustment::new();
    let creature = spawn(&mut instance, DUNGEON, 600);
    let config = ConfigSnapshot {
        multiplier_global: 2.0,
        multiplier_dungeon: 1.5,
        ..ConfigSnapshot::default()
    };

    let adjusted = kill_and_adjust(&mut instance, &mut engine, creature, player_kill(), &config);

    assert_eq!(adjusted, Some(Duration::from_secs(1800)));
    let view = query::creature_view(&instance);
    assert_eq!(
        view.get(creature).expect("creature").respawn_delay,
        Duration::from_secs(1800)
    );
    assert_eq!(
        query::pending_respawn(&instance, creature),
        Some(Duration::from_secs(1800))
    );
}

#[test]
fn zero_multiplier_disables_respawn_with_sentinel() {
    let mut instance = setup_world();
    let mut engine = RespawnAdjustment::new();
    let creature = spawn(&mut instance, DUNGEON, 600);
    let config = ConfigSnapshot {
        multiplier_global: 0.0,
        ..ConfigSnapshot::default()
    };

    let adjusted = kill_and_adjust(&mut instance, &mut engine, creature, player_kill(), &config);

    // The sentinel bypasses the configured clamp ceiling entirely.
    assert_eq!(adjusted, Some(RESPAWN_DISABLED_DELAY));
    assert!(RESPAWN_DISABLED_DELAY > config.adjusted_delay_max);
}

#[test]
fn repeated_deaths_reuse_the_pristine_delay() {
    let mut instance = setup_world();
    let mut engine = RespawnAdjustment::new();
    let creature = spawn(&mut instance, DUNGEON, 600);
    let config = ConfigSnapshot {
        multiplier_global: 2.0,
        ..ConfigSnapshot::default()
    };

    let first = kill_and_adjust(&mut instance, &mut engine, creature, player_kill(), &config);
    assert_eq!(first, Some(Duration::from_secs(1200)));

    revive(&mut instance, 1200);
    let second = kill_and_adjust(&mut instance, &mut engine, creature, player_kill(), &config);

    // Without the pristine table this would compound to 2400.
    assert_eq!(second, Some(Duration::from_secs(1200)));
    assert_eq!(
        engine.pristine_delay(creature),
        Some(Duration::from_secs(600))
    );
}

#[test]
fn short_delays_are_never_touched_and_leave_no_record() {
    let mut instance = setup_world();
    let mut engine = RespawnAdjustment::new();
    let creature = spawn(&mut instance, DUNGEON, 200);

    let adjusted = kill_and_adjust(
        &mut instance,
        &mut engine,
        creature,
        player_kill(),
        &ConfigSnapshot::default(),
    );

    assert_eq!(adjusted, None);
    assert_eq!(engine.pristine_delay(creature), None);
    let view = query::creature_view(&instance);
    assert_eq!(
        view.get(creature).expect("creature").respawn_delay,
        Duration::from_secs(200)
    );
}

#[test]
fn oversized_delays_are_never_touched() {
    let mut instance = setup_world();
    let mut engine = RespawnAdjustment::new();
    let creature = spawn(&mut instance, DUNGEON, 100_000);

    let adjusted = kill_and_adjust(
        &mut instance,
        &mut engine,
        creature,
        player_kill(),
        &ConfigSnapshot::default(),
    );

    assert_eq!(adjusted, None);
}

#[test]
fn computed_delays_clamp_to_the_adjusted_bounds() {
    let mut instance = setup_world();
    let mut engine = RespawnAdjustment::new();
    let creature = spawn(&mut instance, DUNGEON, 600);
    let config = ConfigSnapshot {
        multiplier_global: 200.0,
        ..ConfigSnapshot::default()
    };

    let adjusted = kill_and_adjust(&mut instance, &mut engine, creature, player_kill(), &config);

    assert_eq!(adjusted, Some(Duration::from_secs(86_400)));
}

#[test]
fn disabled_governor_ignores_every_death() {
    let mut instance = setup_world();
    let mut engine = RespawnAdjustment::new();
    let creature = spawn(&mut instance, DUNGEON, 600);
    let config = ConfigSnapshot {
        enabled: false,
        multiplier_global: 2.0,
        ..ConfigSnapshot::default()
    };

    let adjusted = kill_and_adjust(&mut instance, &mut engine, creature, player_kill(), &config);

    assert_eq!(adjusted, None);
    assert_eq!(engine.pristine_delay(creature), None);
}

#[test]
fn world_deaths_require_the_world_gate() {
    let mut instance = setup_world();
    let mut engine = RespawnAdjustment::new();
    let creature = spawn(&mut instance, FIELD, 600);

    let skipped = kill_and_adjust(
        &mut instance,
        &mut engine,
        creature,
        player_kill(),
        &ConfigSnapshot::default(),
    );
    assert_eq!(skipped, None, "world gate defaults to off");

    let config = ConfigSnapshot {
        enable_world: true,
        multiplier_world: 2.0,
        ..ConfigSnapshot::default()
    };
    let other = spawn(&mut instance, FIELD, 600);
    let adjusted = kill_and_adjust(&mut instance, &mut engine, other, player_kill(), &config);
    assert_eq!(adjusted, Some(Duration::from_secs(1200)));
}

#[test]
fn raid_deaths_use_the_raid_multiplier() {
    let mut instance = setup_world();
    let mut engine = RespawnAdjustment::new();
    let creature = spawn(&mut instance, RAID, 600);
    let config = ConfigSnapshot {
        multiplier_raid: 3.0,
        ..ConfigSnapshot::default()
    };

    let adjusted = kill_and_adjust(&mut instance, &mut engine, creature, player_kill(), &config);

    assert_eq!(adjusted, Some(Duration::from_secs(1800)));
}

#[test]
fn denied_instances_override_every_other_rule() {
    let mut instance = setup_world();
    let mut engine = RespawnAdjustment::new();
    let creature = spawn(&mut instance, DUNGEON, 600);
    let config = ConfigSnapshot {
        never_instances: [DUNGEON].into_iter().collect(),
        always_instances: [DUNGEON].into_iter().collect(),
        always_creatures: [TEMPLATE].into_iter().collect(),
        ..ConfigSnapshot::default()
    };

    let adjusted = kill_and_adjust(&mut instance, &mut engine, creature, player_kill(), &config);

    assert_eq!(adjusted, None);
}

#[test]
fn allowed_instances_bypass_the_area_type_gate() {
    let mut instance = setup_world();
    let mut engine = RespawnAdjustment::new();
    let creature = spawn(&mut instance, DUNGEON, 600);
    let config = ConfigSnapshot {
        enable_dungeons: false,
        always_instances: [DUNGEON].into_iter().collect(),
        multiplier_global: 2.0,
        ..ConfigSnapshot::default()
    };

    let adjusted = kill_and_adjust(&mut instance, &mut engine, creature, player_kill(), &config);

    // The multiplier still comes from the dungeon classification even though
    // the gate itself was bypassed.
    assert_eq!(adjusted, Some(Duration::from_secs(1200)));
}

#[test]
fn always_creatures_bypass_killer_and_bounds_checks() {
    let mut instance = setup_world();
    let mut engine = RespawnAdjustment::new();
    let creature = spawn(&mut instance, DUNGEON, 50);
    let config = ConfigSnapshot {
        always_creatures: [TEMPLATE].into_iter().collect(),
        ..ConfigSnapshot::default()
    };

    // No killer at all, and a delay below the original minimum: both checks
    // are bypassed by the creature-tier always list. The computed 50 s then
    // clamps up to the adjusted minimum.
    let adjusted = kill_and_adjust(&mut instance, &mut engine, creature, None, &config);

    assert_eq!(adjusted, Some(Duration::from_secs(300)));
}

#[test]
fn denied_creatures_win_over_allowed_instances() {
    let mut instance = setup_world();
    let mut engine = RespawnAdjustment::new();
    let creature = spawn(&mut instance, DUNGEON, 600);
    let config = ConfigSnapshot {
        never_creatures: [TEMPLATE].into_iter().collect(),
        always_instances: [DUNGEON].into_iter().collect(),
        ..ConfigSnapshot::default()
    };

    let mut events = Vec::new();
    world::apply(
        &mut instance,
        Command::KillUnit {
            victim: UnitRef::Creature(creature),
            killer: Some(UnitRef::Creature(CreatureId::new(999))),
        },
        &mut events,
    );
    let creatures = query::creature_view(&instance);
    let areas = query::area_view(&instance);
    let decision = engine.evaluate(
        UnitRef::Creature(creature),
        Some(UnitRef::Creature(CreatureId::new(999))),
        &creatures,
        &areas,
        &config,
    );

    // The creature-tier deny entry decides before the killer filter ever
    // gets a say.
    assert_eq!(decision, Decision::Skip(SkipReason::CreatureDenied));
}

#[test]
fn killer_filter_can_be_disabled() {
    let mut instance = setup_world();
    let mut engine = RespawnAdjustment::new();
    let creature = spawn(&mut instance, DUNGEON, 600);
    let config = ConfigSnapshot {
        killed_by_player_only: false,
        multiplier_global: 2.0,
        ..ConfigSnapshot::default()
    };

    let adjusted = kill_and_adjust(&mut instance, &mut engine, creature, None, &config);

    assert_eq!(adjusted, Some(Duration::from_secs(1200)));
}

#[test]
fn removal_tears_down_the_pristine_record() {
    let mut instance = setup_world();
    let mut engine = RespawnAdjustment::new();
    let creature = spawn(&mut instance, DUNGEON, 600);
    let config = ConfigSnapshot {
        multiplier_global: 2.0,
        ..ConfigSnapshot::default()
    };

    let adjusted = kill_and_adjust(&mut instance, &mut engine, creature, player_kill(), &config);
    assert_eq!(adjusted, Some(Duration::from_secs(1200)));
    assert!(engine.pristine_delay(creature).is_some());

    let mut events = Vec::new();
    world::apply(&mut instance, Command::RemoveCreature { creature }, &mut events);
    let creatures = query::creature_view(&instance);
    let areas = query::area_view(&instance);
    let mut commands = Vec::new();
    engine.handle(&events, &creatures, &areas, &config, &mut commands);

    assert!(commands.is_empty());
    assert_eq!(engine.pristine_delay(creature), None);
}

#[test]
fn adjustments_survive_a_config_swap_without_recapturing() {
    let mut instance = setup_world();
    let mut engine = RespawnAdjustment::new();
    let creature = spawn(&mut instance, DUNGEON, 600);
    let config = ConfigSnapshot {
        multiplier_global: 2.0,
        ..ConfigSnapshot::default()
    };

    let first = kill_and_adjust(&mut instance, &mut engine, creature, player_kill(), &config);
    assert_eq!(first, Some(Duration::from_secs(1200)));

    // Reload swaps the whole snapshot; the pristine record keeps the new
    // multiplier anchored to the original 600 s rather than the adjusted
    // 1200 s.
    let reloaded = ConfigSnapshot {
        multiplier_global: 3.0,
        ..ConfigSnapshot::default()
    };
    revive(&mut instance, 1200);
    let second = kill_and_adjust(&mut instance, &mut engine, creature, player_kill(), &reloaded);
    assert_eq!(second, Some(Duration::from_secs(1800)));
}
