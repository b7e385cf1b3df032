#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Decision-and-adjustment engine for creature respawn delays.
//!
//! The engine consumes death events together with immutable world views and
//! a [`ConfigSnapshot`], decides per event whether the dead creature's
//! respawn delay should change, and emits [`Command::AdjustRespawnDelay`]
//! for the world to execute. It owns the per-creature pristine-delay table
//! that keeps repeated deaths of the same entity from compounding the
//! multipliers, and tears entries down when the world removes the entity.
//!
//! The engine is infallible: every disqualifying input maps to a
//! [`SkipReason`], never an error, and nothing in here touches the host
//! directly.

use std::collections::HashMap;
use std::time::Duration;

use respawn_governor_core::{
    AreaKind, AreaSnapshot, AreaView, Command, ConfigSnapshot, CreatureId, CreatureSnapshot,
    CreatureView, Event, UnitRef, RESPAWN_DISABLED_DELAY,
};
use tracing::debug;

/// Classifies the area a creature died in from host instance-type flags.
///
/// Precedence, first match wins: unresolved areas are `Unknown`, the raid
/// flag beats the dungeon flag (raids carry both), battleground beats arena,
/// and anything uninstanced is `World`.
#[must_use]
pub fn classify(area: Option<&AreaSnapshot>) -> AreaKind {
    let Some(area) = area else {
        return AreaKind::Unknown;
    };
    if area.flags.dungeon && !area.flags.raid {
        AreaKind::Dungeon
    } else if area.flags.raid {
        AreaKind::Raid
    } else if area.flags.battleground {
        AreaKind::Battleground
    } else if area.flags.arena {
        AreaKind::Arena
    } else {
        AreaKind::World
    }
}

/// Outcome of evaluating a single death event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Replace the creature's respawn delay with the provided value.
    Adjust {
        /// Computed and clamped delay ready to hand to the world.
        delay: Duration,
    },
    /// Leave the creature untouched.
    Skip(SkipReason),
}

/// Why a death event produced no adjustment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The governor is disabled outright.
    Disabled,
    /// The victim was a player rather than a creature.
    VictimNotCreature,
    /// The victim is unknown to the world, typically already removed.
    VictimMissing,
    /// The creature's area is on the never-adjust instance list.
    AreaDenied,
    /// The area classification is not enabled for adjustments.
    AreaTypeDisabled,
    /// The creature's template is on the never-adjust creature list.
    CreatureDenied,
    /// Kill attribution filtering is on and no player landed the kill.
    KillerNotPlayer,
    /// The creature does not respawn at all.
    NoRespawnDelay,
    /// The observed delay is below the configured original minimum.
    DelayBelowOriginalMin,
    /// The observed delay is above the configured adjusted maximum.
    DelayAboveAdjustedMax,
}

/// Stateful engine deciding whether and how to adjust respawn delays.
///
/// One instance serves the whole world. The pristine-delay table is keyed by
/// [`CreatureId`]; an entry exists exactly when the creature has been through
/// the calculator at least once, and its value is never overwritten
/// afterwards.
#[derive(Debug, Default)]
pub struct RespawnAdjustment {
    pristine: HashMap<CreatureId, Duration>,
}

impl RespawnAdjustment {
    /// Creates a new engine with an empty pristine-delay table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes events and immutable views to emit adjustment commands.
    ///
    /// Each death event yields at most one [`Command::AdjustRespawnDelay`].
    /// Removal events tear down the matching pristine-delay entry so the
    /// table never outlives the entities it describes.
    pub fn handle(
        &mut self,
        events: &[Event],
        creatures: &CreatureView,
        areas: &AreaView,
        config: &ConfigSnapshot,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::UnitDied { victim, killer } => {
                    let decision = self.evaluate(*victim, *killer, creatures, areas, config);
                    match (decision, victim.as_creature()) {
                        (Decision::Adjust { delay }, Some(creature)) => {
                            debug!(
                                creature = creature.get(),
                                delay_secs = delay.as_secs(),
                                "respawn delay adjusted"
                            );
                            out.push(Command::AdjustRespawnDelay { creature, delay });
                        }
                        (decision, _) => {
                            debug!(?decision, "death event left unadjusted");
                        }
                    }
                }
                Event::CreatureRemoved { creature } => {
                    let _ = self.pristine.remove(creature);
                }
                _ => {}
            }
        }
    }

    /// Runs the filter chain for a single death event and, when it passes,
    /// computes the clamped replacement delay.
    ///
    /// The chain is evaluated in strict order; each tier may short-circuit.
    /// The area-tier never list overrides everything downstream, while the
    /// creature-tier always list is absolute and bypasses even the
    /// kill-attribution and bounds checks.
    pub fn evaluate(
        &mut self,
        victim: UnitRef,
        killer: Option<UnitRef>,
        creatures: &CreatureView,
        areas: &AreaView,
        config: &ConfigSnapshot,
    ) -> Decision {
        if !config.enabled {
            return Decision::Skip(SkipReason::Disabled);
        }

        let Some(id) = victim.as_creature() else {
            return Decision::Skip(SkipReason::VictimNotCreature);
        };
        let Some(creature) = creatures.get(id) else {
            return Decision::Skip(SkipReason::VictimMissing);
        };

        if config.never_instances.contains(&creature.area) {
            return Decision::Skip(SkipReason::AreaDenied);
        }

        let kind = classify(areas.get(creature.area));
        if !config.always_instances.contains(&creature.area) {
            let gate_open = match kind {
                AreaKind::Dungeon => config.enable_dungeons,
                AreaKind::Raid => config.enable_raids,
                AreaKind::World => config.enable_world,
                AreaKind::Unknown | AreaKind::Battleground | AreaKind::Arena => false,
            };
            if !gate_open {
                return Decision::Skip(SkipReason::AreaTypeDisabled);
            }
        }

        if config.never_creatures.contains(&creature.template) {
            return Decision::Skip(SkipReason::CreatureDenied);
        }

        if !config.always_creatures.contains(&creature.template) {
            if config.killed_by_player_only && killer.map_or(true, |unit| !unit.is_player()) {
                return Decision::Skip(SkipReason::KillerNotPlayer);
            }

            let current = creature.respawn_delay;
            if current.is_zero() {
                return Decision::Skip(SkipReason::NoRespawnDelay);
            }
            if current < config.original_delay_min {
                return Decision::Skip(SkipReason::DelayBelowOriginalMin);
            }
            if current > config.adjusted_delay_max {
                return Decision::Skip(SkipReason::DelayAboveAdjustedMax);
            }
        }

        Decision::Adjust {
            delay: self.compute_delay(creature, kind, config),
        }
    }

    /// Pristine delay captured for the creature, when one has been recorded.
    #[must_use]
    pub fn pristine_delay(&self, creature: CreatureId) -> Option<Duration> {
        self.pristine.get(&creature).copied()
    }

    fn compute_delay(
        &mut self,
        creature: &CreatureSnapshot,
        kind: AreaKind,
        config: &ConfigSnapshot,
    ) -> Duration {
        // First-touch capture: all later evaluations reuse the stored value,
        // so repeated deaths never stack the multipliers.
        let pristine = *self
            .pristine
            .entry(creature.id)
            .or_insert(creature.respawn_delay);

        let multiplier =
            f64::from(config.multiplier_global) * f64::from(config.area_multiplier(kind));
        let computed = (pristine.as_secs() as f64 * multiplier) as u64;

        debug!(
            creature = creature.id.get(),
            template = creature.template.get(),
            area_kind = ?kind,
            pristine_secs = pristine.as_secs(),
            multiplier,
            computed_secs = computed,
            "computed replacement respawn delay"
        );

        if computed == 0 {
            // A zero product means "stop respawning entirely", which the
            // sentinel expresses without consulting the clamp bounds.
            return RESPAWN_DISABLED_DELAY;
        }

        let min = config.adjusted_delay_min.as_secs();
        let max = config.adjusted_delay_max.as_secs();
        Duration::from_secs(computed.min(max).max(min))
    }
}
