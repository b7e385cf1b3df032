#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the respawn governor.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::collections::BTreeSet;
use std::time::Duration;

/// Canonical banner delivered to a newly connected player when the governor
/// is enabled and announcements are on.
pub const ANNOUNCE_BANNER: &str = "Respawn governor is active on this realm.";

/// Sentinel delay standing in for "never respawns": ten years in seconds.
///
/// A computed delay of zero selects this value directly, bypassing the
/// configured clamp bounds.
pub const RESPAWN_DISABLED_DELAY: Duration = Duration::from_secs(315_360_000);

/// Unique identifier assigned to a live creature entity by the world.
///
/// Identifiers are never reused within a world's lifetime, which makes them
/// safe keys for per-entity bookkeeping held outside the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CreatureId(u64);

impl CreatureId {
    /// Creates a new creature identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Template identifier shared by every creature stamped from the same entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CreatureTemplateId(u32);

impl CreatureTemplateId {
    /// Creates a new template identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Template identifier of an area or instanced map, distinct from the
/// identifiers of the creatures residing in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AreaId(u32);

impl AreaId {
    /// Creates a new area identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier assigned to a connected player session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Reference to a combat-capable unit involved in a death event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitRef {
    /// A player-controlled character.
    Player(PlayerId),
    /// A world-controlled creature.
    Creature(CreatureId),
}

impl UnitRef {
    /// Reports whether the referenced unit is a player-controlled character.
    #[must_use]
    pub const fn is_player(&self) -> bool {
        matches!(self, Self::Player(_))
    }

    /// Returns the creature identifier when the reference names a creature.
    #[must_use]
    pub const fn as_creature(&self) -> Option<CreatureId> {
        match self {
            Self::Creature(id) => Some(*id),
            Self::Player(_) => None,
        }
    }
}

/// Instance-type flags reported by the host for an area.
///
/// The flags mirror how the host tags its maps: a raid map also carries the
/// dungeon flag, so classification must test raid before treating the
/// dungeon flag as decisive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AreaFlags {
    /// The area is an instanced dungeon map.
    pub dungeon: bool,
    /// The area is an instanced raid map.
    pub raid: bool,
    /// The area is a battleground instance.
    pub battleground: bool,
    /// The area is a rated arena instance.
    pub arena: bool,
}

impl AreaFlags {
    /// Flags for an uninstanced open-world area.
    pub const WORLD: Self = Self {
        dungeon: false,
        raid: false,
        battleground: false,
        arena: false,
    };

    /// Flags for a party-sized dungeon instance.
    pub const DUNGEON: Self = Self {
        dungeon: true,
        raid: false,
        battleground: false,
        arena: false,
    };

    /// Flags for a raid instance. Raids are dungeons on the host, so both
    /// flags are set.
    pub const RAID: Self = Self {
        dungeon: true,
        raid: true,
        battleground: false,
        arena: false,
    };

    /// Flags for a battleground instance.
    pub const BATTLEGROUND: Self = Self {
        dungeon: false,
        raid: false,
        battleground: true,
        arena: false,
    };

    /// Flags for an arena instance.
    pub const ARENA: Self = Self {
        dungeon: false,
        raid: false,
        battleground: false,
        arena: true,
    };
}

/// Classification of the area a creature died in, derived from [`AreaFlags`]
/// at evaluation time and never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AreaKind {
    /// The area could not be resolved from the host.
    Unknown,
    /// Party-sized dungeon instance.
    Dungeon,
    /// Raid instance.
    Raid,
    /// Battleground instance.
    Battleground,
    /// Arena instance.
    Arena,
    /// Uninstanced open world.
    World,
}

/// Immutable set of resolved governor options, replaced wholesale whenever
/// configuration is loaded.
///
/// The snapshot is pure data: the loader in the `config` crate produces it,
/// systems only read it. Passing the snapshot explicitly into every
/// evaluation keeps reloads atomic with respect to in-flight decisions.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigSnapshot {
    /// Master switch; when false every death event is ignored.
    pub enabled: bool,
    /// Whether newly connected players receive the informational banner.
    pub announce_on_login: bool,
    /// Whether deaths inside dungeon instances are eligible.
    pub enable_dungeons: bool,
    /// Whether deaths inside raid instances are eligible.
    pub enable_raids: bool,
    /// Whether deaths in the open world are eligible.
    pub enable_world: bool,
    /// Multiplier applied to every eligible delay regardless of area.
    pub multiplier_global: f32,
    /// Additional multiplier for deaths in dungeon instances.
    pub multiplier_dungeon: f32,
    /// Additional multiplier for deaths in raid instances.
    pub multiplier_raid: f32,
    /// Additional multiplier for deaths in the open world.
    pub multiplier_world: f32,
    /// Creatures whose observed delay is below this are never touched.
    pub original_delay_min: Duration,
    /// Lower clamp bound applied to a computed delay.
    pub adjusted_delay_min: Duration,
    /// Upper clamp bound applied to a computed delay.
    pub adjusted_delay_max: Duration,
    /// When set, kills without a player-controlled killer are ignored.
    pub killed_by_player_only: bool,
    /// Areas whose deaths bypass the area-type gate.
    pub always_instances: BTreeSet<AreaId>,
    /// Areas whose deaths are never adjusted, overriding everything else.
    pub never_instances: BTreeSet<AreaId>,
    /// Creature templates adjusted unconditionally, bypassing the killer
    /// and bounds checks.
    pub always_creatures: BTreeSet<CreatureTemplateId>,
    /// Creature templates never adjusted, overriding the always list.
    pub never_creatures: BTreeSet<CreatureTemplateId>,
}

impl ConfigSnapshot {
    /// Selects the per-area multiplier for the provided classification.
    ///
    /// Classifications without a dedicated multiplier resolve to 1.0.
    #[must_use]
    pub fn area_multiplier(&self, kind: AreaKind) -> f32 {
        match kind {
            AreaKind::Dungeon => self.multiplier_dungeon,
            AreaKind::Raid => self.multiplier_raid,
            AreaKind::World => self.multiplier_world,
            AreaKind::Unknown | AreaKind::Battleground | AreaKind::Arena => 1.0,
        }
    }
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            enabled: true,
            announce_on_login: true,
            enable_dungeons: true,
            enable_raids: true,
            enable_world: false,
            multiplier_global: 1.0,
            multiplier_dungeon: 1.0,
            multiplier_raid: 1.0,
            multiplier_world: 1.0,
            original_delay_min: Duration::from_secs(300),
            adjusted_delay_min: Duration::from_secs(300),
            adjusted_delay_max: Duration::from_secs(86_400),
            killed_by_player_only: true,
            always_instances: BTreeSet::new(),
            never_instances: BTreeSet::new(),
            always_creatures: BTreeSet::new(),
            never_creatures: BTreeSet::new(),
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Registers an area together with its host instance-type flags.
    RegisterArea {
        /// Template identifier of the area being registered.
        area: AreaId,
        /// Instance-type flags reported by the host for the area.
        flags: AreaFlags,
    },
    /// Requests that a creature be spawned into a registered area.
    SpawnCreature {
        /// Template the creature is stamped from.
        template: CreatureTemplateId,
        /// Area the creature resides in.
        area: AreaId,
        /// Configured delay between the creature's death and its respawn.
        respawn_delay: Duration,
    },
    /// Connects a new player session to the world.
    ConnectPlayer,
    /// Reports that a unit was brought to zero health.
    KillUnit {
        /// Unit that died.
        victim: UnitRef,
        /// Unit credited with the kill, when one exists.
        killer: Option<UnitRef>,
    },
    /// Requests that a creature's respawn delay be replaced.
    AdjustRespawnDelay {
        /// Creature whose delay is being replaced.
        creature: CreatureId,
        /// New configured delay, also applied to the pending respawn.
        delay: Duration,
    },
    /// Removes a creature entity from the world entirely.
    RemoveCreature {
        /// Creature being removed.
        creature: CreatureId,
    },
    /// Delivers an informational line to a player's session.
    DeliverSystemMessage {
        /// Player receiving the message.
        player: PlayerId,
        /// Message text to deliver.
        text: String,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that an area was registered.
    AreaRegistered {
        /// Template identifier of the registered area.
        area: AreaId,
    },
    /// Confirms that a creature entered the world.
    CreatureSpawned {
        /// Identifier allocated to the creature by the world.
        creature: CreatureId,
        /// Template the creature was stamped from.
        template: CreatureTemplateId,
        /// Area the creature resides in.
        area: AreaId,
    },
    /// Confirms that a player session connected.
    PlayerConnected {
        /// Identifier allocated to the player session.
        player: PlayerId,
    },
    /// Announces that a unit died, together with kill attribution.
    UnitDied {
        /// Unit that died.
        victim: UnitRef,
        /// Unit credited with the kill, when one exists.
        killer: Option<UnitRef>,
    },
    /// Confirms that a creature's respawn delay was replaced.
    RespawnDelayAdjusted {
        /// Creature whose delay changed.
        creature: CreatureId,
        /// Configured delay before the adjustment.
        from: Duration,
        /// Configured delay after the adjustment.
        to: Duration,
    },
    /// Announces that a creature entity left the world for good.
    ///
    /// Systems holding per-creature bookkeeping must discard their entries
    /// when this event arrives.
    CreatureRemoved {
        /// Creature that was removed.
        creature: CreatureId,
    },
    /// Announces that a dead creature reappeared after its delay elapsed.
    CreatureRespawned {
        /// Creature that respawned.
        creature: CreatureId,
    },
    /// Confirms that an informational line reached a player's session.
    SystemMessageDelivered {
        /// Player the message was delivered to.
        player: PlayerId,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
}

/// Immutable representation of a single creature's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreatureSnapshot {
    /// Identifier allocated to the creature by the world.
    pub id: CreatureId,
    /// Template the creature was stamped from.
    pub template: CreatureTemplateId,
    /// Area the creature resides in.
    pub area: AreaId,
    /// Currently configured delay between death and respawn.
    pub respawn_delay: Duration,
    /// Whether the creature is currently alive.
    pub alive: bool,
}

/// Read-only snapshot describing all creatures within the world.
#[derive(Clone, Debug, Default)]
pub struct CreatureView {
    snapshots: Vec<CreatureSnapshot>,
}

impl CreatureView {
    /// Creates a new creature view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<CreatureSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Looks up a creature snapshot by identifier.
    #[must_use]
    pub fn get(&self, creature: CreatureId) -> Option<&CreatureSnapshot> {
        self.snapshots
            .binary_search_by_key(&creature, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Iterator over the captured creature snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &CreatureSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CreatureSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single area's identity and flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AreaSnapshot {
    /// Template identifier of the area.
    pub id: AreaId,
    /// Instance-type flags reported by the host.
    pub flags: AreaFlags,
}

/// Read-only snapshot describing all areas known to the world.
#[derive(Clone, Debug, Default)]
pub struct AreaView {
    snapshots: Vec<AreaSnapshot>,
}

impl AreaView {
    /// Creates a new area view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AreaSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Looks up an area snapshot by identifier.
    #[must_use]
    pub fn get(&self, area: AreaId) -> Option<&AreaSnapshot> {
        self.snapshots
            .binary_search_by_key(&area, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Iterator over the captured area snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &AreaSnapshot> {
        self.snapshots.iter()
    }
}
