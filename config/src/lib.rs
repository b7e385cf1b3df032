#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Configuration loading for the respawn governor.
//!
//! The loader deserializes a TOML document into raw option tables, applies
//! the documented defaults for absent keys, parses the space-delimited ID
//! lists, validates, and produces one complete
//! [`ConfigSnapshot`] atomically. Callers swap the whole snapshot on reload,
//! so systems never observe a partially applied configuration. Every
//! malformed input is a load-time error here, never an engine-time concern.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use respawn_governor_core::{AreaId, ConfigSnapshot, CreatureTemplateId};
use serde::Deserialize;
use thiserror::Error;

/// Errors surfaced while loading or validating a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    /// The document is not valid TOML or carries mistyped keys.
    #[error("failed to parse configuration document: {0}")]
    Parse(#[from] toml::de::Error),
    /// An ID list entry is not an unsigned integer.
    #[error("invalid entry {token:?} in id list `{list}`")]
    InvalidIdList {
        /// Configuration key of the offending list.
        list: &'static str,
        /// Token that failed to parse.
        token: String,
    },
    /// A multiplier was configured below zero.
    #[error("multiplier `{name}` must not be negative, got {value}")]
    NegativeMultiplier {
        /// Configuration key of the offending multiplier.
        name: &'static str,
        /// Rejected value.
        value: f32,
    },
    /// The adjusted clamp bounds are inverted.
    #[error("adjusted delay bounds are inverted: min {min_secs} s exceeds max {max_secs} s")]
    InvertedAdjustedBounds {
        /// Configured lower bound, in seconds.
        min_secs: u64,
        /// Configured upper bound, in seconds.
        max_secs: u64,
    },
}

/// Reads, parses, and validates a configuration file from disk.
pub fn load_path(path: &Path) -> Result<ConfigSnapshot, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}

/// Parses and validates a configuration document.
///
/// An empty document resolves to exactly [`ConfigSnapshot::default`].
pub fn parse(text: &str) -> Result<ConfigSnapshot, ConfigError> {
    let raw: RawConfig = toml::from_str(text)?;
    raw.resolve()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    enabled: Option<bool>,
    announce_on_login: Option<bool>,
    areas: RawAreas,
    multipliers: RawMultipliers,
    delays: RawDelays,
    filters: RawFilters,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawAreas {
    dungeons: Option<bool>,
    raids: Option<bool>,
    world: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawMultipliers {
    global: Option<f32>,
    dungeon: Option<f32>,
    raid: Option<f32>,
    world: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawDelays {
    original_min_secs: Option<u64>,
    adjusted_min_secs: Option<u64>,
    adjusted_max_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawFilters {
    killed_by_player_only: Option<bool>,
    always_instances: Option<String>,
    never_instances: Option<String>,
    always_creatures: Option<String>,
    never_creatures: Option<String>,
}

impl RawConfig {
    fn resolve(self) -> Result<ConfigSnapshot, ConfigError> {
        let defaults = ConfigSnapshot::default();
        let snapshot = ConfigSnapshot {
            enabled: self.enabled.unwrap_or(defaults.enabled),
            announce_on_login: self.announce_on_login.unwrap_or(defaults.announce_on_login),
            enable_dungeons: self.areas.dungeons.unwrap_or(defaults.enable_dungeons),
            enable_raids: self.areas.raids.unwrap_or(defaults.enable_raids),
            enable_world: self.areas.world.unwrap_or(defaults.enable_world),
            multiplier_global: self.multipliers.global.unwrap_or(defaults.multiplier_global),
            multiplier_dungeon: self
                .multipliers
                .dungeon
                .unwrap_or(defaults.multiplier_dungeon),
            multiplier_raid: self.multipliers.raid.unwrap_or(defaults.multiplier_raid),
            multiplier_world: self.multipliers.world.unwrap_or(defaults.multiplier_world),
            original_delay_min: seconds_or(self.delays.original_min_secs, defaults.original_delay_min),
            adjusted_delay_min: seconds_or(self.delays.adjusted_min_secs, defaults.adjusted_delay_min),
            adjusted_delay_max: seconds_or(self.delays.adjusted_max_secs, defaults.adjusted_delay_max),
            killed_by_player_only: self
                .filters
                .killed_by_player_only
                .unwrap_or(defaults.killed_by_player_only),
            always_instances: area_set("filters.always_instances", self.filters.always_instances)?,
            never_instances: area_set("filters.never_instances", self.filters.never_instances)?,
            always_creatures: template_set(
                "filters.always_creatures",
                self.filters.always_creatures,
            )?,
            never_creatures: template_set("filters.never_creatures", self.filters.never_creatures)?,
        };

        for (name, value) in [
            ("multipliers.global", snapshot.multiplier_global),
            ("multipliers.dungeon", snapshot.multiplier_dungeon),
            ("multipliers.raid", snapshot.multiplier_raid),
            ("multipliers.world", snapshot.multiplier_world),
        ] {
            if value < 0.0 {
                return Err(ConfigError::NegativeMultiplier { name, value });
            }
        }

        if snapshot.adjusted_delay_min > snapshot.adjusted_delay_max {
            return Err(ConfigError::InvertedAdjustedBounds {
                min_secs: snapshot.adjusted_delay_min.as_secs(),
                max_secs: snapshot.adjusted_delay_max.as_secs(),
            });
        }

        Ok(snapshot)
    }
}

fn seconds_or(value: Option<u64>, fallback: Duration) -> Duration {
    value.map_or(fallback, Duration::from_secs)
}

fn area_set(
    list: &'static str,
    text: Option<String>,
) -> Result<BTreeSet<AreaId>, ConfigError> {
    Ok(id_list(list, text)?.into_iter().map(AreaId::new).collect())
}

fn template_set(
    list: &'static str,
    text: Option<String>,
) -> Result<BTreeSet<CreatureTemplateId>, ConfigError> {
    Ok(id_list(list, text)?
        .into_iter()
        .map(CreatureTemplateId::new)
        .collect())
}

/// Parses a space-delimited list of unsigned numeric identifiers.
fn id_list(list: &'static str, text: Option<String>) -> Result<BTreeSet<u32>, ConfigError> {
    let mut ids = BTreeSet::new();
    let Some(text) = text else {
        return Ok(ids);
    };
    for token in text.split_whitespace() {
        let value: u32 = token.parse().map_err(|_| ConfigError::InvalidIdList {
            list,
            token: token.to_string(),
        })?;
        let _ = ids.insert(value);
    }
    Ok(ids)
}
