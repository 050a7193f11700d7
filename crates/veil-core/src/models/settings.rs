use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{CHARACTER_PREFIX, GROUP_PREFIX, SETTINGS_SCHEMA_VERSION};

/// Clamp any JSON number to a non-negative whole count.
pub(crate) fn clamp_to_count(value: f64) -> usize {
    if value.is_finite() && value > 0.0 {
        value.trunc() as usize
    } else {
        0
    }
}

fn deserialize_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?
        .map(clamp_to_count)
        .unwrap_or(0))
}

// =============================================================================
// EntityId
// =============================================================================

/// Stable key of a character (`character-<avatar>`) or group (`group-<id>`) scope.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn character(avatar: &str) -> Self {
        Self(format!("{}{}", CHARACTER_PREFIX, avatar))
    }

    pub fn group(group_id: &str) -> Self {
        Self(format!("{}{}", GROUP_PREFIX, group_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An id as it appears as a key in the persisted blob.
    pub fn from_key(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Per-scope records
// =============================================================================

/// Settings and replay progress for one entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySettings {
    #[serde(default, deserialize_with = "deserialize_count")]
    pub hide_last_n: usize,
    #[serde(default)]
    pub user_configured: bool,
    /// Log length at which this entity's window was last applied.
    #[serde(default, deserialize_with = "deserialize_count")]
    pub last_processed_length: usize,
}

/// The shared setting used in global mode. Progress is still tracked per entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalHideSettings {
    #[serde(default, deserialize_with = "deserialize_count")]
    pub hide_last_n: usize,
    #[serde(default)]
    pub user_configured: bool,
}

/// What the engine needs to know about the active scope's configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EffectiveSettings {
    pub hide_last_n: usize,
    pub user_configured: bool,
}

impl From<&EntitySettings> for EffectiveSettings {
    fn from(settings: &EntitySettings) -> Self {
        Self {
            hide_last_n: settings.hide_last_n,
            user_configured: settings.user_configured,
        }
    }
}

impl From<&GlobalHideSettings> for EffectiveSettings {
    fn from(settings: &GlobalHideSettings) -> Self {
        Self {
            hide_last_n: settings.hide_last_n,
            user_configured: settings.user_configured,
        }
    }
}

// =============================================================================
// RootSettings
// =============================================================================

/// Which record drives the visibility window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// One record per character or group.
    #[default]
    Chat,
    /// One shared record for every scope.
    Global,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Chat => f.write_str("chat"),
            Mode::Global => f.write_str("global"),
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(Mode::Chat),
            "global" => Ok(Mode::Global),
            other => Err(format!("unknown mode `{}` (expected chat or global)", other)),
        }
    }
}

/// The whole persisted blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RootSettings {
    pub schema_version: u32,
    pub enabled: bool,
    pub mode: Mode,
    pub global_hide_settings: GlobalHideSettings,
    #[serde(rename = "settings_by_entity")]
    pub settings_by_entity: BTreeMap<EntityId, EntitySettings>,
    pub migration_complete: bool,
}

impl Default for RootSettings {
    fn default() -> Self {
        Self {
            schema_version: SETTINGS_SCHEMA_VERSION,
            enabled: true,
            mode: Mode::Chat,
            global_hide_settings: GlobalHideSettings::default(),
            settings_by_entity: BTreeMap::new(),
            migration_complete: false,
        }
    }
}
