//! Shared constants
//!
//! Keys and defaults that both the persisted blob and the host adapters rely on.

/// Name the settings blob is stored under inside the host's extension settings.
pub const EXTENSION_NAME: &str = "hide_1";

/// Entity id prefixes.
pub const CHARACTER_PREFIX: &str = "character-";
pub const GROUP_PREFIX: &str = "group-";

/// Current schema version of the persisted settings blob.
///
/// Version 1 is the first layout (`useGlobalSettings`, `migration_v1_complete`).
pub const SETTINGS_SCHEMA_VERSION: u32 = 2;

/// Coalescing window for full reconciliation triggers.
pub const FULL_CHECK_DEBOUNCE_MS: u64 = 200;

/// Delay before an incremental pass after a new message arrives.
pub const INCREMENTAL_DELAY_MS: u64 = 50;

/// Coalescing window for settings persistence.
pub const PERSIST_DEBOUNCE_MS: u64 = 1000;

// File names inside the data directory
pub mod files {
    pub const SETTINGS: &str = "settings.json";
    pub const CHARACTERS: &str = "characters.json";
    pub const GROUPS: &str = "groups.json";
}

// Legacy locations of per-entity settings
pub mod legacy {
    /// Key under `character.data.extensions`
    pub const CHARACTER_KEY: &str = "hideHelperSettings";
    /// Key under `group.data`
    pub const GROUP_KEY: &str = "hideHelperSettings";
}
