//! Owner of the persisted settings blob.
//!
//! Every mutation bumps `revision`; the runtime watches it to arm a debounced persist,
//! so nothing here writes synchronously except an explicit [`SettingsStore::persist`].
//!
//! # Schema upgrades
//! `load` accepts any older blob: keys missing from the stored value are filled from
//! the defaults (recursively for objects) without touching keys that are present, and
//! the version-1 keys `useGlobalSettings` and `migration_v1_complete` are rewritten
//! to `mode` and `migrationComplete`.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::backend::SettingsBackend;
use crate::constants::SETTINGS_SCHEMA_VERSION;
use crate::error::VeilError;
use crate::models::settings::clamp_to_count;
use crate::models::{EntityId, EntitySettings, GlobalHideSettings, Mode, RootSettings};

/// Partial update of an entity record. `None` leaves a field as is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityPatch {
    pub hide_last_n: Option<usize>,
    pub user_configured: Option<bool>,
    pub last_processed_length: Option<usize>,
}

impl EntityPatch {
    pub fn progress(length: usize) -> Self {
        Self {
            last_processed_length: Some(length),
            ..Self::default()
        }
    }

    pub fn hide_last_n(mut self, n: usize) -> Self {
        self.hide_last_n = Some(n);
        self
    }

    pub fn user_configured(mut self, configured: bool) -> Self {
        self.user_configured = Some(configured);
        self
    }

    fn apply(&self, settings: &mut EntitySettings) {
        if let Some(n) = self.hide_last_n {
            settings.hide_last_n = n;
        }
        if let Some(configured) = self.user_configured {
            settings.user_configured = configured;
        }
        if let Some(length) = self.last_processed_length {
            settings.last_processed_length = length;
        }
    }
}

pub struct SettingsStore {
    settings: RootSettings,
    backend: Box<dyn SettingsBackend>,
    revision: u64,
    persisted_revision: u64,
}

impl SettingsStore {
    /// Load the blob, creating defaults if absent and upgrading older layouts.
    ///
    /// Fields are decoded one at a time: a malformed value falls back to its default
    /// and a malformed entity record is dropped, without discarding the rest. A blob
    /// that cannot be read at all is replaced by defaults in memory; it is only
    /// overwritten once something mutates the store.
    pub fn load(backend: Box<dyn SettingsBackend>) -> Self {
        let settings = match backend.read() {
            Ok(Some(blob)) => decode_settings(upgrade_blob(blob)),
            Ok(None) => {
                tracing::info!("No stored settings, starting from defaults");
                RootSettings::default()
            }
            Err(e) => {
                tracing::error!("Failed to read settings, using defaults: {}", e);
                RootSettings::default()
            }
        };

        Self {
            settings,
            backend,
            revision: 0,
            persisted_revision: 0,
        }
    }

    pub fn settings(&self) -> &RootSettings {
        &self.settings
    }

    pub fn get(&self, entity_id: &EntityId) -> Option<&EntitySettings> {
        self.settings.settings_by_entity.get(entity_id)
    }

    pub fn contains(&self, entity_id: &EntityId) -> bool {
        self.settings.settings_by_entity.contains_key(entity_id)
    }

    // ===== Mutation Methods =====

    /// Apply a patch to an entity, creating the record from defaults if needed.
    pub fn set_entity(&mut self, entity_id: &EntityId, patch: EntityPatch) {
        let current = self.get(entity_id).copied();
        let mut updated = current.unwrap_or_default();
        patch.apply(&mut updated);
        if current != Some(updated) {
            self.settings
                .settings_by_entity
                .insert(entity_id.clone(), updated);
            self.touch();
        }
    }

    /// Insert a record only if the entity has none. Returns whether it was inserted.
    pub fn insert_entity_if_absent(&mut self, entity_id: &EntityId, settings: EntitySettings) -> bool {
        if self.contains(entity_id) {
            return false;
        }
        self.settings
            .settings_by_entity
            .insert(entity_id.clone(), settings);
        self.touch();
        true
    }

    pub fn set_global(&mut self, hide_last_n: Option<usize>, user_configured: Option<bool>) {
        let mut updated: GlobalHideSettings = self.settings.global_hide_settings;
        if let Some(n) = hide_last_n {
            updated.hide_last_n = n;
        }
        if let Some(configured) = user_configured {
            updated.user_configured = configured;
        }
        if updated != self.settings.global_hide_settings {
            self.settings.global_hide_settings = updated;
            self.touch();
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.settings.enabled != enabled {
            self.settings.enabled = enabled;
            self.touch();
        }
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.settings.mode != mode {
            self.settings.mode = mode;
            self.touch();
        }
    }

    /// Record that migration ran. Always counts as a mutation so the flag gets persisted.
    pub fn mark_migration_complete(&mut self) {
        self.settings.migration_complete = true;
        self.touch();
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    // ===== Persistence =====

    /// Bumped by every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_dirty(&self) -> bool {
        self.revision != self.persisted_revision
    }

    /// Write the current blob. On failure the store stays dirty so a later attempt retries.
    pub fn persist(&mut self) -> Result<(), VeilError> {
        let blob = serde_json::to_value(&self.settings)?;
        self.backend.write(&blob)?;
        self.persisted_revision = self.revision;
        tracing::debug!(revision = self.revision, "Settings persisted");
        Ok(())
    }
}

/// Bring any stored blob up to the current layout.
fn upgrade_blob(blob: Value) -> Value {
    let Value::Object(mut object) = blob else {
        tracing::warn!("Stored settings are not an object, replacing with defaults");
        return defaults_value();
    };

    if let Some(use_global) = object.remove("useGlobalSettings") {
        if !object.contains_key("mode") {
            let mode = if use_global.as_bool() == Some(true) {
                Mode::Global
            } else {
                Mode::Chat
            };
            object.insert("mode".to_string(), Value::String(mode.to_string()));
        }
    }

    if let Some(complete) = object.remove("migration_v1_complete") {
        object.entry("migrationComplete").or_insert(complete);
    }

    if let Some(Value::Object(global)) = object.get_mut("globalHideSettings") {
        global.remove("lastProcessedLength");
    }

    if let Value::Object(defaults) = defaults_value() {
        merge_missing(&mut object, &defaults);
    }
    object.insert(
        "schemaVersion".to_string(),
        Value::from(SETTINGS_SCHEMA_VERSION),
    );
    Value::Object(object)
}

/// Insert keys from `defaults` that `target` lacks; recurse where both sides are objects.
fn merge_missing(target: &mut Map<String, Value>, defaults: &Map<String, Value>) {
    for (key, default) in defaults {
        if !target.contains_key(key) {
            target.insert(key.clone(), default.clone());
            continue;
        }
        if let (Some(Value::Object(present)), Value::Object(nested)) = (target.get_mut(key), default) {
            merge_missing(present, nested);
        }
    }
}

/// Build settings from an upgraded blob, one field at a time.
fn decode_settings(blob: Value) -> RootSettings {
    let defaults = RootSettings::default();
    let Value::Object(object) = blob else {
        return defaults;
    };

    let mode = match object.get("mode") {
        Some(Value::String(mode)) => mode.parse::<Mode>().unwrap_or_else(|e: String| {
            tracing::warn!("Ignoring stored mode: {}", e);
            defaults.mode
        }),
        None | Some(Value::Null) => defaults.mode,
        Some(other) => {
            tracing::warn!(value = %other, "Ignoring malformed stored mode");
            defaults.mode
        }
    };

    let global_hide_settings = match object.get("globalHideSettings") {
        Some(Value::Object(global)) => GlobalHideSettings {
            hide_last_n: field_count(global, "hideLastN"),
            user_configured: field_bool(global, "userConfigured", false),
        },
        _ => {
            tracing::warn!("Ignoring malformed globalHideSettings");
            defaults.global_hide_settings
        }
    };

    let mut settings_by_entity = BTreeMap::new();
    match object.get("settings_by_entity") {
        Some(Value::Object(records)) => {
            for (key, record) in records {
                match decode_entity(record) {
                    Some(settings) => {
                        settings_by_entity.insert(EntityId::from_key(key), settings);
                    }
                    None => tracing::warn!(entity = %key, "Dropping malformed entity settings"),
                }
            }
        }
        _ => tracing::warn!("Ignoring malformed settings_by_entity"),
    }

    RootSettings {
        schema_version: SETTINGS_SCHEMA_VERSION,
        enabled: field_bool(&object, "enabled", defaults.enabled),
        mode,
        global_hide_settings,
        settings_by_entity,
        migration_complete: field_bool(&object, "migrationComplete", defaults.migration_complete),
    }
}

fn decode_entity(record: &Value) -> Option<EntitySettings> {
    let Value::Object(record) = record else {
        return None;
    };
    Some(EntitySettings {
        hide_last_n: field_count(record, "hideLastN"),
        user_configured: field_bool(record, "userConfigured", false),
        last_processed_length: field_count(record, "lastProcessedLength"),
    })
}

/// Booleans, or the strings `"true"`/`"false"`. Anything else keeps the default.
fn field_bool(object: &Map<String, Value>, key: &str, default: bool) -> bool {
    match object.get(key) {
        None | Some(Value::Null) => default,
        Some(Value::Bool(value)) => *value,
        Some(Value::String(value)) if value == "true" || value == "false" => value == "true",
        Some(other) => {
            tracing::warn!(key, value = %other, "Ignoring malformed setting");
            default
        }
    }
}

/// Non-negative whole count; anything that is not a number reads as 0.
fn field_count(object: &Map<String, Value>, key: &str) -> usize {
    match object.get(key) {
        None | Some(Value::Null) => 0,
        Some(value) => match value.as_f64() {
            Some(number) => clamp_to_count(number),
            None => {
                tracing::warn!(key, value = %value, "Ignoring malformed count");
                0
            }
        },
    }
}

fn defaults_value() -> Value {
    serde_json::to_value(RootSettings::default()).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;
    use serde_json::json;

    fn make_store(blob: Option<Value>) -> (SettingsStore, MemoryBackend) {
        let backend = match blob {
            Some(blob) => MemoryBackend::with_blob(blob),
            None => MemoryBackend::new(),
        };
        (SettingsStore::load(Box::new(backend.clone())), backend)
    }

    #[test]
    fn test_load_defaults_when_absent() {
        let (store, _) = make_store(None);
        assert_eq!(store.settings(), &RootSettings::default());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_load_fills_missing_keys_without_overwriting() {
        let (store, _) = make_store(Some(json!({
            "enabled": false,
            "globalHideSettings": {"hideLastN": 7}
        })));
        let settings = store.settings();
        assert!(!settings.enabled);
        assert_eq!(settings.mode, Mode::Chat);
        assert_eq!(settings.global_hide_settings.hide_last_n, 7);
        assert!(!settings.global_hide_settings.user_configured);
        assert!(!settings.migration_complete);
        assert_eq!(settings.schema_version, SETTINGS_SCHEMA_VERSION);
    }

    #[test]
    fn test_load_upgrades_version_one_blob() {
        let (store, _) = make_store(Some(json!({
            "enabled": true,
            "useGlobalSettings": true,
            "migration_v1_complete": true,
            "globalHideSettings": {"hideLastN": 3, "lastProcessedLength": 20, "userConfigured": true},
            "settings_by_entity": {
                "character-a.png": {"hideLastN": 2, "lastProcessedLength": 9, "userConfigured": true}
            }
        })));
        let settings = store.settings();
        assert_eq!(settings.mode, Mode::Global);
        assert!(settings.migration_complete);
        assert_eq!(settings.global_hide_settings.hide_last_n, 3);
        let entity = store.get(&EntityId::character("a.png")).unwrap();
        assert_eq!(entity.last_processed_length, 9);
    }

    #[test]
    fn test_load_keeps_explicit_mode_over_legacy_flag() {
        let (store, _) = make_store(Some(json!({"mode": "chat", "useGlobalSettings": true})));
        assert_eq!(store.settings().mode, Mode::Chat);
    }

    #[test]
    fn test_load_non_object_blob_uses_defaults() {
        let (store, _) = make_store(Some(json!(42)));
        assert_eq!(store.settings(), &RootSettings::default());
    }

    #[test]
    fn test_malformed_fields_do_not_discard_the_blob() {
        let (mut store, backend) = make_store(Some(json!({
            "enabled": "sometimes",
            "mode": "chat",
            "migrationComplete": true,
            "globalHideSettings": {"hideLastN": "three", "userConfigured": true},
            "settings_by_entity": {
                "character-good.png": {"hideLastN": 4, "userConfigured": true, "lastProcessedLength": 11},
                "group-g1": {"hideLastN": 2, "userConfigured": "true", "lastProcessedLength": [1]},
                "group-g2": "corrupt"
            }
        })));

        let settings = store.settings();
        assert!(settings.enabled);
        assert!(settings.migration_complete);
        assert_eq!(settings.global_hide_settings.hide_last_n, 0);
        assert!(settings.global_hide_settings.user_configured);

        let good = store.get(&EntityId::character("good.png")).unwrap();
        assert_eq!(good.hide_last_n, 4);
        assert_eq!(good.last_processed_length, 11);
        let g1 = store.get(&EntityId::group("g1")).unwrap();
        assert_eq!(g1.hide_last_n, 2);
        assert!(g1.user_configured);
        assert_eq!(g1.last_processed_length, 0);
        assert!(!store.contains(&EntityId::group("g2")));

        store.set_mode(Mode::Global);
        store.persist().unwrap();
        let blob = backend.blob().unwrap();
        assert_eq!(blob["migrationComplete"], json!(true));
        assert_eq!(blob["settings_by_entity"]["character-good.png"]["hideLastN"], json!(4));
    }

    #[test]
    fn test_unknown_mode_falls_back_to_chat() {
        let (store, _) = make_store(Some(json!({"mode": "everywhere", "enabled": false})));
        assert_eq!(store.settings().mode, Mode::Chat);
        assert!(!store.settings().enabled);
    }

    #[test]
    fn test_set_entity_creates_and_patches() {
        let (mut store, _) = make_store(None);
        let id = EntityId::group("g1");
        assert!(store.get(&id).is_none());

        store.set_entity(&id, EntityPatch::progress(4).hide_last_n(2));
        let created = *store.get(&id).unwrap();
        assert_eq!(created.hide_last_n, 2);
        assert_eq!(created.last_processed_length, 4);
        assert!(!created.user_configured);

        store.set_entity(&id, EntityPatch::default().user_configured(true));
        let patched = store.get(&id).unwrap();
        assert_eq!(patched.hide_last_n, 2);
        assert!(patched.user_configured);
    }

    #[test]
    fn test_noop_mutation_does_not_dirty() {
        let (mut store, _) = make_store(None);
        store.set_enabled(true);
        store.set_mode(Mode::Chat);
        store.set_global(Some(0), Some(false));
        assert_eq!(store.revision(), 0);
        assert!(!store.is_dirty());

        store.set_global(Some(3), None);
        assert_eq!(store.revision(), 1);
        assert!(store.is_dirty());
    }

    #[test]
    fn test_insert_if_absent_never_overwrites() {
        let (mut store, _) = make_store(None);
        let id = EntityId::character("a.png");
        let first = EntitySettings {
            hide_last_n: 1,
            user_configured: true,
            last_processed_length: 1,
        };
        assert!(store.insert_entity_if_absent(&id, first));
        assert!(!store.insert_entity_if_absent(&id, EntitySettings::default()));
        assert_eq!(store.get(&id), Some(&first));
    }

    #[test]
    fn test_persist_clears_dirty_and_failure_keeps_it() {
        let (mut store, backend) = make_store(None);
        store.set_mode(Mode::Global);

        backend.set_failing(true);
        assert!(store.persist().is_err());
        assert!(store.is_dirty());

        backend.set_failing(false);
        store.persist().unwrap();
        assert!(!store.is_dirty());
        assert_eq!(backend.blob().unwrap()["mode"], json!("global"));
    }
}
