//! One-shot copy of per-entity settings from character and group records into the store.
//!
//! Data already in the store always wins; the scan runs once per installation and the
//! completion flag is set whether or not anything was found.

use serde::Serialize;
use serde_json::Value;

use super::settings_store::SettingsStore;
use crate::error::VeilError;
use crate::models::{CharacterRecord, EntityId, GroupRecord, LegacySettings};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub migrated: Vec<EntityId>,
    /// Store already had a record for the entity.
    pub skipped_existing: usize,
    /// Legacy value present but unusable, or the record had no usable id.
    pub skipped_invalid: usize,
    pub failed: usize,
}

#[derive(Debug, PartialEq, Eq)]
enum RecordOutcome {
    NoLegacy,
    Invalid,
    Existing,
    Migrated(EntityId),
}

/// Run the migration if the store has not recorded a previous run.
pub fn migrate_if_needed(
    store: &mut SettingsStore,
    characters: &[CharacterRecord],
    groups: &[GroupRecord],
) -> Option<MigrationReport> {
    if store.settings().migration_complete {
        tracing::debug!("Migration already complete, skipping");
        return None;
    }
    let report = run_migration(store, characters, groups);
    store.mark_migration_complete();
    Some(report)
}

/// Scan every character and group and copy usable legacy settings into the store.
///
/// Errors are contained per record. The caller marks the migration complete.
pub fn run_migration(
    store: &mut SettingsStore,
    characters: &[CharacterRecord],
    groups: &[GroupRecord],
) -> MigrationReport {
    let mut report = MigrationReport::default();

    for (index, character) in characters.iter().enumerate() {
        let label = character.name.as_deref().unwrap_or("unnamed");
        let outcome = migrate_record(
            store,
            character.legacy_settings(),
            character.avatar.as_deref().map(EntityId::character),
        );
        record(&mut report, outcome, "character", index, label);
    }

    for (index, group) in groups.iter().enumerate() {
        let label = group.name.as_deref().unwrap_or("unnamed");
        let outcome = migrate_record(
            store,
            group.legacy_settings(),
            group.id.as_deref().map(EntityId::group),
        );
        record(&mut report, outcome, "group", index, label);
    }

    tracing::info!(
        migrated = report.migrated.len(),
        existing = report.skipped_existing,
        invalid = report.skipped_invalid,
        failed = report.failed,
        "Settings migration finished"
    );
    report
}

fn migrate_record(
    store: &mut SettingsStore,
    legacy: Option<&Value>,
    entity_id: Option<EntityId>,
) -> Result<RecordOutcome, VeilError> {
    let Some(legacy) = legacy else {
        return Ok(RecordOutcome::NoLegacy);
    };
    let Some(settings) = LegacySettings::from_value(legacy)? else {
        return Ok(RecordOutcome::Invalid);
    };
    let Some(entity_id) = entity_id else {
        return Ok(RecordOutcome::Invalid);
    };
    if store.insert_entity_if_absent(&entity_id, settings.into_entity_settings()) {
        Ok(RecordOutcome::Migrated(entity_id))
    } else {
        Ok(RecordOutcome::Existing)
    }
}

fn record(
    report: &mut MigrationReport,
    outcome: Result<RecordOutcome, VeilError>,
    kind: &str,
    index: usize,
    label: &str,
) {
    match outcome {
        Ok(RecordOutcome::NoLegacy) => {}
        Ok(RecordOutcome::Invalid) => {
            tracing::warn!(kind, index, name = label, "Legacy settings unusable, skipped");
            report.skipped_invalid += 1;
        }
        Ok(RecordOutcome::Existing) => {
            tracing::debug!(kind, index, name = label, "Store already has settings, skipped");
            report.skipped_existing += 1;
        }
        Ok(RecordOutcome::Migrated(entity_id)) => {
            tracing::debug!(%entity_id, "Migrated legacy settings");
            report.migrated.push(entity_id);
        }
        Err(e) => {
            tracing::error!(kind, index, name = label, "Failed to migrate legacy settings: {}", e);
            report.failed += 1;
        }
    }
}
