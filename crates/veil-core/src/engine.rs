//! Visibility reconciliation.
//!
//! A message is hidden iff its index is below `max(0, length - hideLastN)`. Two entry
//! points keep the log in that state:
//!
//! - [`ReconciliationEngine::full_check`] diffs the whole log. Used after anything that
//!   breaks index correspondence: deletion, regeneration, scope switch, setting change.
//! - [`ReconciliationEngine::incremental_check`] only examines indices that crossed the
//!   window boundary since the entity's progress marker (`lastProcessedLength`).
//!
//! The engine is synchronous and owns no state; callers pass the store, the resolved
//! entity, the log and the view adapter into every call.

use std::collections::BTreeSet;
use std::ops::Range;

use serde::Serialize;

use crate::models::{EffectiveSettings, EntityId, Message, Mode, RootSettings};
use crate::presentation::PresentationAdapter;
use crate::scope::effective_settings;
use crate::store::{EntityPatch, SettingsStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKind {
    Full,
    Incremental,
    UnhideAll,
}

/// Why a pass did nothing. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Disabled,
    /// The active scope was never configured by the user.
    NotConfigured,
    UnresolvedScope,
    MissingChat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReport {
    pub kind: PassKind,
    pub length: usize,
    pub hide_last_n: usize,
    pub hidden: Vec<usize>,
    pub shown: Vec<usize>,
    pub progress_updated: bool,
    /// False if a view write failed; log flags were still applied.
    pub view_synced: bool,
}

impl PassReport {
    fn new(kind: PassKind, length: usize, hide_last_n: usize) -> Self {
        Self {
            kind,
            length,
            hide_last_n,
            hidden: Vec::new(),
            shown: Vec::new(),
            progress_updated: false,
            view_synced: true,
        }
    }

    /// Number of hidden flags this pass changed.
    pub fn mutations(&self) -> usize {
        self.hidden.len() + self.shown.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassOutcome {
    Skipped(SkipReason),
    Applied(PassReport),
}

impl PassOutcome {
    pub fn report(&self) -> Option<&PassReport> {
        match self {
            PassOutcome::Applied(report) => Some(report),
            PassOutcome::Skipped(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            PassOutcome::Skipped(reason) => Some(*reason),
            PassOutcome::Applied(_) => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, PassOutcome::Skipped(_))
    }

    pub fn mutations(&self) -> usize {
        self.report().map(PassReport::mutations).unwrap_or(0)
    }
}

/// First visible index for a log of `length` with the last `hide_last_n` kept visible.
/// `hide_last_n == 0` disables hiding.
pub fn visible_start(length: usize, hide_last_n: usize) -> usize {
    if hide_last_n == 0 {
        0
    } else {
        length.saturating_sub(hide_last_n)
    }
}

/// Indices that may newly need hiding when the log grows from `previous` to `length`.
pub fn incremental_range(length: usize, previous: usize, hide_last_n: usize) -> Range<usize> {
    let target = length.saturating_sub(hide_last_n);
    let start = if previous > 0 {
        previous.saturating_sub(hide_last_n)
    } else {
        0
    };
    start..target.max(start)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReconciliationEngine;

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Evaluated fresh on every pass; enablement and configuration change between events.
    pub fn gate(
        settings: &RootSettings,
        entity_id: Option<&EntityId>,
    ) -> Result<EffectiveSettings, SkipReason> {
        if !settings.enabled {
            return Err(SkipReason::Disabled);
        }
        let effective =
            effective_settings(settings, entity_id).ok_or(SkipReason::UnresolvedScope)?;
        if !effective.user_configured {
            return Err(SkipReason::NotConfigured);
        }
        Ok(effective)
    }

    pub fn should_process(settings: &RootSettings, entity_id: Option<&EntityId>) -> bool {
        Self::gate(settings, entity_id).is_ok()
    }

    /// Recompute the hidden flag of every message.
    ///
    /// Idempotent: a second call without a log or setting change mutates nothing.
    pub fn full_check(
        &self,
        store: &mut SettingsStore,
        entity_id: Option<&EntityId>,
        chat: Option<&mut [Message]>,
        view: &mut PresentationAdapter,
    ) -> PassOutcome {
        let effective = match Self::gate(store.settings(), entity_id) {
            Ok(effective) => effective,
            Err(reason) => {
                tracing::debug!(?reason, "Full check skipped");
                return PassOutcome::Skipped(reason);
            }
        };
        let Some(chat) = chat else {
            tracing::warn!("Full check aborted: chat not available");
            return PassOutcome::Skipped(SkipReason::MissingChat);
        };

        let length = chat.len();
        let start = visible_start(length, effective.hide_last_n);
        let mut report = PassReport::new(PassKind::Full, length, effective.hide_last_n);

        let mut to_hide = BTreeSet::new();
        let mut to_show = BTreeSet::new();
        for (index, message) in chat.iter_mut().enumerate() {
            let should_hide = index < start;
            if should_hide && !message.is_hidden {
                message.is_hidden = true;
                to_hide.insert(index);
            } else if !should_hide && message.is_hidden {
                message.is_hidden = false;
                to_show.insert(index);
            }
        }

        let hide_ok = view.apply(&to_hide, true);
        let show_ok = view.apply(&to_show, false);
        report.view_synced = hide_ok && show_ok;
        report.hidden = to_hide.into_iter().collect();
        report.shown = to_show.into_iter().collect();

        if let Some(entity_id) = entity_id {
            let stored = store.get(entity_id).map(|s| s.last_processed_length);
            if stored != Some(length) && effective.user_configured {
                let mut patch = EntityPatch::progress(length);
                // Global mode mirrors N into the entity so a later switch back to chat
                // mode starts from the same window.
                if store.settings().mode == Mode::Global {
                    patch = patch.hide_last_n(effective.hide_last_n);
                }
                store.set_entity(entity_id, patch);
                report.progress_updated = true;
            }
        }

        if report.mutations() > 0 {
            tracing::info!(
                length,
                hide_last_n = effective.hide_last_n,
                hidden = report.hidden.len(),
                shown = report.shown.len(),
                "Full check applied"
            );
        } else {
            tracing::debug!(length, "Full check: nothing to change");
        }
        PassOutcome::Applied(report)
    }

    /// Hide only the messages that crossed the window boundary since the last pass.
    ///
    /// A log shorter than the progress marker means something was deleted; the marker is
    /// corrected but no index-based hiding is attempted.
    pub fn incremental_check(
        &self,
        store: &mut SettingsStore,
        entity_id: Option<&EntityId>,
        chat: Option<&mut [Message]>,
        view: &mut PresentationAdapter,
    ) -> PassOutcome {
        let effective = match Self::gate(store.settings(), entity_id) {
            Ok(effective) => effective,
            Err(reason) => {
                tracing::debug!(?reason, "Incremental check skipped");
                return PassOutcome::Skipped(reason);
            }
        };
        let Some(entity_id) = entity_id else {
            return PassOutcome::Skipped(SkipReason::UnresolvedScope);
        };
        let Some(chat) = chat else {
            tracing::warn!("Incremental check aborted: chat not available");
            return PassOutcome::Skipped(SkipReason::MissingChat);
        };

        let length = chat.len();
        let previous = store
            .get(entity_id)
            .map(|s| s.last_processed_length)
            .unwrap_or(0);
        let hide_last_n = effective.hide_last_n;
        let mut report = PassReport::new(PassKind::Incremental, length, hide_last_n);

        if length <= previous {
            if length < previous {
                tracing::warn!(previous, length, "Chat shrank, correcting progress marker");
                report.progress_updated =
                    record_progress(store, entity_id, &effective, length);
            }
            return PassOutcome::Applied(report);
        }

        if hide_last_n == 0 {
            report.progress_updated = record_progress(store, entity_id, &effective, length);
            return PassOutcome::Applied(report);
        }

        let range = incremental_range(length, previous, hide_last_n);
        let mut to_hide = BTreeSet::new();
        for index in range.clone() {
            if let Some(message) = chat.get_mut(index) {
                if !message.is_hidden {
                    message.is_hidden = true;
                    to_hide.insert(index);
                }
            }
        }

        if !to_hide.is_empty() {
            tracing::info!(indices = ?to_hide, "Incrementally hiding messages");
            report.view_synced = view.apply(&to_hide, true);
        }

        if !range.is_empty() || !to_hide.is_empty() || length != previous {
            report.progress_updated = record_progress(store, entity_id, &effective, length);
        }
        report.hidden = to_hide.into_iter().collect();
        PassOutcome::Applied(report)
    }

    /// Force N to 0 for the active scope and clear every hidden flag in one batch.
    ///
    /// A direct user action, so it does not consult the enable flag.
    pub fn unhide_all(
        &self,
        store: &mut SettingsStore,
        entity_id: Option<&EntityId>,
        chat: Option<&mut [Message]>,
        view: &mut PresentationAdapter,
    ) -> PassOutcome {
        let Some(chat) = chat else {
            tracing::warn!("Unhide all aborted: chat not available");
            return PassOutcome::Skipped(SkipReason::MissingChat);
        };
        let length = chat.len();
        if let Err(reason) = Self::apply_setting(store, entity_id, length, 0) {
            return PassOutcome::Skipped(reason);
        }

        let mut report = PassReport::new(PassKind::UnhideAll, length, 0);
        let mut to_show = BTreeSet::new();
        for (index, message) in chat.iter_mut().enumerate() {
            if message.is_hidden {
                message.is_hidden = false;
                to_show.insert(index);
            }
        }
        report.view_synced = view.apply(&to_show, false);
        report.progress_updated = entity_id.is_some();
        report.shown = to_show.into_iter().collect();

        tracing::info!(shown = report.shown.len(), "Unhid all messages");
        PassOutcome::Applied(report)
    }

    /// Store a user-chosen N for the active scope and mark it configured.
    ///
    /// Negative input clamps to 0. The active entity's marker moves to `length`; in
    /// global mode the entity also receives the shared N. Returns the stored N.
    pub fn apply_setting(
        store: &mut SettingsStore,
        entity_id: Option<&EntityId>,
        length: usize,
        hide_last_n: i64,
    ) -> Result<usize, SkipReason> {
        let n = usize::try_from(hide_last_n.max(0)).unwrap_or(usize::MAX);
        match store.settings().mode {
            Mode::Global => {
                store.set_global(Some(n), Some(true));
                if let Some(entity_id) = entity_id {
                    store.set_entity(entity_id, EntityPatch::progress(length).hide_last_n(n));
                }
            }
            Mode::Chat => {
                let Some(entity_id) = entity_id else {
                    tracing::error!("Cannot save settings: no active character or group");
                    return Err(SkipReason::UnresolvedScope);
                };
                store.set_entity(
                    entity_id,
                    EntityPatch::progress(length)
                        .hide_last_n(n)
                        .user_configured(true),
                );
            }
        }
        tracing::info!(hide_last_n = n, length, "Saved hide setting");
        Ok(n)
    }
}

fn record_progress(
    store: &mut SettingsStore,
    entity_id: &EntityId,
    effective: &EffectiveSettings,
    length: usize,
) -> bool {
    if !effective.user_configured {
        return false;
    }
    store.set_entity(entity_id, EntityPatch::progress(length));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::RecordingView;
    use crate::store::MemoryBackend;

    fn make_chat(length: usize) -> Vec<Message> {
        (0..length)
            .map(|i| Message::new("user", i % 2 == 0, format!("message {}", i)))
            .collect()
    }

    fn make_store(hide_last_n: usize) -> (SettingsStore, EntityId) {
        let mut store = SettingsStore::load(Box::new(MemoryBackend::new()));
        let id = EntityId::character("a.png");
        store.set_entity(
            &id,
            EntityPatch::default()
                .hide_last_n(hide_last_n)
                .user_configured(true),
        );
        (store, id)
    }

    fn make_view() -> (PresentationAdapter, RecordingView) {
        let view = RecordingView::new();
        (PresentationAdapter::new(Box::new(view.clone())), view)
    }

    fn hidden_flags(chat: &[Message]) -> Vec<bool> {
        chat.iter().map(|m| m.is_hidden).collect()
    }

    #[test]
    fn test_visible_start() {
        assert_eq!(visible_start(10, 3), 7);
        assert_eq!(visible_start(10, 0), 0);
        assert_eq!(visible_start(2, 5), 0);
        assert_eq!(visible_start(0, 3), 0);
    }

    #[test]
    fn test_incremental_range() {
        assert_eq!(incremental_range(12, 10, 3), 7..9);
        assert_eq!(incremental_range(4, 0, 3), 0..1);
        assert!(incremental_range(3, 2, 5).is_empty());
    }

    #[test]
    fn test_full_check_matches_formula() {
        let engine = ReconciliationEngine::new();
        for length in 0..8 {
            for n in 0..10 {
                let (mut store, id) = make_store(n);
                let (mut view, _) = make_view();
                // Start from a scrambled state
                let mut chat: Vec<Message> = make_chat(length)
                    .into_iter()
                    .enumerate()
                    .map(|(i, m)| if i % 3 == 0 { m.hidden() } else { m })
                    .collect();
                engine.full_check(&mut store, Some(&id), Some(&mut chat), &mut view);
                let start = length.saturating_sub(n);
                for (i, message) in chat.iter().enumerate() {
                    let expected = n > 0 && i < start;
                    assert_eq!(message.is_hidden, expected, "length={} n={} i={}", length, n, i);
                }
            }
        }
    }

    #[test]
    fn test_full_check_batches_and_records_progress() {
        let engine = ReconciliationEngine::new();
        let (mut store, id) = make_store(3);
        let (mut view, recorded) = make_view();
        let mut chat = make_chat(10);

        let outcome = engine.full_check(&mut store, Some(&id), Some(&mut chat), &mut view);
        let report = outcome.report().unwrap();
        assert_eq!(report.hidden, vec![0, 1, 2, 3, 4, 5, 6]);
        assert!(report.shown.is_empty());
        assert!(report.progress_updated);
        assert_eq!(recorded.batches().len(), 1);
        assert_eq!(store.get(&id).unwrap().last_processed_length, 10);
    }

    #[test]
    fn test_full_check_is_idempotent() {
        let engine = ReconciliationEngine::new();
        let (mut store, id) = make_store(4);
        let (mut view, recorded) = make_view();
        let mut chat = make_chat(9);

        engine.full_check(&mut store, Some(&id), Some(&mut chat), &mut view);
        let revision = store.revision();
        let second = engine.full_check(&mut store, Some(&id), Some(&mut chat), &mut view);
        assert_eq!(second.mutations(), 0);
        assert!(!second.report().unwrap().progress_updated);
        assert_eq!(store.revision(), revision);
        assert_eq!(recorded.batches().len(), 1);
    }

    #[test]
    fn test_full_check_shows_when_n_grows() {
        let engine = ReconciliationEngine::new();
        let (mut store, id) = make_store(2);
        let (mut view, _) = make_view();
        let mut chat = make_chat(6);
        engine.full_check(&mut store, Some(&id), Some(&mut chat), &mut view);

        store.set_entity(&id, EntityPatch::default().hide_last_n(4));
        let outcome = engine.full_check(&mut store, Some(&id), Some(&mut chat), &mut view);
        assert_eq!(outcome.report().unwrap().shown, vec![2, 3]);
        assert_eq!(hidden_flags(&chat), vec![true, true, false, false, false, false]);
    }

    #[test]
    fn test_gate() {
        let (mut store, id) = make_store(3);
        assert!(ReconciliationEngine::should_process(store.settings(), Some(&id)));

        store.set_enabled(false);
        assert_eq!(
            ReconciliationEngine::gate(store.settings(), Some(&id)),
            Err(SkipReason::Disabled)
        );
        store.set_enabled(true);

        let unconfigured = EntityId::group("g1");
        store.set_entity(&unconfigured, EntityPatch::default().hide_last_n(2));
        assert_eq!(
            ReconciliationEngine::gate(store.settings(), Some(&unconfigured)),
            Err(SkipReason::NotConfigured)
        );
        assert_eq!(
            ReconciliationEngine::gate(store.settings(), None),
            Err(SkipReason::UnresolvedScope)
        );
    }

    #[test]
    fn test_unconfigured_entity_never_hides() {
        let engine = ReconciliationEngine::new();
        let mut store = SettingsStore::load(Box::new(MemoryBackend::new()));
        let id = EntityId::character("fresh.png");
        store.set_entity(&id, EntityPatch::default().hide_last_n(2));
        let (mut view, _) = make_view();
        let mut chat = make_chat(10);

        let outcome = engine.full_check(&mut store, Some(&id), Some(&mut chat), &mut view);
        assert_eq!(outcome, PassOutcome::Skipped(SkipReason::NotConfigured));
        let outcome = engine.incremental_check(&mut store, Some(&id), Some(&mut chat), &mut view);
        assert_eq!(outcome, PassOutcome::Skipped(SkipReason::NotConfigured));
        assert!(chat.iter().all(|m| !m.is_hidden));
    }

    #[test]
    fn test_missing_chat_aborts_without_mutation() {
        let engine = ReconciliationEngine::new();
        let (mut store, id) = make_store(3);
        let (mut view, _) = make_view();
        let revision = store.revision();
        let outcome = engine.full_check(&mut store, Some(&id), None, &mut view);
        assert_eq!(outcome, PassOutcome::Skipped(SkipReason::MissingChat));
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_incremental_matches_full_after_append() {
        let engine = ReconciliationEngine::new();
        for n in 1..6 {
            for appended in 0..5 {
                let (mut store, id) = make_store(n);
                let (mut view, _) = make_view();
                let mut chat = make_chat(7);
                engine.full_check(&mut store, Some(&id), Some(&mut chat), &mut view);

                chat.extend(make_chat(appended));
                let mut replayed = chat.clone();
                engine.incremental_check(&mut store, Some(&id), Some(&mut chat), &mut view);

                let (mut fresh_store, _) = make_store(n);
                engine.full_check(&mut fresh_store, Some(&id), Some(&mut replayed), &mut view);
                assert_eq!(hidden_flags(&chat), hidden_flags(&replayed), "n={} appended={}", n, appended);
                assert_eq!(store.get(&id).unwrap().last_processed_length, chat.len());
            }
        }
    }

    #[test]
    fn test_incremental_skips_already_hidden() {
        let engine = ReconciliationEngine::new();
        let (mut store, id) = make_store(3);
        store.set_entity(&id, EntityPatch::progress(10));
        let (mut view, _) = make_view();
        let mut chat = make_chat(12);
        chat[7].is_hidden = true;

        let outcome = engine.incremental_check(&mut store, Some(&id), Some(&mut chat), &mut view);
        assert_eq!(outcome.report().unwrap().hidden, vec![8]);
        assert_eq!(store.get(&id).unwrap().last_processed_length, 12);
    }

    #[test]
    fn test_incremental_shrink_only_fixes_marker() {
        let engine = ReconciliationEngine::new();
        let (mut store, id) = make_store(3);
        store.set_entity(&id, EntityPatch::progress(12));
        let (mut view, recorded) = make_view();
        let mut chat = make_chat(5);

        let outcome = engine.incremental_check(&mut store, Some(&id), Some(&mut chat), &mut view);
        let report = outcome.report().unwrap();
        assert_eq!(report.mutations(), 0);
        assert!(report.progress_updated);
        assert!(recorded.batches().is_empty());
        assert!(chat.iter().all(|m| !m.is_hidden));
        assert_eq!(store.get(&id).unwrap().last_processed_length, 5);
    }

    #[test]
    fn test_incremental_with_zero_n_only_records_length() {
        let engine = ReconciliationEngine::new();
        let (mut store, id) = make_store(0);
        let (mut view, _) = make_view();
        let mut chat = make_chat(4);
        let outcome = engine.incremental_check(&mut store, Some(&id), Some(&mut chat), &mut view);
        assert_eq!(outcome.mutations(), 0);
        assert_eq!(store.get(&id).unwrap().last_processed_length, 4);
    }

    #[test]
    fn test_unhide_all_clears_everything() {
        let engine = ReconciliationEngine::new();
        let (mut store, id) = make_store(2);
        let (mut view, recorded) = make_view();
        let mut chat = make_chat(6);
        engine.full_check(&mut store, Some(&id), Some(&mut chat), &mut view);

        let outcome = engine.unhide_all(&mut store, Some(&id), Some(&mut chat), &mut view);
        assert_eq!(outcome.report().unwrap().shown, vec![0, 1, 2, 3]);
        assert!(chat.iter().all(|m| !m.is_hidden));
        assert_eq!(store.get(&id).unwrap().hide_last_n, 0);
        assert_eq!(recorded.batches().last(), Some(&(vec![0, 1, 2, 3], false)));
    }

    #[test]
    fn test_unhide_all_needs_scope_in_chat_mode() {
        let engine = ReconciliationEngine::new();
        let (mut store, _) = make_store(2);
        let (mut view, _) = make_view();
        let mut chat = vec![Message::new("a", true, "x").hidden()];
        let outcome = engine.unhide_all(&mut store, None, Some(&mut chat), &mut view);
        assert_eq!(outcome, PassOutcome::Skipped(SkipReason::UnresolvedScope));
        assert!(chat[0].is_hidden);
    }

    #[test]
    fn test_global_mode_propagates_n_but_keeps_entity_unconfigured() {
        let engine = ReconciliationEngine::new();
        let mut store = SettingsStore::load(Box::new(MemoryBackend::new()));
        store.set_mode(Mode::Global);
        store.set_global(Some(2), Some(true));
        let id = EntityId::group("g1");
        let (mut view, _) = make_view();
        let mut chat = make_chat(5);

        let outcome = engine.full_check(&mut store, Some(&id), Some(&mut chat), &mut view);
        assert_eq!(outcome.report().unwrap().hidden, vec![0, 1, 2]);
        let entity = store.get(&id).unwrap();
        assert_eq!(entity.hide_last_n, 2);
        assert_eq!(entity.last_processed_length, 5);
        assert!(!entity.user_configured);
    }

    #[test]
    fn test_global_mode_without_entity_applies_without_progress() {
        let engine = ReconciliationEngine::new();
        let mut store = SettingsStore::load(Box::new(MemoryBackend::new()));
        store.set_mode(Mode::Global);
        store.set_global(Some(1), Some(true));
        let (mut view, _) = make_view();
        let mut chat = make_chat(3);

        let outcome = engine.full_check(&mut store, None, Some(&mut chat), &mut view);
        assert!(!outcome.report().unwrap().progress_updated);
        assert_eq!(hidden_flags(&chat), vec![true, true, false]);

        let outcome = engine.incremental_check(&mut store, None, Some(&mut chat), &mut view);
        assert_eq!(outcome, PassOutcome::Skipped(SkipReason::UnresolvedScope));
    }

    #[test]
    fn test_view_failure_keeps_log_flags() {
        let engine = ReconciliationEngine::new();
        let (mut store, id) = make_store(1);
        let (mut view, recorded) = make_view();
        recorded.set_failing(true);
        let mut chat = make_chat(3);

        let outcome = engine.full_check(&mut store, Some(&id), Some(&mut chat), &mut view);
        assert!(!outcome.report().unwrap().view_synced);
        assert_eq!(hidden_flags(&chat), vec![true, true, false]);
    }

    #[test]
    fn test_apply_setting_clamps_and_configures() {
        let mut store = SettingsStore::load(Box::new(MemoryBackend::new()));
        let id = EntityId::character("a.png");
        assert_eq!(ReconciliationEngine::apply_setting(&mut store, Some(&id), 8, -5), Ok(0));
        let entity = store.get(&id).unwrap();
        assert_eq!(entity.hide_last_n, 0);
        assert!(entity.user_configured);
        assert_eq!(entity.last_processed_length, 8);

        assert_eq!(
            ReconciliationEngine::apply_setting(&mut store, None, 8, 3),
            Err(SkipReason::UnresolvedScope)
        );

        store.set_mode(Mode::Global);
        assert_eq!(ReconciliationEngine::apply_setting(&mut store, None, 8, 3), Ok(3));
        assert_eq!(store.settings().global_hide_settings.hide_last_n, 3);
        assert!(store.settings().global_hide_settings.user_configured);
    }
}
