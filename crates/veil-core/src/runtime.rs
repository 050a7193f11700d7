//! The aggregate a host drives: settings, scope cache, scheduler and view adapter.
//!
//! The host is passed into every entry point rather than stored, so the runtime holds
//! no reference into the host's chat and the borrow of the log lasts one pass.

use std::time::Instant;

use serde::Serialize;

use crate::config::CoreConfig;
use crate::dispatcher::{Debouncer, EventDispatcher};
use crate::engine::{PassKind, PassOutcome, ReconciliationEngine};
use crate::error::VeilError;
use crate::events::HostEvent;
use crate::models::{hidden_count, CharacterRecord, EntityId, GroupRecord, Message, Mode};
use crate::presentation::{PresentationAdapter, ViewSink};
use crate::scope::{effective_settings, ContextSource, ScopeResolver};
use crate::store::{
    migrate_if_needed, run_migration, MigrationReport, SettingsBackend, SettingsStore,
};

/// What the runtime needs from the host application.
pub trait Host: ContextSource {
    fn chat(&self) -> Option<&[Message]>;
    fn chat_mut(&mut self) -> Option<&mut [Message]>;

    /// Character records that may carry legacy settings.
    fn characters(&self) -> Vec<CharacterRecord> {
        Vec::new()
    }

    /// Group records that may carry legacy settings.
    fn groups(&self) -> Vec<GroupRecord> {
        Vec::new()
    }
}

/// Snapshot for rendering the current state to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayState {
    pub enabled: bool,
    pub mode: Mode,
    pub entity: Option<EntityId>,
    /// `None` when hiding is off for the active scope.
    pub hide_last_n: Option<usize>,
    pub user_configured: bool,
    pub last_processed_length: Option<usize>,
    pub hidden_count: usize,
    pub total: usize,
}

pub struct HideRuntime {
    store: SettingsStore,
    scope: ScopeResolver,
    engine: ReconciliationEngine,
    dispatcher: EventDispatcher,
    view: PresentationAdapter,
    persist: Debouncer,
    armed_revision: u64,
}

impl HideRuntime {
    pub fn new(
        config: &CoreConfig,
        backend: Box<dyn SettingsBackend>,
        view: Box<dyn ViewSink>,
    ) -> Self {
        let store = SettingsStore::load(backend);
        let armed_revision = store.revision();
        Self {
            dispatcher: EventDispatcher::new(config),
            persist: Debouncer::new(config.persist_debounce()),
            store,
            scope: ScopeResolver::new(),
            engine: ReconciliationEngine::new(),
            view: PresentationAdapter::new(view),
            armed_revision,
        }
    }

    /// Run the one-time migration and schedule the initial full pass.
    pub fn init<H: Host>(&mut self, host: &H, now: Instant) -> Option<MigrationReport> {
        let report = self.migrate_if_needed(host, now);
        self.scope.invalidate();
        self.dispatcher.schedule_full(now);
        report
    }

    /// Migrate legacy settings unless a previous run was recorded.
    pub fn migrate_if_needed<H: Host>(&mut self, host: &H, now: Instant) -> Option<MigrationReport> {
        let report = migrate_if_needed(&mut self.store, &host.characters(), &host.groups());
        self.arm_persist(now);
        report
    }

    /// Scan legacy records again regardless of the completion flag.
    ///
    /// Existing store entries are never overwritten, so repeating this is harmless.
    pub fn migrate<H: Host>(&mut self, host: &H, now: Instant) -> MigrationReport {
        let report = run_migration(&mut self.store, &host.characters(), &host.groups());
        self.store.mark_migration_complete();
        self.arm_persist(now);
        report
    }

    pub fn handle_event(&mut self, event: HostEvent, now: Instant) {
        if event.changes_scope() {
            self.scope.invalidate();
        }
        self.dispatcher.dispatch(event, now);
    }

    /// Run every pass due at `now`, then persist if the persist debounce fired.
    pub fn tick<H: Host>(&mut self, now: Instant, host: &mut H) -> Vec<PassOutcome> {
        let outcomes: Vec<PassOutcome> = self
            .dispatcher
            .due(now)
            .into_iter()
            .map(|kind| self.run_pass(kind, host))
            .collect();
        self.arm_persist(now);

        if self.persist.poll(now) {
            if let Err(e) = self.store.persist() {
                tracing::warn!("Failed to persist settings, will retry: {}", e);
                self.persist.trigger(now);
            }
        }
        outcomes
    }

    /// Earliest instant at which `tick` has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.dispatcher.next_deadline(), self.persist.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.dispatcher.is_idle() && !self.persist.is_pending()
    }

    /// Run everything still scheduled and persist. Used at shutdown.
    pub fn flush<H: Host>(&mut self, host: &mut H) -> Result<Vec<PassOutcome>, VeilError> {
        let outcomes: Vec<PassOutcome> = self
            .dispatcher
            .drain_all()
            .into_iter()
            .map(|kind| self.run_pass(kind, host))
            .collect();
        self.persist.cancel();
        self.armed_revision = self.store.revision();
        if self.store.is_dirty() {
            self.store.persist()?;
        }
        Ok(outcomes)
    }

    pub fn run_full_check<H: Host>(&mut self, now: Instant, host: &mut H) -> PassOutcome {
        let outcome = self.run_pass(PassKind::Full, host);
        self.arm_persist(now);
        outcome
    }

    pub fn run_incremental_check<H: Host>(&mut self, now: Instant, host: &mut H) -> PassOutcome {
        let outcome = self.run_pass(PassKind::Incremental, host);
        self.arm_persist(now);
        outcome
    }

    // ===== User Actions =====

    /// Store N for the active scope and reconcile immediately.
    pub fn save_hide_last_n<H: Host>(
        &mut self,
        hide_last_n: i64,
        now: Instant,
        host: &mut H,
    ) -> PassOutcome {
        let entity_id = self.scope.current_entity_id(&*host);
        let length = host.chat().map_or(0, |chat| chat.len());
        let outcome = match ReconciliationEngine::apply_setting(
            &mut self.store,
            entity_id.as_ref(),
            length,
            hide_last_n,
        ) {
            Ok(_) => self.run_pass(PassKind::Full, host),
            Err(reason) => PassOutcome::Skipped(reason),
        };
        self.arm_persist(now);
        outcome
    }

    pub fn unhide_all<H: Host>(&mut self, now: Instant, host: &mut H) -> PassOutcome {
        let outcome = self.run_pass(PassKind::UnhideAll, host);
        self.arm_persist(now);
        outcome
    }

    /// Disabling only stops further passes; already hidden messages stay hidden.
    pub fn set_enabled(&mut self, enabled: bool, now: Instant) {
        self.store.set_enabled(enabled);
        tracing::info!(enabled, "Hiding toggled");
        self.dispatcher.schedule_full(now);
        self.arm_persist(now);
    }

    pub fn set_mode(&mut self, mode: Mode, now: Instant) {
        self.store.set_mode(mode);
        tracing::info!(%mode, "Settings mode changed");
        self.dispatcher.schedule_full(now);
        self.arm_persist(now);
    }

    pub fn display_state<H: Host>(&mut self, host: &H) -> DisplayState {
        let entity = self.scope.current_entity_id(host);
        let settings = self.store.settings();
        let effective = effective_settings(settings, entity.as_ref());
        let last_processed_length = entity
            .as_ref()
            .and_then(|id| self.store.get(id))
            .map(|s| s.last_processed_length);
        let chat = host.chat();

        DisplayState {
            enabled: settings.enabled,
            mode: settings.mode,
            hide_last_n: effective.map(|e| e.hide_last_n).filter(|n| *n > 0),
            user_configured: effective.is_some_and(|e| e.user_configured),
            last_processed_length,
            hidden_count: chat.map_or(0, hidden_count),
            total: chat.map_or(0, |c| c.len()),
            entity,
        }
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    fn run_pass<H: Host>(&mut self, kind: PassKind, host: &mut H) -> PassOutcome {
        let entity_id = self.scope.current_entity_id(&*host);
        let entity_id = entity_id.as_ref();
        let chat = host.chat_mut();
        match kind {
            PassKind::Full => self
                .engine
                .full_check(&mut self.store, entity_id, chat, &mut self.view),
            PassKind::Incremental => {
                self.engine
                    .incremental_check(&mut self.store, entity_id, chat, &mut self.view)
            }
            PassKind::UnhideAll => self
                .engine
                .unhide_all(&mut self.store, entity_id, chat, &mut self.view),
        }
    }

    /// Any mutation since the last check restarts the persist debounce.
    fn arm_persist(&mut self, now: Instant) {
        let revision = self.store.revision();
        if revision != self.armed_revision {
            self.armed_revision = revision;
            self.persist.trigger(now);
        }
    }
}
