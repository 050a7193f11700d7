//! One CLI invocation: open the runtime over the file host, run a command, flush.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use veil_core::presentation::RecordingView;
use veil_core::scope::HostContext;
use veil_core::store::JsonFileBackend;
use veil_core::{CoreConfig, HideRuntime, Mode};

use super::host::FileHost;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    Set { hide_last_n: i64 },
    Unhide,
    Enable,
    Disable,
    Mode(Mode),
    Check { full: bool },
    Migrate,
}

pub struct Session {
    runtime: HideRuntime,
    host: FileHost,
    view: RecordingView,
}

impl Session {
    pub fn open(
        config: CoreConfig,
        context: Option<HostContext>,
        chat_path: Option<&Path>,
    ) -> Result<Self> {
        let mut host = FileHost::new(context).with_records(&config)?;
        if let Some(path) = chat_path {
            host = host.with_chat_file(path)?;
        }
        let view = RecordingView::new();
        let backend = JsonFileBackend::new(config.settings_path());
        let runtime = HideRuntime::new(&config, Box::new(backend), Box::new(view.clone()));
        Ok(Self {
            runtime,
            host,
            view,
        })
    }

    /// Run a single command and return its JSON output. Scheduled passes run on `close`.
    pub fn execute(&mut self, command: Command, now: Instant) -> Result<Value> {
        self.runtime.migrate_if_needed(&self.host, now);
        let output = match command {
            Command::Status => json!({ "state": self.runtime.display_state(&self.host) }),
            Command::Set { hide_last_n } => {
                let outcome = self.runtime.save_hide_last_n(hide_last_n, now, &mut self.host);
                json!({ "outcome": outcome, "state": self.runtime.display_state(&self.host) })
            }
            Command::Unhide => {
                let outcome = self.runtime.unhide_all(now, &mut self.host);
                json!({ "outcome": outcome, "state": self.runtime.display_state(&self.host) })
            }
            Command::Enable | Command::Disable => {
                self.runtime.set_enabled(command == Command::Enable, now);
                json!({ "enabled": self.runtime.store().settings().enabled })
            }
            Command::Mode(mode) => {
                self.runtime.set_mode(mode, now);
                json!({ "mode": self.runtime.store().settings().mode })
            }
            Command::Check { full } => {
                let outcome = if full {
                    self.runtime.run_full_check(now, &mut self.host)
                } else {
                    self.runtime.run_incremental_check(now, &mut self.host)
                };
                json!({ "outcome": outcome })
            }
            Command::Migrate => {
                let report = self.runtime.migrate(&self.host, now);
                json!({ "migration": report })
            }
        };
        Ok(output)
    }

    /// Start behaving like a live host: migrate and schedule the initial full pass.
    pub fn start(&mut self, now: Instant) {
        if let Some(report) = self.runtime.init(&self.host, now) {
            tracing::info!(migrated = report.migrated.len(), "Legacy settings migrated");
        }
    }

    /// Pick up outside edits to the chat, run due passes and write flags back.
    pub fn poll(&mut self, now: Instant) -> Result<()> {
        if let Some(event) = self.host.reload_chat()? {
            tracing::debug!(?event, "Chat file changed");
            self.runtime.handle_event(event, now);
        }
        let outcomes = self.runtime.tick(now, &mut self.host);
        let mutations: usize = outcomes.iter().map(|o| o.mutations()).sum();
        if self.host.is_chat_dirty() {
            self.host.save_chat().context("Failed to write chat flags")?;
            tracing::info!(mutations, "Chat file updated");
        }
        Ok(())
    }

    /// Run pending passes, persist settings and write the chat if flags changed.
    pub fn close(mut self) -> Result<()> {
        self.runtime
            .flush(&mut self.host)
            .context("Failed to save settings")?;
        if self.host.is_chat_dirty() {
            self.host.save_chat()?;
        }
        Ok(())
    }

    pub fn host(&self) -> &FileHost {
        &self.host
    }

    pub fn view(&self) -> &RecordingView {
        &self.view
    }

    pub fn runtime(&self) -> &HideRuntime {
        &self.runtime
    }
}
