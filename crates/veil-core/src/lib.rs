pub mod config;
pub mod constants;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod events;
pub mod models;
pub mod presentation;
pub mod runtime;
pub mod scope;
pub mod store;

pub use config::CoreConfig;
pub use engine::{PassOutcome, PassReport, ReconciliationEngine, SkipReason};
pub use error::VeilError;
pub use events::HostEvent;
pub use models::{EntityId, EntitySettings, GlobalHideSettings, Message, Mode, RootSettings};
pub use runtime::{DisplayState, HideRuntime, Host};
pub use store::SettingsStore;
