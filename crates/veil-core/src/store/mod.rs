pub mod backend;
pub mod migration;
pub mod settings_store;

pub use backend::{JsonFileBackend, MemoryBackend, SettingsBackend};
pub use migration::{migrate_if_needed, run_migration, MigrationReport};
pub use settings_store::{EntityPatch, SettingsStore};
