use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    files, FULL_CHECK_DEBOUNCE_MS, INCREMENTAL_DELAY_MS, PERSIST_DEBOUNCE_MS,
};
use crate::error::VeilError;

/// Runtime configuration, loadable from a camelCase JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    pub full_check_debounce_ms: u64,
    pub incremental_delay_ms: u64,
    pub persist_debounce_ms: u64,
}

impl CoreConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Load config from a JSON file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, VeilError> {
        let content = std::fs::read_to_string(path).map_err(|source| VeilError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: CoreConfig =
            serde_json::from_str(&content).map_err(|e| VeilError::InvalidConfig {
                message: format!("{}: {}", path.display(), e),
            })?;
        Ok(config)
    }

    pub fn full_check_debounce(&self) -> Duration {
        Duration::from_millis(self.full_check_debounce_ms)
    }

    pub fn incremental_delay(&self) -> Duration {
        Duration::from_millis(self.incremental_delay_ms)
    }

    pub fn persist_debounce(&self) -> Duration {
        Duration::from_millis(self.persist_debounce_ms)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(files::SETTINGS)
    }

    pub fn characters_path(&self) -> PathBuf {
        self.data_dir.join(files::CHARACTERS)
    }

    pub fn groups_path(&self) -> PathBuf {
        self.data_dir.join(files::GROUPS)
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("veil_data"),
            full_check_debounce_ms: FULL_CHECK_DEBOUNCE_MS,
            incremental_delay_ms: INCREMENTAL_DELAY_MS,
            persist_debounce_ms: PERSIST_DEBOUNCE_MS,
        }
    }
}
