use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use veil_core::scope::HostContext;
use veil_core::CoreConfig;

/// `<platform data dir>/veil`, or `./veil_data` when the platform has none.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("veil"))
        .unwrap_or_else(|| PathBuf::from("veil_data"))
}

/// Build the runtime config: file first, then the data dir flag on top.
pub fn resolve_config(config_path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<CoreConfig> {
    let mut config = match config_path {
        Some(path) => CoreConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => CoreConfig::new(default_data_dir()),
    };
    if let Some(data_dir) = data_dir {
        config.data_dir = data_dir;
    }
    Ok(config)
}

/// Host context from the scope flags. Neither flag means no active chat.
pub fn scope_context(character: Option<&str>, group: Option<&str>) -> Result<Option<HostContext>> {
    match (character, group) {
        (Some(_), Some(_)) => bail!("--character and --group are mutually exclusive"),
        (Some(avatar), None) => Ok(Some(HostContext::for_character(avatar))),
        (None, Some(group_id)) => Ok(Some(HostContext::for_group(group_id))),
        (None, None) => Ok(None),
    }
}
