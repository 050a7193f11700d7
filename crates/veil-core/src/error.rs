use std::path::PathBuf;

/// Errors surfaced by veil-core.
///
/// Skipped reconciliation passes are not errors; see [`crate::engine::PassOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum VeilError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Settings serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Settings backend failed: {message}")]
    Backend { message: String },
    #[error("View write failed: {message}")]
    View { message: String },
    #[error("Legacy record field `{field}` is invalid: {value}")]
    InvalidLegacyField { field: &'static str, value: String },
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}
