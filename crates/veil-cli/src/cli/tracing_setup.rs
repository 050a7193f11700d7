use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Log to stderr filtered by `VEIL_LOG` (default `info`), plus a debug-level file
/// layer when `VEIL_LOG_FILE` names a path.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("VEIL_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);
    let registry = tracing_subscriber::registry().with(stderr_layer);

    let Ok(log_path) = std::env::var("VEIL_LOG_FILE") else {
        registry.init();
        return;
    };

    match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => {
            let file_layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_filter(LevelFilter::DEBUG);
            registry.with(file_layer).init();
            tracing::debug!(path = %log_path, "File logging enabled");
        }
        Err(e) => {
            registry.init();
            tracing::warn!(path = %log_path, "Could not open log file: {}", e);
        }
    }
}
