pub mod chat_file;
pub mod commands;
pub mod config;
pub mod host;
pub mod tracing_setup;

pub use chat_file::ChatFile;
pub use commands::{Command, Session};
pub use config::{default_data_dir, resolve_config, scope_context};
pub use host::FileHost;
pub use tracing_setup::init_tracing;
