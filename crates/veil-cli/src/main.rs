use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, Subcommand};
use veil_cli::cli::{init_tracing, resolve_config, scope_context, Command, Session};
use veil_core::Mode;

#[derive(Parser)]
#[command(name = "veil")]
#[command(about = "Keep only the most recent messages of a chat log visible")]
struct Cli {
    /// Path to JSON config file (dataDir, debounce delays)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Directory holding settings.json, characters.json and groups.json
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Chat log to operate on (JSONL)
    #[arg(long)]
    chat: Option<PathBuf>,

    /// Active character, by avatar file name
    #[arg(long)]
    character: Option<String>,

    /// Active group, by id
    #[arg(long)]
    group: Option<String>,

    /// Pretty-print JSON output
    #[arg(long, short)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show settings and visibility for the active scope
    Status,

    /// Keep the last N messages visible and hide the rest
    Set {
        /// Number of messages to keep visible (0 disables hiding)
        #[arg(allow_negative_numbers = true)]
        hide_last_n: i64,
    },

    /// Show every message and set N to 0
    Unhide,

    /// Turn automatic hiding on
    Enable,

    /// Turn automatic hiding off (hidden messages stay hidden)
    Disable,

    /// Switch between per-chat and global settings
    Mode {
        /// chat or global
        mode: Mode,
    },

    /// Reconcile the chat now
    Check {
        /// Recompute every message instead of only new ones
        #[arg(long)]
        full: bool,
    },

    /// Copy settings stored on character and group records into the settings file
    Migrate,

    /// Follow the chat file and keep it reconciled until interrupted
    Watch {
        /// Poll interval in milliseconds
        #[arg(long, default_value_t = 250)]
        interval_ms: u64,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config.as_deref(), cli.data_dir.clone())?;
    let context = scope_context(cli.character.as_deref(), cli.group.as_deref())?;
    let mut session = Session::open(config, context, cli.chat.as_deref())?;

    let command = match cli.command {
        Commands::Status => Command::Status,
        Commands::Set { hide_last_n } => Command::Set { hide_last_n },
        Commands::Unhide => Command::Unhide,
        Commands::Enable => Command::Enable,
        Commands::Disable => Command::Disable,
        Commands::Mode { mode } => Command::Mode(mode),
        Commands::Check { full } => Command::Check { full },
        Commands::Migrate => Command::Migrate,
        Commands::Watch { interval_ms } => {
            return watch(session, Duration::from_millis(interval_ms.max(1))).await;
        }
    };

    let output = session.execute(command, Instant::now())?;
    session.close()?;
    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", rendered);
    Ok(())
}

async fn watch(mut session: Session, interval: Duration) -> Result<()> {
    let Some(path) = session.host().chat_path().map(|p| p.display().to_string()) else {
        anyhow::bail!("watch needs --chat");
    };
    tracing::info!(chat = %path, "Watching chat file");
    session.start(Instant::now());

    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = session.poll(Instant::now()) {
                    tracing::warn!("Poll failed: {:#}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, flushing");
                break;
            }
        }
    }
    session.close()
}
