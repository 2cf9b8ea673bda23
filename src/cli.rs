// ABOUTME: Command line definitions for the jake binary
// ABOUTME: `replay` relays a recorded turn, `chat` runs a console session, `check-config` validates

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Relay streaming AI assistant turns into chat messages
#[derive(Debug, Parser)]
#[command(name = "jake", version, about)]
pub struct Cli {
    /// Configuration file (default: JAKE_CONFIG_PATH, ./config.toml, then the user config dir)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Relay one recorded turn to the console or a Telegram chat
    Replay(ReplayArgs),

    /// Chat on the console: slash commands manage the conversation, other lines are prompts
    Chat(ChatArgs),

    /// Load and validate the configuration, then print it with secrets redacted
    CheckConfig,
}

#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    /// JSONL transcript to replay (default: the [backend] section)
    pub transcript: Option<PathBuf>,

    /// Prompt text handed to the backend
    #[arg(long, default_value = "replay")]
    pub prompt: String,

    /// Override the console message size limit
    #[arg(long)]
    pub char_limit: Option<usize>,

    /// Override the minimum time between message edits
    #[arg(long)]
    pub edit_interval_ms: Option<u64>,

    /// Treat the console as a platform without message edits
    #[arg(long)]
    pub no_edit: bool,

    /// Pause between replayed events
    #[arg(long, default_value_t = 0)]
    pub delay_ms: u64,

    /// Working directory, relative to workspace.base_workdir
    #[arg(long)]
    pub workdir: Option<String>,

    /// Deliver to this Telegram chat instead of the console
    #[arg(long, allow_hyphen_values = true)]
    pub telegram_chat: Option<String>,

    /// Print Prometheus metrics after the run
    #[arg(long)]
    pub print_metrics: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ChatArgs {
    /// User id the input is attributed to
    #[arg(long, default_value = "local")]
    pub user: String,

    /// Channel id of the session
    #[arg(long, default_value = "console")]
    pub channel: String,
}
