// ABOUTME: Configuration parsing from TOML file with environment variable overrides
// ABOUTME: Validates required fields and provides sensible defaults for optional ones
use crate::coordinator::StreamOptions;
use crate::paths;
use anyhow::{Context, Result};
use jake_agent::config::BackendConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram: Option<TelegramConfig>,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Pacing of streamed output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Minimum milliseconds between in-place edits of a message
    #[serde(default = "default_edit_interval_ms")]
    pub edit_interval_ms: u64,
    /// Give up refreshing the typing indicator after this long
    #[serde(default = "default_typing_max_secs")]
    pub typing_max_secs: u64,
    /// Wrap bare URLs so platforms don't expand link previews
    #[serde(default = "default_true")]
    pub suppress_embeds: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            edit_interval_ms: default_edit_interval_ms(),
            typing_max_secs: default_typing_max_secs(),
            suppress_embeds: true,
        }
    }
}

impl StreamConfig {
    pub fn edit_interval(&self) -> Duration {
        Duration::from_millis(self.edit_interval_ms)
    }
}

/// The stdout platform used by `jake replay`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default = "default_console_char_limit")]
    pub char_limit: usize,
    #[serde(default = "default_true")]
    pub supports_edit: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            char_limit: default_console_char_limit(),
            supports_edit: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Directory that relative working directories resolve against
    #[serde(default = "default_base_workdir")]
    pub base_workdir: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            base_workdir: default_base_workdir(),
        }
    }
}

// ─── TelegramConfig ─────────────────────────────────────────────

#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    #[serde(default)]
    pub allowed_users: Vec<i64>,
    #[serde(default)]
    pub allowed_chats: Vec<i64>,
}

// Custom Debug impl to redact bot_token
impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"[REDACTED]")
            .field("allowed_users", &self.allowed_users)
            .field("allowed_chats", &self.allowed_chats)
            .finish()
    }
}

fn default_edit_interval_ms() -> u64 {
    500
}

fn default_typing_max_secs() -> u64 {
    600 // 10 minutes
}

fn default_console_char_limit() -> usize {
    1900
}

fn default_base_workdir() -> String {
    "~".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Find the config file, checking multiple locations in order:
    /// 1. JAKE_CONFIG_PATH env var (if set)
    /// 2. ./config.toml (current directory - for development)
    /// 3. ~/.config/jake/config.toml (XDG config dir)
    pub fn find_config_file() -> Option<PathBuf> {
        if let Ok(env_path) = std::env::var("JAKE_CONFIG_PATH") {
            let path = PathBuf::from(&env_path);
            if path.exists() {
                return Some(path);
            }
            tracing::warn!(path = %env_path, "JAKE_CONFIG_PATH does not exist, ignoring");
        }

        let local_config = PathBuf::from("config.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        let xdg_config = paths::config_file();
        if xdg_config.exists() {
            return Some(xdg_config);
        }

        None
    }

    /// Parse configuration from TOML text without env overrides
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration TOML")
    }

    /// Load configuration from a specific file, then apply env overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        tracing::info!(path = %path.display(), "Loading configuration from file");
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from config.toml with environment variable overrides
    /// Searches: JAKE_CONFIG_PATH env var, ./config.toml, then ~/.config/jake/config.toml
    pub fn load() -> Result<Self> {
        match Self::find_config_file() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::info!("No config file found, using environment variables and defaults");
                let mut config = Config::default();
                config.apply_env_overrides()?;
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Apply environment variable overrides on top of file values
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(ref mut telegram) = self.telegram {
            if let Ok(val) = std::env::var("TELEGRAM_BOT_TOKEN") {
                telegram.bot_token = val;
            }
        }
        if let Ok(val) = std::env::var("JAKE_BASE_WORKDIR") {
            self.workspace.base_workdir = val;
        }
        if let Ok(val) = std::env::var("JAKE_EDIT_INTERVAL_MS") {
            self.stream.edit_interval_ms = val.parse().with_context(|| {
                format!("JAKE_EDIT_INTERVAL_MS must be a valid number, got: {}", val)
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.console.char_limit == 0 {
            anyhow::bail!("console.char_limit must be greater than zero");
        }
        if let Some(ref telegram) = self.telegram {
            if telegram.bot_token.trim().is_empty() {
                anyhow::bail!(
                    "telegram.bot_token is required (set in config.toml or TELEGRAM_BOT_TOKEN env var)"
                );
            }
        }
        Ok(())
    }

    /// Coordinator options derived from the [stream] section
    pub fn stream_options(&self) -> StreamOptions {
        StreamOptions::default()
            .with_typing_max_duration(Duration::from_secs(self.stream.typing_max_secs))
    }

    /// Check if a user may drive the relay in a channel of the given platform.
    ///
    /// The console is a local operator and always allowed. On Telegram the
    /// user or the chat must be listed; with no telegram section nobody is.
    /// Other platforms are refused.
    pub fn is_allowed(&self, platform_id: &str, user_id: &str, channel_id: &str) -> bool {
        match platform_id {
            "console" => true,
            "telegram" => {
                let user = user_id.parse::<i64>().ok();
                let chat = channel_id.parse::<i64>().ok();
                self.telegram.as_ref().is_some_and(|t| {
                    user.is_some_and(|u| t.allowed_users.contains(&u))
                        || chat.is_some_and(|c| t.allowed_chats.contains(&c))
                })
            }
            _ => false,
        }
    }
}
