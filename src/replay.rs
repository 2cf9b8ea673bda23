// ABOUTME: The `jake replay` command: relays one recorded turn to the console or Telegram.
// ABOUTME: CLI flags override the loaded configuration before the platform is built.

use crate::cli::ReplayArgs;
use crate::platform::{self, ConsolePlatform};
use crate::relay::{Prompt, Relay};
use anyhow::{Context, Result};
use jake_agent::{AgentEvent, AgentRegistry};
use jake_core::config::Config;
use jake_core::ChatPlatform;
use std::sync::Arc;

/// Channel id used when relaying to the console
pub const CONSOLE_CHANNEL: &str = "console";

/// User id the replayed prompt is attributed to
const LOCAL_USER: &str = "local";

/// Result of a replayed turn
#[derive(Debug)]
pub struct ReplayReport {
    /// Terminal event of the turn, if the transcript had one
    pub terminal: Option<AgentEvent>,
    /// Final text of each console message (empty for Telegram)
    pub messages: Vec<String>,
}

/// Apply CLI overrides on top of the loaded configuration
pub fn apply_overrides(config: &mut Config, args: &ReplayArgs) -> Result<()> {
    if let Some(limit) = args.char_limit {
        config.console.char_limit = limit;
    }
    if let Some(interval) = args.edit_interval_ms {
        config.stream.edit_interval_ms = interval;
    }
    if args.no_edit {
        config.console.supports_edit = false;
    }
    config.validate()
}

/// Relay one turn as described by `args`
pub async fn run(mut config: Config, args: &ReplayArgs) -> Result<ReplayReport> {
    apply_overrides(&mut config, args)?;
    let config = Arc::new(config);

    let mut console: Option<Arc<ConsolePlatform>> = None;
    let (platform, channel_id): (Arc<dyn ChatPlatform>, String) = match &args.telegram_chat {
        Some(chat) => (
            platform::create_platform(&config, "telegram").await?,
            chat.clone(),
        ),
        None => {
            let local = Arc::new(platform::console_platform(&config));
            console = Some(Arc::clone(&local));
            let platform: Arc<dyn ChatPlatform> = local;
            (platform, CONSOLE_CHANNEL.to_string())
        }
    };

    let registry = AgentRegistry::default();
    let relay = match &args.transcript {
        Some(path) => {
            let backend = registry
                .create(
                    "replay",
                    &serde_json::json!({
                        "transcript": path,
                        "delay_ms": args.delay_ms,
                    }),
                )
                .with_context(|| format!("Failed to load transcript {}", path.display()))?;
            Relay::new(Arc::clone(&config), backend, platform)
        }
        None => Relay::from_config(Arc::clone(&config), &registry, platform)?,
    };

    let mut prompt = Prompt::new(LOCAL_USER, channel_id, args.prompt.as_str());
    if let Some(workdir) = &args.workdir {
        prompt = prompt.with_workdir(workdir.as_str());
    }

    let terminal = relay.handle_prompt(&prompt).await?;
    let messages = console.map(|c| c.transcript()).unwrap_or_default();
    Ok(ReplayReport { terminal, messages })
}
