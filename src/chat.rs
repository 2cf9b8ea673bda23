// ABOUTME: The `jake chat` command: an interactive console session read line by line.
// ABOUTME: Each line is a slash command or a prompt for the active conversation.

use crate::cli::ChatArgs;
use crate::platform;
use crate::relay::{MessageOutcome, Relay};
use anyhow::{Context, Result};
use jake_agent::AgentRegistry;
use jake_core::config::Config;
use jake_core::ChatPlatform;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Summary of a chat session
#[derive(Debug, Default)]
pub struct ChatSession {
    /// Command replies sent
    pub replies: usize,
    /// Prompts relayed to the backend
    pub turns: usize,
    /// Lines that failed; the session carries on after each
    pub failures: usize,
    /// Final text of each console message
    pub messages: Vec<String>,
}

/// Read `input` until EOF, handling each line as chat from `args.user`
pub async fn run<R>(config: Config, args: &ChatArgs, input: R) -> Result<ChatSession>
where
    R: AsyncBufRead + Unpin,
{
    let config = Arc::new(config);
    let console = Arc::new(platform::console_platform(&config));
    let relay = Relay::from_config(
        Arc::clone(&config),
        &AgentRegistry::default(),
        Arc::clone(&console) as Arc<dyn ChatPlatform>,
    )?;

    tracing::info!(
        user_id = %args.user,
        channel_id = %args.channel,
        backend = %config.backend.backend_type(),
        "Chat session started, /help lists commands"
    );

    let mut session = ChatSession::default();
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        match relay.handle_message(&args.user, &args.channel, &line).await {
            Ok(MessageOutcome::Replied(_)) => session.replies += 1,
            Ok(MessageOutcome::Relayed(_)) => session.turns += 1,
            Ok(MessageOutcome::Ignored) => {
                if relay.conversations().get(&args.user, &args.channel).is_none() {
                    tracing::info!("No active conversation, use /start first");
                }
            }
            Err(e) => {
                session.failures += 1;
                tracing::error!(error = %format!("{:#}", e), "Failed to handle input");
            }
        }
    }

    session.messages = console.transcript();
    Ok(session)
}
