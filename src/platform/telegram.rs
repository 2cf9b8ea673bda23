// ABOUTME: Telegram platform: sends and edits bot messages through the Bot API.
// ABOUTME: Typing presence is a chat action that Telegram expires after about five seconds.

use anyhow::{Context, Result};
use async_trait::async_trait;
use jake_core::config::TelegramConfig;
use jake_core::traits::{ChatPlatform, MessageRef, PlatformCapabilities, TypingIndicator};
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, ChatId, MessageId};

/// Maximum message length for Telegram Bot API, in UTF-16 code units
pub const MAX_MESSAGE_UNITS: usize = 4096;

/// Message size advertised to the coordinator, which counts chars. A char
/// takes at most two UTF-16 units, so this many chars always fit.
pub const CHAR_LIMIT: usize = MAX_MESSAGE_UNITS / 2;

/// How long a typing chat action stays visible
const TYPING_EXPIRY: Duration = Duration::from_secs(5);

/// Telegram platform using teloxide
pub struct TelegramPlatform {
    bot: Bot,
    caps: PlatformCapabilities,
    typing: Arc<TelegramTyping>,
}

impl TelegramPlatform {
    pub fn new(config: &TelegramConfig, edit_interval: Duration) -> Self {
        let bot = Bot::new(&config.bot_token);
        Self {
            typing: Arc::new(TelegramTyping { bot: bot.clone() }),
            bot,
            caps: PlatformCapabilities::new(CHAR_LIMIT).with_edit_interval(edit_interval),
        }
    }

    /// Check the token with `getMe`
    pub async fn verify(&self) -> Result<()> {
        let me = self
            .bot
            .get_me()
            .await
            .context("Failed to call Telegram getMe")?;
        tracing::info!(
            bot_username = %me.username(),
            bot_id = %me.id.0,
            "Telegram bot authenticated"
        );
        Ok(())
    }
}

fn parse_chat_id(channel_id: &str) -> Result<ChatId> {
    let id = channel_id
        .parse::<i64>()
        .with_context(|| format!("Invalid Telegram chat ID: {channel_id}"))?;
    Ok(ChatId(id))
}

fn parse_message_id(message_id: &str) -> Result<MessageId> {
    let id = message_id
        .parse::<i32>()
        .with_context(|| format!("Invalid Telegram message ID: {message_id}"))?;
    Ok(MessageId(id))
}

#[async_trait]
impl ChatPlatform for TelegramPlatform {
    fn platform_id(&self) -> &'static str {
        "telegram"
    }

    fn capabilities(&self) -> PlatformCapabilities {
        self.caps
    }

    async fn send(&self, channel_id: &str, text: &str) -> Result<MessageRef> {
        let chat_id = parse_chat_id(channel_id)?;
        let message = self
            .bot
            .send_message(chat_id, text)
            .await
            .context("Failed to send message")?;
        Ok(MessageRef::new(channel_id, message.id.0.to_string()))
    }

    async fn edit(&self, message: &MessageRef, text: &str) -> Result<()> {
        let chat_id = parse_chat_id(&message.channel_id)?;
        let message_id = parse_message_id(&message.message_id)?;
        self.bot
            .edit_message_text(chat_id, message_id, text)
            .await
            .context("Failed to edit message")?;
        Ok(())
    }

    fn typing_indicator(&self) -> Option<Arc<dyn TypingIndicator>> {
        Some(Arc::clone(&self.typing) as Arc<dyn TypingIndicator>)
    }
}

struct TelegramTyping {
    bot: Bot,
}

#[async_trait]
impl TypingIndicator for TelegramTyping {
    async fn set_typing(&self, channel_id: &str, typing: bool) -> Result<()> {
        // No "stop typing" call exists; the action just expires
        if typing {
            self.bot
                .send_chat_action(parse_chat_id(channel_id)?, ChatAction::Typing)
                .await
                .context("Failed to send typing action")?;
        }
        Ok(())
    }

    fn expiry(&self) -> Duration {
        TYPING_EXPIRY
    }
}
