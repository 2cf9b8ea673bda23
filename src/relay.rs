// ABOUTME: Relay ties a backend, the active conversation store and the stream coordinator together.
// ABOUTME: Chat input is either a conversation command or a prompt relayed as one coordinated turn.

use crate::commands::{parse_input, Command, Input, HELP_TEXT};
use anyhow::{Context, Result};
use jake_agent::{AgentEvent, AgentHandle, AgentRegistry, PromptRequest};
use jake_core::config::Config;
use jake_core::metrics;
use jake_core::session::resolve_workdir;
use jake_core::{
    ActiveConversation, ActiveConversations, ChatPlatform, MarkdownRenderer, StreamCoordinator,
};
use std::sync::Arc;

/// Reply to commands from users outside the allow-list
pub const NOT_AUTHORIZED: &str = "Not authorized.";

/// Past conversations shown by `/conversations`
const MAX_LISTED_CONVERSATIONS: usize = 15;

/// What `Relay::handle_message` did with a line of chat input
#[derive(Debug)]
pub enum MessageOutcome {
    /// A command ran and this reply was sent to the channel
    Replied(String),
    /// The text was relayed to the backend as a prompt
    Relayed(Option<AgentEvent>),
    /// Nothing was sent
    Ignored,
}

/// A user's prompt addressed to a channel
#[derive(Debug, Clone)]
pub struct Prompt {
    pub user_id: String,
    pub channel_id: String,
    pub text: String,
    /// Working directory for a new conversation, relative to the configured base
    pub workdir: Option<String>,
}

impl Prompt {
    pub fn new(
        user_id: impl Into<String>,
        channel_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            channel_id: channel_id.into(),
            text: text.into(),
            workdir: None,
        }
    }

    pub fn with_workdir(mut self, workdir: impl Into<String>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }
}

/// Serves prompts against one backend and relays the answers to one platform
pub struct Relay {
    config: Arc<Config>,
    backend: AgentHandle,
    conversations: ActiveConversations,
    platform: Arc<dyn ChatPlatform>,
    coordinator: StreamCoordinator,
}

impl Relay {
    /// Build a relay whose backend comes from the `[backend]` section
    pub fn from_config(
        config: Arc<Config>,
        registry: &AgentRegistry,
        platform: Arc<dyn ChatPlatform>,
    ) -> Result<Self> {
        let backend = registry
            .create_from_config(&config.backend)
            .with_context(|| format!("Failed to create backend '{}'", config.backend.backend_type()))?;
        Ok(Self::new(config, backend, platform))
    }

    pub fn new(config: Arc<Config>, backend: AgentHandle, platform: Arc<dyn ChatPlatform>) -> Self {
        let renderer =
            MarkdownRenderer::new().with_suppress_embeds(config.stream.suppress_embeds);
        let coordinator = StreamCoordinator::new(Arc::clone(&platform), Arc::new(renderer))
            .with_options(config.stream_options());
        Self {
            config,
            backend,
            conversations: ActiveConversations::new(),
            platform,
            coordinator,
        }
    }

    pub fn conversations(&self) -> &ActiveConversations {
        &self.conversations
    }

    /// Run one turn for `prompt` and relay it into the prompt's channel.
    ///
    /// Returns the turn's terminal event, or `None` if the backend stopped
    /// without one.
    pub async fn handle_prompt(&self, prompt: &Prompt) -> Result<Option<AgentEvent>> {
        let conversation = match self.conversations.get(&prompt.user_id, &prompt.channel_id) {
            Some(existing) => existing,
            None => {
                let workdir = resolve_workdir(
                    &self.config.workspace.base_workdir,
                    prompt.workdir.as_deref(),
                )?;
                let conversation = ActiveConversation::new(self.backend.name(), workdir);
                self.conversations
                    .set(&prompt.user_id, &prompt.channel_id, conversation.clone());
                conversation
            }
        };

        tracing::info!(
            user_id = %prompt.user_id,
            channel_id = %prompt.channel_id,
            backend = %conversation.backend_id,
            workdir = %conversation.workdir.display(),
            resuming = conversation.session_id.is_some(),
            "Relaying prompt"
        );

        let mut request =
            PromptRequest::new(conversation.workdir.to_string_lossy(), prompt.text.as_str());
        if let Some(session_id) = &conversation.session_id {
            request = request.with_session(session_id.as_str());
        }

        let events = self.backend.execute(request).await?;
        let terminal = self
            .coordinator
            .coordinate(&prompt.channel_id, events)
            .await?;

        if let Some(session_id) = terminal.as_ref().and_then(AgentEvent::session_id) {
            self.conversations
                .update_session_id(&prompt.user_id, &prompt.channel_id, session_id);
        }
        Ok(terminal)
    }

    /// Handle one line of chat input from `user_id` in `channel_id`.
    ///
    /// Commands always get a reply, `Not authorized.` for users outside the
    /// allow-list. Other text is relayed only for allowed users who have an
    /// active conversation in the channel.
    pub async fn handle_message(
        &self,
        user_id: &str,
        channel_id: &str,
        text: &str,
    ) -> Result<MessageOutcome> {
        let allowed = self
            .config
            .is_allowed(self.platform.platform_id(), user_id, channel_id);

        match parse_input(text) {
            Input::Ignore => Ok(MessageOutcome::Ignored),
            Input::Command(command) => {
                let reply = if allowed {
                    metrics::record_command(command.name());
                    self.run_command(user_id, channel_id, &command).await?
                } else {
                    tracing::warn!(
                        user_id = %user_id,
                        channel_id = %channel_id,
                        command = command.name(),
                        "Refusing command from user not on the allow-list"
                    );
                    NOT_AUTHORIZED.to_string()
                };
                self.platform
                    .send(channel_id, &reply)
                    .await
                    .context("Failed to send command reply")?;
                Ok(MessageOutcome::Replied(reply))
            }
            Input::Message(text) => {
                if !allowed {
                    tracing::debug!(user_id = %user_id, "Ignoring message from user not on the allow-list");
                    return Ok(MessageOutcome::Ignored);
                }
                if self.conversations.get(user_id, channel_id).is_none() {
                    tracing::debug!(
                        user_id = %user_id,
                        channel_id = %channel_id,
                        "Ignoring message outside a conversation"
                    );
                    return Ok(MessageOutcome::Ignored);
                }
                let terminal = self
                    .handle_prompt(&Prompt::new(user_id, channel_id, text))
                    .await?;
                Ok(MessageOutcome::Relayed(terminal))
            }
        }
    }

    /// Run an allowed command and return the reply text. User mistakes
    /// such as a missing workdir become replies; backend failures are errors.
    async fn run_command(&self, user_id: &str, channel_id: &str, command: &Command) -> Result<String> {
        let reply = match command {
            Command::Start { workdir } => {
                match self.start(user_id, channel_id, workdir.as_deref(), None) {
                    Ok(conversation) => format!(
                        "Started a new {} conversation.\nWorkdir: `{}`\nSend messages in this channel to talk to it. Use `/end` to stop.",
                        conversation.backend_id,
                        conversation.workdir.display()
                    ),
                    Err(err) => format!("❌ {err}"),
                }
            }
            Command::Resume {
                session_id: Some(session_id),
                workdir,
            } => match self.start(user_id, channel_id, workdir.as_deref(), Some(session_id.as_str())) {
                Ok(conversation) => format!(
                    "Resumed conversation `{}...`\nWorkdir: `{}`\nSend messages to continue.",
                    session_id.chars().take(12).collect::<String>(),
                    conversation.workdir.display()
                ),
                Err(err) => format!("❌ {err}"),
            },
            Command::Resume {
                session_id: None, ..
            } => "Usage: /resume <session_id> [workdir]".to_string(),
            Command::End => {
                if self.conversations.remove(user_id, channel_id) {
                    tracing::info!(user_id = %user_id, channel_id = %channel_id, "Conversation ended");
                    "Conversation ended.".to_string()
                } else {
                    "No active conversation in this channel.".to_string()
                }
            }
            Command::Status => match self.conversations.get(user_id, channel_id) {
                Some(conversation) => format!(
                    "**Backend:** {}\n**Workdir:** `{}`\n**Session:** `{}`",
                    conversation.backend_id,
                    conversation.workdir.display(),
                    conversation
                        .session_id
                        .as_deref()
                        .unwrap_or("not yet assigned")
                ),
                None => "No active conversation in this channel.".to_string(),
            },
            Command::Conversations => {
                let conversations = self
                    .backend
                    .list_conversations(None)
                    .await
                    .context("Failed to list conversations")?;
                if conversations.is_empty() {
                    "No past conversations found.".to_string()
                } else {
                    conversations
                        .iter()
                        .take(MAX_LISTED_CONVERSATIONS)
                        .map(|c| {
                            format!(
                                "`{}` · {} ({})",
                                c.id.chars().take(12).collect::<String>(),
                                c.title,
                                c.timestamp.format("%Y-%m-%d %H:%M")
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            Command::Help => HELP_TEXT.to_string(),
            Command::Unknown(name) => format!("Unknown command `/{name}`. Try /help."),
        };
        Ok(reply)
    }

    /// Begin (or replace) the conversation in a channel, optionally
    /// resuming a known session
    fn start(
        &self,
        user_id: &str,
        channel_id: &str,
        workdir: Option<&str>,
        session_id: Option<&str>,
    ) -> Result<ActiveConversation> {
        let workdir = resolve_workdir(&self.config.workspace.base_workdir, workdir)?;
        let conversation = ActiveConversation {
            session_id: session_id.map(str::to_string),
            ..ActiveConversation::new(self.backend.name(), workdir)
        };
        self.conversations
            .set(user_id, channel_id, conversation.clone());
        tracing::info!(
            user_id = %user_id,
            channel_id = %channel_id,
            workdir = %conversation.workdir.display(),
            resuming = conversation.session_id.is_some(),
            "Conversation started"
        );
        Ok(conversation)
    }
}
