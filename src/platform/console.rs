// ABOUTME: Console platform that prints messages and their edits to stdout.
// ABOUTME: Records every call so a run can be inspected after it finishes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use jake_core::traits::{ChatPlatform, MessageRef, PlatformCapabilities, TypingIndicator};
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One call the coordinator made against the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCall {
    Send {
        channel_id: String,
        message_id: String,
        text: String,
    },
    Edit {
        message_id: String,
        text: String,
    },
    Typing {
        channel_id: String,
        typing: bool,
    },
}

type CallLog = Arc<Mutex<Vec<ConsoleCall>>>;

/// Chat platform backed by the terminal
pub struct ConsolePlatform {
    caps: PlatformCapabilities,
    next_id: AtomicU64,
    calls: CallLog,
    echo: bool,
    typing: Option<Arc<ConsoleTyping>>,
}

impl ConsolePlatform {
    pub fn new(caps: PlatformCapabilities) -> Self {
        Self {
            caps,
            next_id: AtomicU64::new(1),
            calls: Arc::new(Mutex::new(Vec::new())),
            echo: true,
            typing: None,
        }
    }

    /// Record calls without printing them
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    /// Expose a typing indicator that expires after `expiry`
    pub fn with_typing(mut self, expiry: Duration) -> Self {
        self.typing = Some(Arc::new(ConsoleTyping {
            calls: Arc::clone(&self.calls),
            expiry,
        }));
        self
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<ConsoleCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Final text of every message, in send order
    pub fn transcript(&self) -> Vec<String> {
        let mut messages: Vec<(String, String)> = Vec::new();
        for call in self.calls() {
            match call {
                ConsoleCall::Send {
                    message_id, text, ..
                } => messages.push((message_id, text)),
                ConsoleCall::Edit { message_id, text } => {
                    if let Some(entry) = messages.iter_mut().find(|(id, _)| *id == message_id) {
                        entry.1 = text;
                    }
                }
                ConsoleCall::Typing { .. } => {}
            }
        }
        messages.into_iter().map(|(_, text)| text).collect()
    }

    fn record(&self, call: ConsoleCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    fn print(&self, header: &str, text: &str) -> Result<()> {
        if !self.echo {
            return Ok(());
        }
        let mut out = std::io::stdout().lock();
        writeln!(out, "── {header} ──\n{text}").context("Failed to write to stdout")?;
        out.flush().context("Failed to flush stdout")
    }
}

#[async_trait]
impl ChatPlatform for ConsolePlatform {
    fn platform_id(&self) -> &'static str {
        "console"
    }

    fn capabilities(&self) -> PlatformCapabilities {
        self.caps
    }

    async fn send(&self, channel_id: &str, text: &str) -> Result<MessageRef> {
        let message_id = format!("m{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        self.print(&format!("{channel_id} · {message_id}"), text)?;
        self.record(ConsoleCall::Send {
            channel_id: channel_id.to_string(),
            message_id: message_id.clone(),
            text: text.to_string(),
        });
        Ok(MessageRef::new(channel_id, message_id))
    }

    async fn edit(&self, message: &MessageRef, text: &str) -> Result<()> {
        let known = self.calls().iter().any(|call| {
            matches!(call, ConsoleCall::Send { message_id, .. } if *message_id == message.message_id)
        });
        if !known {
            anyhow::bail!("Unknown message: {}", message.message_id);
        }
        self.print(
            &format!("{} · {} (edited)", message.channel_id, message.message_id),
            text,
        )?;
        self.record(ConsoleCall::Edit {
            message_id: message.message_id.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    fn typing_indicator(&self) -> Option<Arc<dyn TypingIndicator>> {
        self.typing
            .as_ref()
            .map(|typing| Arc::clone(typing) as Arc<dyn TypingIndicator>)
    }
}

struct ConsoleTyping {
    calls: CallLog,
    expiry: Duration,
}

#[async_trait]
impl TypingIndicator for ConsoleTyping {
    async fn set_typing(&self, channel_id: &str, typing: bool) -> Result<()> {
        tracing::trace!(channel_id = %channel_id, typing, "Typing indicator");
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ConsoleCall::Typing {
                channel_id: channel_id.to_string(),
                typing,
            });
        Ok(())
    }

    fn expiry(&self) -> Duration {
        self.expiry
    }
}
