// ABOUTME: Ports the stream coordinator depends on: the chat platform and the renderer.
// ABOUTME: Typing presence is an optional capability exposed by the platform.

use anyhow::Result;
use async_trait::async_trait;
use jake_agent::{BlockKind, EmittedBlock};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// Platform Port
// =============================================================================

/// Constraints of a chat platform that shape outbound messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformCapabilities {
    /// Maximum characters in a single message (always > 0)
    pub char_limit: usize,
    /// Whether a sent message can be edited in place
    pub supports_edit: bool,
    /// Minimum time between two non-forced flushes
    pub edit_interval: Duration,
    /// Whether the platform has threads (informational)
    pub supports_threads: bool,
}

impl PlatformCapabilities {
    pub fn new(char_limit: usize) -> Self {
        Self {
            char_limit: char_limit.max(1),
            supports_edit: true,
            edit_interval: Duration::from_millis(500),
            supports_threads: false,
        }
    }

    pub fn with_edit(mut self, supports_edit: bool) -> Self {
        self.supports_edit = supports_edit;
        self
    }

    pub fn with_edit_interval(mut self, interval: Duration) -> Self {
        self.edit_interval = interval;
        self
    }

    pub fn with_threads(mut self, supports_threads: bool) -> Self {
        self.supports_threads = supports_threads;
        self
    }
}

/// Reference to a message the platform has accepted
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub channel_id: String,
    pub message_id: String,
}

impl MessageRef {
    pub fn new(channel_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            message_id: message_id.into(),
        }
    }
}

/// Outbound side of a chat platform.
///
/// Failures from `send` and `edit` propagate out of a run; nothing retries them.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Platform identifier (e.g., "console", "telegram")
    fn platform_id(&self) -> &'static str;

    fn capabilities(&self) -> PlatformCapabilities;

    /// Send a new message to a channel
    async fn send(&self, channel_id: &str, text: &str) -> Result<MessageRef>;

    /// Replace the content of a previously sent message
    async fn edit(&self, message: &MessageRef, text: &str) -> Result<()>;

    /// Optional: typing indicator support
    fn typing_indicator(&self) -> Option<Arc<dyn TypingIndicator>> {
        None
    }
}

/// Typing indicator capability
#[async_trait]
pub trait TypingIndicator: Send + Sync {
    /// Set typing indicator on/off for a channel
    async fn set_typing(&self, channel_id: &str, typing: bool) -> Result<()>;

    /// How long the platform shows the indicator after one signal
    fn expiry(&self) -> Duration {
        Duration::from_secs(10)
    }
}

// =============================================================================
// Renderer Port
// =============================================================================

/// Turns semantic content into display text. Owns every markup decision.
///
/// Implementations must be total: every method returns a string for any
/// input and never fails.
pub trait Renderer: Send + Sync {
    /// Render the full accumulated content of a streaming block. Called again
    /// on every delta with the grown content; returns a complete replacement.
    fn render_streaming(&self, kind: BlockKind, content: &str) -> String;

    /// Header announcing a tool invocation
    fn render_tool_header(&self, tool_name: &str, input: &Value) -> String;

    /// Output of a tool; empty input renders empty
    fn render_tool_result(&self, text: &str, is_error: bool) -> String;

    /// One-shot blocks (errors and system notices)
    fn render_emit(&self, block: &EmittedBlock) -> String;

    /// Text for a fatal error that ended the turn
    fn render_fatal_error(&self, message: &str) -> String;

    /// Optional completion footer
    fn render_footer(&self, _duration_ms: Option<u64>, _cost_usd: Option<f64>) -> Option<String> {
        None
    }

    /// Optional: defeat automatic link previews
    fn suppress_embeds(&self, text: &str) -> String {
        text.to_string()
    }
}
