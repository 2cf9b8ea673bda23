// ABOUTME: Event vocabulary emitted by agent backends during a single conversational turn.
// ABOUTME: Streaming blocks (open/delta/close), one-shot emits, and the two terminal events.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// A single event produced by a backend, stamped with its producer and a
/// monotonic timestamp (milliseconds since the start of the turn).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentEvent {
    /// Backend that produced the event (e.g. "claude", "gemini", "replay")
    pub producer: String,
    /// Milliseconds since the producer started the turn
    #[serde(default)]
    pub timestamp_ms: u64,
    #[serde(flatten)]
    pub payload: EventPayload,
}

/// The closed set of event shapes a backend may produce
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// Begins a streaming block
    BlockOpen { id: String, kind: BlockKind },

    /// Appends text to an open streaming block
    BlockDelta { block_id: String, delta: String },

    /// Ends a streaming block; no further deltas are valid for it
    BlockClose { block_id: String },

    /// A block delivered complete in a single event
    BlockEmit { block: EmittedBlock },

    /// Successful end of the turn
    Complete {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cost_usd: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_ms: Option<u64>,
    },

    /// Unsuccessful end of the turn
    FatalError {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },
}

/// Kinds of streaming blocks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Text,
    Thinking,
}

/// One-shot blocks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum EmittedBlock {
    /// The assistant invoked a tool
    ToolUse {
        id: String,
        /// Human-readable tool name (e.g. "Read", "Process Manager · Restart")
        tool_name: String,
        /// Backend's identifier for this invocation, matched by `ToolResult::tool_use_id`
        tool_id: String,
        #[serde(default)]
        input: Value,
    },

    /// Output of a previous tool invocation
    ToolResult {
        id: String,
        tool_use_id: String,
        #[serde(default)]
        is_error: bool,
        content: ToolResultContent,
    },

    /// Non-terminal error reported by the backend
    Error {
        id: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        #[serde(default)]
        retryable: bool,
    },

    /// Informational notice from the backend
    System {
        id: String,
        subtype: SystemSubtype,
        message: String,
    },
}

/// Subtypes of system notices
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SystemSubtype {
    Init,
    RateLimit,
    Notice,
}

impl SystemSubtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemSubtype::Init => "init",
            SystemSubtype::RateLimit => "rate_limit",
            SystemSubtype::Notice => "notice",
        }
    }
}

/// Content of a tool result in one of its three representations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum ToolResultContent {
    Text { text: String },
    Parts { parts: Vec<ContentPart> },
    Empty,
}

/// A single part of a multi-part tool result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
}

impl ToolResultContent {
    /// Flatten the content to display text. Multi-part results are joined
    /// with newlines; empty parts are skipped.
    pub fn to_text(&self) -> String {
        match self {
            ToolResultContent::Text { text } => text.clone(),
            ToolResultContent::Parts { parts } => parts
                .iter()
                .map(|ContentPart::Text { text }| text.as_str())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
            ToolResultContent::Empty => String::new(),
        }
    }
}

impl AgentEvent {
    pub fn new(producer: impl Into<String>, timestamp_ms: u64, payload: EventPayload) -> Self {
        Self {
            producer: producer.into(),
            timestamp_ms,
            payload,
        }
    }

    /// Whether this event ends the turn
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.payload,
            EventPayload::Complete { .. } | EventPayload::FatalError { .. }
        )
    }

    /// Session token carried by a `Complete` event, if any
    pub fn session_id(&self) -> Option<&str> {
        match &self.payload {
            EventPayload::Complete { session_id, .. } => session_id.as_deref(),
            _ => None,
        }
    }
}

/// Stamps events for one turn with a producer id, a monotonic timestamp and
/// sequential block ids (`b0`, `b1`, ...).
#[derive(Debug)]
pub struct EventStamper {
    producer: String,
    started: Instant,
    next_block: u64,
}

impl EventStamper {
    pub fn new(producer: impl Into<String>) -> Self {
        Self {
            producer: producer.into(),
            started: Instant::now(),
            next_block: 0,
        }
    }

    /// Allocate the next block id for this turn
    pub fn next_block_id(&mut self) -> String {
        let id = format!("b{}", self.next_block);
        self.next_block += 1;
        id
    }

    /// Wrap a payload into a stamped event
    pub fn stamp(&self, payload: EventPayload) -> AgentEvent {
        let elapsed = self.started.elapsed().as_millis() as u64;
        AgentEvent::new(self.producer.clone(), elapsed, payload)
    }

    /// Emit a complete text block as open → delta → close, allocating a fresh id
    pub fn text_block(&mut self, text: &str) -> Vec<AgentEvent> {
        let id = self.next_block_id();
        vec![
            self.stamp(EventPayload::BlockOpen {
                id: id.clone(),
                kind: BlockKind::Text,
            }),
            self.stamp(EventPayload::BlockDelta {
                block_id: id.clone(),
                delta: text.to_string(),
            }),
            self.stamp(EventPayload::BlockClose { block_id: id }),
        ]
    }

    /// Emit a one-shot block, filling in its id
    pub fn emit(&mut self, build: impl FnOnce(String) -> EmittedBlock) -> AgentEvent {
        let id = self.next_block_id();
        self.stamp(EventPayload::BlockEmit { block: build(id) })
    }

    pub fn complete(
        &self,
        session_id: Option<String>,
        cost_usd: Option<f64>,
        duration_ms: Option<u64>,
    ) -> AgentEvent {
        self.stamp(EventPayload::Complete {
            session_id,
            cost_usd,
            duration_ms,
        })
    }

    pub fn fatal(&self, message: impl Into<String>) -> AgentEvent {
        self.stamp(EventPayload::FatalError {
            message: message.into(),
            code: None,
        })
    }
}
