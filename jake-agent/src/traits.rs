// ABOUTME: Core AgentBackend trait that all backends implement.
// ABOUTME: Defines prompt execution and conversation listing interface.

use crate::AgentEvent;
use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// A single user turn to run against a backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRequest {
    /// Working directory the assistant operates in
    pub workdir: String,
    /// The user's message
    pub message: String,
    /// Session token from a previous turn, if resuming
    pub session_id: Option<String>,
}

impl PromptRequest {
    pub fn new(workdir: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            workdir: workdir.into(),
            message: message.into(),
            session_id: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// A past conversation a backend can resume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationInfo {
    pub id: String,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub project: String,
}

/// Stream of events for one turn. Items are `Err` when the producer fails.
pub type EventStream<'a> = BoxStream<'a, Result<AgentEvent>>;

/// Core trait that all agent backends implement.
///
/// The trait methods return boxed futures so the worker behind an
/// `AgentHandle` can drive any backend without knowing its concrete type.
pub trait AgentBackend {
    /// Backend name for logging and metrics
    fn name(&self) -> &'static str;

    /// Run one turn and return its event stream.
    ///
    /// The stream emits block events as they occur and ends with a
    /// `Complete` or `FatalError` event.
    fn execute<'a>(&'a self, request: &'a PromptRequest) -> BoxFuture<'a, Result<EventStream<'a>>>;

    /// Best-effort listing of past conversations, newest first
    fn list_conversations<'a>(
        &'a self,
        workdir: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Vec<ConversationInfo>>>;
}
