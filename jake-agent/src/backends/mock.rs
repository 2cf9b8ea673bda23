// ABOUTME: Mock backend for testing - returns pre-configured event sequences.
// ABOUTME: Allows deterministic tests without spawning real assistant processes.
//!
//! # Example
//!
//! ```no_run
//! use jake_agent::backends::mock::MockBackend;
//! use jake_agent::{EventPayload, PromptRequest};
//!
//! # async fn example() {
//! let handle = MockBackend::new()
//!     .on_prompt("hello")
//!     .respond_text("Hi there!")
//!     .into_handle();
//!
//! let mut receiver = handle
//!     .execute(PromptRequest::new("/tmp", "hello"))
//!     .await
//!     .unwrap();
//!
//! while let Some(Ok(event)) = receiver.recv().await {
//!     if let EventPayload::BlockDelta { delta, .. } = &event.payload {
//!         assert_eq!(delta, "Hi there!");
//!     }
//! }
//! # }
//! ```

use crate::event::{AgentEvent, EventStamper};
use crate::handle::AgentHandle;
use crate::traits::{AgentBackend, ConversationInfo, EventStream, PromptRequest};
use anyhow::Result;
use futures::future::BoxFuture;
use futures::stream;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

const PRODUCER: &str = "mock";

/// Mock backend for testing
pub struct MockBackend {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    conversations: Vec<ConversationInfo>,
}

struct Expectation {
    pattern: String,
    events: Vec<AgentEvent>,
    /// Producer failure raised after `events` have been delivered
    failure: Option<String>,
}

impl MockBackend {
    /// Create a new mock backend with no expectations
    pub fn new() -> Self {
        Self {
            expectations: Arc::new(Mutex::new(VecDeque::new())),
            conversations: Vec::new(),
        }
    }

    /// Set up an expectation for a prompt matching the given pattern
    pub fn on_prompt(self, pattern: &str) -> ExpectationBuilder {
        ExpectationBuilder {
            backend: self,
            pattern: pattern.to_string(),
        }
    }

    /// Conversations returned by `list_conversations`
    pub fn with_conversations(mut self, conversations: Vec<ConversationInfo>) -> Self {
        self.conversations = conversations;
        self
    }

    /// Convert this backend into an AgentHandle
    pub fn into_handle(self) -> AgentHandle {
        AgentHandle::spawn(self)
    }

    /// Factory function for the registry
    pub fn factory() -> crate::registry::BackendFactory {
        Box::new(|_config| Ok(MockBackend::new().into_handle()))
    }

    fn push(&self, expectation: Expectation) {
        self.expectations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(expectation);
    }

    /// Match expectations with FIFO preference: check the front first, fall
    /// back to the first matching entry anywhere in the queue.
    fn take_matching(&self, text: &str) -> Option<Expectation> {
        let mut exp = self.expectations.lock().unwrap_or_else(|e| e.into_inner());
        let front_matches = exp.front().map(|e| text.contains(&e.pattern))?;
        if front_matches {
            return exp.pop_front();
        }
        let idx = exp.iter().position(|e| text.contains(&e.pattern))?;
        exp.remove(idx)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBackend for MockBackend {
    fn name(&self) -> &'static str {
        PRODUCER
    }

    fn execute<'a>(&'a self, request: &'a PromptRequest) -> BoxFuture<'a, Result<EventStream<'a>>> {
        Box::pin(async move {
            let items: Vec<Result<AgentEvent>> = match self.take_matching(&request.message) {
                Some(expectation) => {
                    let mut items: Vec<Result<AgentEvent>> =
                        expectation.events.into_iter().map(Ok).collect();
                    if let Some(message) = expectation.failure {
                        items.push(Err(anyhow::anyhow!(message)));
                    }
                    items
                }
                None => {
                    tracing::debug!(prompt = %request.message, "No mock expectation matched");
                    let stamper = EventStamper::new(PRODUCER);
                    vec![Ok(stamper.fatal(format!(
                        "Mock: no expectation for '{}'",
                        request.message
                    )))]
                }
            };
            Ok(Box::pin(stream::iter(items)) as EventStream<'a>)
        })
    }

    fn list_conversations<'a>(
        &'a self,
        _workdir: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Vec<ConversationInfo>>> {
        Box::pin(async move { Ok(self.conversations.clone()) })
    }
}

/// Builder for setting up mock expectations with a fluent API
pub struct ExpectationBuilder {
    backend: MockBackend,
    pattern: String,
}

impl ExpectationBuilder {
    /// Respond with a list of events
    pub fn respond_with(self, events: Vec<AgentEvent>) -> MockBackend {
        self.backend.push(Expectation {
            pattern: self.pattern,
            events,
            failure: None,
        });
        self.backend
    }

    /// Respond with a single text block followed by a successful completion
    pub fn respond_text(self, text: &str) -> MockBackend {
        let mut stamper = EventStamper::new(PRODUCER);
        let mut events = stamper.text_block(text);
        events.push(stamper.complete(None, None, None));
        self.respond_with(events)
    }

    /// Respond with a fatal error terminal event
    pub fn respond_fatal(self, message: &str) -> MockBackend {
        let stamper = EventStamper::new(PRODUCER);
        self.respond_with(vec![stamper.fatal(message)])
    }

    /// Deliver `events`, then fail the stream as a crashed producer would
    pub fn respond_then_fail(self, events: Vec<AgentEvent>, message: &str) -> MockBackend {
        self.backend.push(Expectation {
            pattern: self.pattern,
            events,
            failure: Some(message.to_string()),
        });
        self.backend
    }
}
