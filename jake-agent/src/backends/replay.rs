// ABOUTME: Replay backend that plays back a recorded JSONL transcript as one turn.
// ABOUTME: Malformed transcript lines are skipped so a damaged recording still replays.

use crate::event::AgentEvent;
use crate::handle::AgentHandle;
use crate::traits::{AgentBackend, ConversationInfo, EventStream, PromptRequest};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::{stream, StreamExt};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Factory config for the replay backend
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayConfig {
    /// Path to a JSONL transcript, one event per line
    pub transcript: PathBuf,
    /// Pause between events, to mimic a live producer
    #[serde(default)]
    pub delay_ms: u64,
}

/// Backend that replays the same recorded turn for every prompt
pub struct ReplayBackend {
    events: Vec<AgentEvent>,
    delay: Duration,
    source: Option<PathBuf>,
}

impl ReplayBackend {
    /// Create a replay backend from in-memory events
    pub fn from_events(events: Vec<AgentEvent>) -> Self {
        Self {
            events,
            delay: Duration::ZERO,
            source: None,
        }
    }

    /// Load a transcript from a JSONL file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read transcript: {}", path.display()))?;
        let events = parse_transcript(&content);
        tracing::info!(path = %path.display(), events = events.len(), "Transcript loaded");
        Ok(Self {
            events,
            delay: Duration::ZERO,
            source: Some(path.to_path_buf()),
        })
    }

    /// Pause between replayed events
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Events this backend replays
    pub fn events(&self) -> &[AgentEvent] {
        &self.events
    }

    /// Convert into an AgentHandle that replays the transcript
    pub fn into_handle(self) -> AgentHandle {
        AgentHandle::spawn(self)
    }

    /// Factory function for the registry
    pub fn factory() -> crate::registry::BackendFactory {
        Box::new(|config| {
            let cfg: ReplayConfig = serde_json::from_value(config.clone())
                .context("Invalid replay backend config")?;
            let backend = ReplayBackend::load(&cfg.transcript)?
                .with_delay(Duration::from_millis(cfg.delay_ms));
            Ok(backend.into_handle())
        })
    }
}

impl AgentBackend for ReplayBackend {
    fn name(&self) -> &'static str {
        "replay"
    }

    fn execute<'a>(&'a self, request: &'a PromptRequest) -> BoxFuture<'a, Result<EventStream<'a>>> {
        Box::pin(async move {
            tracing::debug!(
                prompt_len = request.message.len(),
                events = self.events.len(),
                "Replaying transcript"
            );
            let delay = self.delay;
            let events = stream::iter(self.events.iter().cloned()).then(move |event| async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok::<_, anyhow::Error>(event)
            });
            Ok(Box::pin(events) as EventStream<'a>)
        })
    }

    fn list_conversations<'a>(
        &'a self,
        _workdir: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Vec<ConversationInfo>>> {
        Box::pin(async move {
            let Some(path) = &self.source else {
                return Ok(Vec::new());
            };
            let timestamp: DateTime<Utc> = tokio::fs::metadata(path)
                .await
                .and_then(|m| m.modified())
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            let id = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(vec![ConversationInfo {
                title: id.clone(),
                id,
                timestamp,
                project: path
                    .parent()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            }])
        })
    }
}

/// Parse a JSONL transcript. Blank lines are ignored and lines that do not
/// deserialize into an event are logged and skipped.
pub fn parse_transcript(content: &str) -> Vec<AgentEvent> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(idx, line)| match serde_json::from_str::<AgentEvent>(line) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(line = idx + 1, error = %e, "Skipping malformed transcript line");
                None
            }
        })
        .collect()
}

/// Write events as a JSONL transcript
pub async fn write_transcript(path: &Path, events: &[AgentEvent]) -> Result<()> {
    let mut out = String::new();
    for event in events {
        out.push_str(&serde_json::to_string(event)?);
        out.push('\n');
    }
    tokio::fs::write(path, out)
        .await
        .with_context(|| format!("Failed to write transcript: {}", path.display()))
}
