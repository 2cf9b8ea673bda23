// ABOUTME: Stream coordinator: relays one turn's agent events into chat messages.
// ABOUTME: Re-renders growing blocks, throttles edits, splits at the size limit and repairs code fences.

use crate::metrics::{self, RunOutcome};
use crate::traits::{ChatPlatform, MessageRef, PlatformCapabilities, Renderer};
use crate::typing::{refresh_interval, TypingKeepalive};
use crate::utils::{
    byte_index, char_len, skip_chars, split_chars, take_chars, unclosed_fence, FENCE,
};
use anyhow::{Context, Result};
use jake_agent::{AgentEvent, BlockKind, EmittedBlock, EventPayload};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_stream::{Stream, StreamExt};

/// Appended to a message head that was cut inside a code block
const CLOSE_FENCE: &str = "\n```";

/// Per-coordinator tuning that is not a platform capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOptions {
    /// Stop refreshing the typing indicator after this long
    pub typing_max_duration: Duration,
    /// Override the refresh period derived from the indicator's expiry
    pub typing_interval: Option<Duration>,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            typing_max_duration: Duration::from_secs(600),
            typing_interval: None,
        }
    }
}

impl StreamOptions {
    pub fn with_typing_max_duration(mut self, max: Duration) -> Self {
        self.typing_max_duration = max;
        self
    }

    pub fn with_typing_interval(mut self, interval: Duration) -> Self {
        self.typing_interval = Some(interval);
        self
    }
}

/// Relays agent turns to a chat platform.
///
/// The coordinator holds no per-run state, so one instance can serve many
/// concurrent runs on different channels.
#[derive(Clone)]
pub struct StreamCoordinator {
    platform: Arc<dyn ChatPlatform>,
    renderer: Arc<dyn Renderer>,
    options: StreamOptions,
}

impl StreamCoordinator {
    pub fn new(platform: Arc<dyn ChatPlatform>, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            platform,
            renderer,
            options: StreamOptions::default(),
        }
    }

    pub fn with_options(mut self, options: StreamOptions) -> Self {
        self.options = options;
        self
    }

    /// Relay one turn into `channel_id`.
    ///
    /// Returns the terminal event (`Complete` or `FatalError`), or `None` when
    /// the source ended without one. Platform failures and producer errors
    /// end the run with `Err`. Dropping the returned future abandons the run.
    pub async fn coordinate<S>(&self, channel_id: &str, events: S) -> Result<Option<AgentEvent>>
    where
        S: Stream<Item = Result<AgentEvent>>,
    {
        let started = Instant::now();
        let result = self.run(channel_id, events).await;

        let outcome = match &result {
            Ok(Some(event)) if matches!(event.payload, EventPayload::Complete { .. }) => {
                RunOutcome::Complete
            }
            Ok(Some(_)) => RunOutcome::FatalError,
            Ok(None) => RunOutcome::Incomplete,
            Err(_) => RunOutcome::Failed,
        };
        metrics::record_run(outcome, started.elapsed());
        tracing::info!(
            channel_id = %channel_id,
            platform = self.platform.platform_id(),
            outcome = outcome.as_str(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Run finished"
        );
        result
    }

    async fn run<S>(&self, channel_id: &str, events: S) -> Result<Option<AgentEvent>>
    where
        S: Stream<Item = Result<AgentEvent>>,
    {
        let caps = self.platform.capabilities();
        tracing::debug!(
            channel_id = %channel_id,
            char_limit = caps.char_limit,
            supports_edit = caps.supports_edit,
            edit_interval_ms = caps.edit_interval.as_millis() as u64,
            "Starting run"
        );

        let typing = match self.platform.typing_indicator() {
            Some(indicator) => {
                let interval = self
                    .options
                    .typing_interval
                    .unwrap_or_else(|| refresh_interval(indicator.expiry()));
                Some(
                    TypingKeepalive::start(
                        indicator,
                        channel_id,
                        interval,
                        self.options.typing_max_duration,
                    )
                    .await,
                )
            }
            None => None,
        };

        let mut run = RunState {
            platform: self.platform.as_ref(),
            renderer: self.renderer.as_ref(),
            channel_id,
            caps,
            buffer: String::new(),
            open_blocks: HashMap::new(),
            message: None,
            last_flush: None,
            typing,
        };

        let mut events = std::pin::pin!(events);
        let mut terminal = None;
        while let Some(item) = events.next().await {
            let event = item.context("Event source failed")?;
            if event.is_terminal() {
                terminal = Some(event);
                break;
            }
            run.handle(event.payload).await?;
        }

        match terminal.as_ref().map(|e| &e.payload) {
            Some(EventPayload::Complete {
                duration_ms,
                cost_usd,
                ..
            }) => {
                if let Some(footer) = self.renderer.render_footer(*duration_ms, *cost_usd) {
                    run.append_trailer(&footer);
                }
            }
            Some(EventPayload::FatalError { message, .. }) => {
                let text = self.renderer.render_fatal_error(message);
                run.append_trailer(&text);
            }
            _ => {
                tracing::warn!(channel_id = %channel_id, "Event source ended without a terminal event");
            }
        }

        run.finalize().await?;

        // Only after the last message is out
        if let Some(typing) = run.typing.take() {
            typing.stop().await;
        }

        Ok(terminal)
    }
}

/// A streaming block that has been opened and not yet closed
#[derive(Debug)]
struct OpenBlock {
    kind: BlockKind,
    content: String,
    /// Char position in the buffer where this block's render begins
    offset: usize,
    /// Chars of this block's render currently in the buffer
    len: usize,
    /// Leading chars of this block's render that already left the buffer
    committed: usize,
}

impl OpenBlock {
    /// Shift this block after `removed` chars left the front of the buffer.
    /// Chars of its own render that went out count as committed.
    fn consume_front(&mut self, removed: usize) {
        if removed <= self.offset {
            self.offset -= removed;
        } else {
            let eaten = (removed - self.offset).min(self.len);
            self.committed += eaten;
            self.len -= eaten;
            self.offset = 0;
        }
    }
}

/// The message currently open for edits and the text it shows
#[derive(Debug)]
struct CurrentMessage {
    reference: MessageRef,
    text: String,
}

/// State of a single run, owned by one `coordinate` call
struct RunState<'a> {
    platform: &'a dyn ChatPlatform,
    renderer: &'a dyn Renderer,
    channel_id: &'a str,
    caps: PlatformCapabilities,
    buffer: String,
    open_blocks: HashMap<String, OpenBlock>,
    message: Option<CurrentMessage>,
    last_flush: Option<Instant>,
    typing: Option<TypingKeepalive>,
}

impl RunState<'_> {
    async fn handle(&mut self, payload: EventPayload) -> Result<()> {
        match payload {
            EventPayload::BlockOpen { id, kind } => {
                if self.open_blocks.contains_key(&id) {
                    tracing::debug!(block_id = %id, "Ignoring duplicate block open");
                    return Ok(());
                }
                let offset = char_len(&self.buffer);
                self.open_blocks.insert(
                    id,
                    OpenBlock {
                        kind,
                        content: String::new(),
                        offset,
                        len: 0,
                        committed: 0,
                    },
                );
            }
            EventPayload::BlockDelta { block_id, delta } => {
                if !self.apply_delta(&block_id, &delta) {
                    tracing::debug!(block_id = %block_id, "Ignoring delta for unknown block");
                    return Ok(());
                }
                self.split().await?;
                self.flush(false).await?;
            }
            EventPayload::BlockClose { block_id } => {
                if self.open_blocks.remove(&block_id).is_none() {
                    tracing::debug!(block_id = %block_id, "Ignoring close for unknown block");
                }
            }
            EventPayload::BlockEmit { block } => self.handle_emit(block).await?,
            EventPayload::Complete { .. } | EventPayload::FatalError { .. } => {
                // Terminal events end the loop before reaching here
            }
        }
        Ok(())
    }

    async fn handle_emit(&mut self, block: EmittedBlock) -> Result<()> {
        match &block {
            EmittedBlock::ToolUse {
                tool_name, input, ..
            } => {
                // Tool headers always get a message of their own
                self.finalize().await?;
                self.buffer = self.renderer.render_tool_header(tool_name, input);
                self.finalize().await?;
            }
            EmittedBlock::ToolResult {
                is_error, content, ..
            } => {
                let rendered = self
                    .renderer
                    .render_tool_result(&content.to_text(), *is_error);
                if rendered.is_empty() {
                    return Ok(());
                }
                self.buffer.push_str(&rendered);
                self.finalize().await?;
            }
            EmittedBlock::Error { .. } | EmittedBlock::System { .. } => {
                let rendered = self.renderer.render_emit(&block);
                self.buffer.push_str(&rendered);
                self.split().await?;
                self.flush(false).await?;
            }
        }
        Ok(())
    }

    /// Re-render a block with the delta appended and replace its span in the
    /// buffer. Returns false if the block is not open.
    fn apply_delta(&mut self, block_id: &str, delta: &str) -> bool {
        let Some(block) = self.open_blocks.get_mut(block_id) else {
            return false;
        };
        block.content.push_str(delta);
        let rendered = self.renderer.render_streaming(block.kind, &block.content);
        let visible = skip_chars(&rendered, block.committed);

        let keep = take_chars(&self.buffer, block.offset).len();
        self.buffer.truncate(keep);
        block.offset = char_len(&self.buffer);
        block.len = char_len(visible);
        self.buffer.push_str(visible);
        true
    }

    fn append_trailer(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        self.buffer.push_str(text);
    }

    /// Account for `removed` chars leaving the front of the buffer
    fn consume_front(&mut self, removed: usize) {
        for block in self.open_blocks.values_mut() {
            block.consume_front(removed);
        }
    }

    /// Account for `added` chars inserted at the front of the buffer
    fn prepend_front(&mut self, added: usize) {
        for block in self.open_blocks.values_mut() {
            block.offset += added;
        }
    }

    /// Send whole messages while the buffer exceeds the size limit
    async fn split(&mut self) -> Result<()> {
        let limit = self.caps.char_limit;
        while char_len(&self.buffer) > limit {
            let (cut, fence) = self.split_point(limit);
            let (head, tail) = split_chars(&self.buffer, cut);
            let mut head = head.to_string();
            let tail = tail.to_string();

            let reopen = match fence {
                Some(fence) => {
                    head.push_str(CLOSE_FENCE);
                    format!("{fence}\n")
                }
                None => String::new(),
            };

            tracing::debug!(
                channel_id = %self.channel_id,
                cut,
                repaired_fence = !reopen.is_empty(),
                "Splitting message at size limit"
            );
            metrics::record_message_split(self.platform.platform_id());

            self.deliver(&head).await?;
            self.message = None;

            self.consume_front(cut);
            self.prepend_front(char_len(&reopen));
            self.buffer = reopen + &tail;
        }
        Ok(())
    }

    /// Where to cut an overflowing buffer, and the fence to reopen after the
    /// cut if the head would leave a code block open.
    fn split_point(&self, limit: usize) -> (usize, Option<String>) {
        let cut = self.fence_safe_cut(limit);
        let Some(fence) = unclosed_fence(take_chars(&self.buffer, cut)) else {
            return (cut, None);
        };
        // Leave room for the closing fence inside the limit
        let reserve = char_len(CLOSE_FENCE);
        if cut <= reserve + char_len(fence) + 1 {
            return (cut, None);
        }
        let repaired = self.fence_safe_cut(cut - reserve);

        let fence = unclosed_fence(take_chars(&self.buffer, repaired)).map(str::to_string);
        let reopen_len = fence.as_deref().map_or(0, |f| char_len(f) + 1);
        // The reopened tail must end up shorter than the buffer was
        if repaired <= reopen_len {
            return (cut, None);
        }
        (repaired, fence)
    }

    /// Pull a cut that lands inside a fence line back to the start of that
    /// line so the fence moves whole into the next message. A fence line at
    /// the very start of the buffer keeps the original cut.
    fn fence_safe_cut(&self, cut: usize) -> usize {
        let cut_byte = byte_index(&self.buffer, cut);
        let line_start = self.buffer[..cut_byte].rfind('\n').map_or(0, |i| i + 1);
        let line_end = self.buffer[cut_byte..]
            .find('\n')
            .map_or(self.buffer.len(), |i| cut_byte + i);
        if line_start > 0
            && line_start < cut_byte
            && cut_byte < line_end
            && self.buffer[line_start..line_end].trim().starts_with(FENCE)
        {
            return char_len(&self.buffer[..line_start]);
        }
        cut
    }

    /// Push the buffer out. Non-forced flushes are throttled by the edit
    /// interval and skipped entirely on platforms that cannot edit.
    async fn flush(&mut self, force: bool) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        if !force {
            if !self.caps.supports_edit {
                return Ok(());
            }
            if let Some(last) = self.last_flush {
                if last.elapsed() < self.caps.edit_interval {
                    return Ok(());
                }
            }
        }
        let text = take_chars(&self.buffer, self.caps.char_limit).to_string();
        self.deliver(&text).await
    }

    /// Send a new message or edit the current one
    async fn deliver(&mut self, text: &str) -> Result<()> {
        let platform_id = self.platform.platform_id();
        let editable = self
            .message
            .as_mut()
            .filter(|_| self.caps.supports_edit);
        match editable {
            Some(current) => {
                // Platforms reject edits that change nothing
                if current.text != text {
                    self.platform
                        .edit(&current.reference, text)
                        .await
                        .with_context(|| {
                            format!("Failed to edit message {}", current.reference.message_id)
                        })?;
                    current.text = text.to_string();
                    metrics::record_message_edited(platform_id);
                }
            }
            None => {
                let message = self
                    .platform
                    .send(self.channel_id, text)
                    .await
                    .with_context(|| format!("Failed to send message to {}", self.channel_id))?;
                tracing::debug!(
                    channel_id = %self.channel_id,
                    message_id = %message.message_id,
                    chars = char_len(text),
                    "Sent message"
                );
                metrics::record_message_sent(platform_id);
                self.message = Some(CurrentMessage {
                    reference: message,
                    text: text.to_string(),
                });
                if let Some(typing) = &self.typing {
                    typing.refresh().await;
                }
            }
        }
        self.last_flush = Some(Instant::now());
        Ok(())
    }

    /// Send whatever is buffered as finished message(s) and start fresh
    async fn finalize(&mut self) -> Result<()> {
        if !self.buffer.is_empty() {
            self.split().await?;
            self.flush(true).await?;
        }
        let removed = char_len(&self.buffer);
        self.consume_front(removed);
        self.buffer.clear();
        self.message = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(offset: usize, len: usize) -> OpenBlock {
        OpenBlock {
            kind: BlockKind::Text,
            content: String::new(),
            offset,
            len,
            committed: 0,
        }
    }

    #[test]
    fn test_options_builder() {
        let options = StreamOptions::default()
            .with_typing_max_duration(Duration::from_secs(5))
            .with_typing_interval(Duration::from_secs(1));
        assert_eq!(options.typing_max_duration, Duration::from_secs(5));
        assert_eq!(options.typing_interval, Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_block_accounting_after_front_removal() {
        let mut blocks = HashMap::new();
        blocks.insert("before".to_string(), block(10, 5));
        blocks.insert("straddling".to_string(), block(2, 8));
        blocks.insert("swallowed".to_string(), block(0, 3));

        for b in blocks.values_mut() {
            b.consume_front(6);
        }

        let before = &blocks["before"];
        assert_eq!((before.offset, before.len, before.committed), (4, 5, 0));
        let straddling = &blocks["straddling"];
        assert_eq!((straddling.offset, straddling.len, straddling.committed), (0, 4, 4));
        let swallowed = &blocks["swallowed"];
        assert_eq!((swallowed.offset, swallowed.len, swallowed.committed), (0, 0, 3));
    }
}
