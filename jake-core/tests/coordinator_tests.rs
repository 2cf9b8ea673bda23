// ABOUTME: Integration tests for the stream coordinator
// ABOUTME: Uses a recording mock platform and a plain pass-through renderer

use async_trait::async_trait;
use futures::stream;
use jake_agent::{
    AgentEvent, BlockKind, EmittedBlock, EventPayload, EventReceiver, ToolResultContent,
};
use jake_core::traits::{
    ChatPlatform, MessageRef, PlatformCapabilities, Renderer, TypingIndicator,
};
use jake_core::{MarkdownRenderer, StreamCoordinator};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

// =============================================================================
// Mocks
// =============================================================================

/// Mock platform that records every call and the final text of every message
struct MockPlatform {
    caps: PlatformCapabilities,
    messages: Mutex<Vec<(String, String)>>,
    log: Arc<Mutex<Vec<String>>>,
    typing: Option<Arc<MockTyping>>,
    fail_sends: bool,
}

impl MockPlatform {
    fn new(char_limit: usize) -> Self {
        Self {
            caps: PlatformCapabilities::new(char_limit)
                .with_edit_interval(Duration::from_millis(500)),
            messages: Mutex::new(Vec::new()),
            log: Arc::new(Mutex::new(Vec::new())),
            typing: None,
            fail_sends: false,
        }
    }

    fn without_edit(mut self) -> Self {
        self.caps = self.caps.with_edit(false);
        self
    }

    fn with_typing(mut self) -> Self {
        self.typing = Some(Arc::new(MockTyping {
            log: self.log.clone(),
        }));
        self
    }

    fn failing(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    /// Final content of every message, in send order
    fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    fn channels(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|(channel, _)| channel.clone())
            .collect()
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Text of every send and edit call
    fn call_texts(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|entry| {
                entry
                    .strip_prefix("send:")
                    .or_else(|| entry.strip_prefix("edit:"))
                    .map(|rest| rest.split_once(':').map(|(_, t)| t.to_string()).unwrap_or_default())
            })
            .collect()
    }

    fn count(&self, prefix: &str) -> usize {
        self.log().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    fn platform_id(&self) -> &'static str {
        "mock"
    }

    fn capabilities(&self) -> PlatformCapabilities {
        self.caps
    }

    async fn send(&self, channel_id: &str, text: &str) -> anyhow::Result<MessageRef> {
        if self.fail_sends {
            anyhow::bail!("platform down");
        }
        let mut messages = self.messages.lock().unwrap();
        let id = messages.len();
        messages.push((channel_id.to_string(), text.to_string()));
        self.log.lock().unwrap().push(format!("send:m{id}:{text}"));
        Ok(MessageRef::new(channel_id, format!("m{id}")))
    }

    async fn edit(&self, message: &MessageRef, text: &str) -> anyhow::Result<()> {
        let idx: usize = message.message_id.trim_start_matches('m').parse()?;
        self.messages.lock().unwrap()[idx].1 = text.to_string();
        self.log
            .lock()
            .unwrap()
            .push(format!("edit:{}:{text}", message.message_id));
        Ok(())
    }

    fn typing_indicator(&self) -> Option<Arc<dyn TypingIndicator>> {
        self.typing
            .clone()
            .map(|t| t as Arc<dyn TypingIndicator>)
    }
}

struct MockTyping {
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl TypingIndicator for MockTyping {
    async fn set_typing(&self, _channel_id: &str, typing: bool) -> anyhow::Result<()> {
        self.log.lock().unwrap().push(format!("typing:{typing}"));
        Ok(())
    }

    fn expiry(&self) -> Duration {
        Duration::from_secs(10)
    }
}

/// Renderer that passes content through so lengths are predictable
struct PlainRenderer {
    footer: bool,
}

impl Renderer for PlainRenderer {
    fn render_streaming(&self, _kind: BlockKind, content: &str) -> String {
        content.to_string()
    }

    fn render_tool_header(&self, tool_name: &str, _input: &Value) -> String {
        format!("[tool {tool_name}]")
    }

    fn render_tool_result(&self, text: &str, is_error: bool) -> String {
        match (text.is_empty(), is_error) {
            (true, _) => String::new(),
            (false, true) => format!("ERR {text}"),
            (false, false) => text.to_string(),
        }
    }

    fn render_emit(&self, block: &EmittedBlock) -> String {
        match block {
            EmittedBlock::Error { message, .. } => format!("[error {message}]"),
            EmittedBlock::System { message, .. } => format!("[system {message}]"),
            _ => String::new(),
        }
    }

    fn render_fatal_error(&self, message: &str) -> String {
        format!("[fatal {message}]")
    }

    fn render_footer(&self, duration_ms: Option<u64>, cost_usd: Option<f64>) -> Option<String> {
        self.footer
            .then(|| format!("[footer {duration_ms:?} {cost_usd:?}]"))
    }
}

// =============================================================================
// Event helpers
// =============================================================================

fn ev(payload: EventPayload) -> AgentEvent {
    AgentEvent::new("test", 0, payload)
}

fn open(id: &str, kind: BlockKind) -> AgentEvent {
    ev(EventPayload::BlockOpen {
        id: id.to_string(),
        kind,
    })
}

fn delta(id: &str, text: &str) -> AgentEvent {
    ev(EventPayload::BlockDelta {
        block_id: id.to_string(),
        delta: text.to_string(),
    })
}

fn close(id: &str) -> AgentEvent {
    ev(EventPayload::BlockClose {
        block_id: id.to_string(),
    })
}

fn complete() -> AgentEvent {
    ev(EventPayload::Complete {
        session_id: None,
        cost_usd: None,
        duration_ms: None,
    })
}

fn fatal(message: &str) -> AgentEvent {
    ev(EventPayload::FatalError {
        message: message.to_string(),
        code: None,
    })
}

fn tool_use(name: &str, input: Value) -> AgentEvent {
    ev(EventPayload::BlockEmit {
        block: EmittedBlock::ToolUse {
            id: "t1".to_string(),
            tool_name: name.to_string(),
            tool_id: "toolu_1".to_string(),
            input,
        },
    })
}

fn tool_result(content: ToolResultContent, is_error: bool) -> AgentEvent {
    ev(EventPayload::BlockEmit {
        block: EmittedBlock::ToolResult {
            id: "t2".to_string(),
            tool_use_id: "toolu_1".to_string(),
            is_error,
            content,
        },
    })
}

/// A text block streamed in chunks of `chunk` chars
fn text_block(id: &str, text: &str, chunk: usize) -> Vec<AgentEvent> {
    let chars: Vec<char> = text.chars().collect();
    let mut events = vec![open(id, BlockKind::Text)];
    for piece in chars.chunks(chunk) {
        events.push(delta(id, &piece.iter().collect::<String>()));
    }
    events.push(close(id));
    events
}

fn source(events: Vec<AgentEvent>) -> impl futures::Stream<Item = anyhow::Result<AgentEvent>> {
    stream::iter(events.into_iter().map(Ok::<_, anyhow::Error>))
}

fn coordinator(platform: &Arc<MockPlatform>, renderer: impl Renderer + 'static) -> StreamCoordinator {
    StreamCoordinator::new(platform.clone(), Arc::new(renderer))
}

fn fence_lines(text: &str) -> usize {
    text.lines()
        .filter(|l| l.trim().starts_with("```"))
        .count()
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_simple_text_becomes_one_message() {
    let platform = Arc::new(MockPlatform::new(1900));
    let events = vec![
        open("b1", BlockKind::Text),
        delta("b1", "Hello "),
        delta("b1", "world"),
        close("b1"),
        complete(),
    ];

    let result = coordinator(&platform, PlainRenderer { footer: false })
        .coordinate("chan", source(events))
        .await
        .unwrap();

    assert!(matches!(result.unwrap().payload, EventPayload::Complete { .. }));
    assert_eq!(platform.messages(), vec!["Hello world"]);
    assert_eq!(platform.count("send:"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_footer_appended_on_complete() {
    let platform = Arc::new(MockPlatform::new(1900));
    let events = vec![
        open("b1", BlockKind::Text),
        delta("b1", "Hello world"),
        close("b1"),
        ev(EventPayload::Complete {
            session_id: Some("s1".to_string()),
            cost_usd: Some(0.5),
            duration_ms: Some(1200),
        }),
    ];

    let result = coordinator(&platform, PlainRenderer { footer: true })
        .coordinate("chan", source(events))
        .await
        .unwrap();

    assert_eq!(result.unwrap().session_id(), Some("s1"));
    assert_eq!(
        platform.messages(),
        vec!["Hello world\n[footer Some(1200) Some(0.5)]"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_footer_alone_has_no_leading_newline() {
    let platform = Arc::new(MockPlatform::new(1900));
    coordinator(&platform, PlainRenderer { footer: true })
        .coordinate("chan", source(vec![complete()]))
        .await
        .unwrap();

    assert_eq!(platform.messages(), vec!["[footer None None]"]);
}

#[tokio::test(start_paused = true)]
async fn test_long_text_splits_without_loss() {
    let platform = Arc::new(MockPlatform::new(1000));
    let original: String = (0..2500).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
    let mut events = text_block("b1", &original, 100);
    events.push(complete());

    coordinator(&platform, PlainRenderer { footer: false })
        .coordinate("chan", source(events))
        .await
        .unwrap();

    let messages = platform.messages();
    assert!(messages.len() >= 3, "expected at least 3 messages, got {}", messages.len());
    assert_eq!(messages.concat(), original);
    for text in platform.call_texts() {
        assert!(text.chars().count() <= 1000);
    }
}

#[tokio::test(start_paused = true)]
async fn test_long_text_on_platform_without_edit() {
    let platform = Arc::new(MockPlatform::new(1000).without_edit());
    let original = "z".repeat(2500);
    let mut events = text_block("b1", &original, 100);
    events.push(complete());

    coordinator(&platform, PlainRenderer { footer: false })
        .coordinate("chan", source(events))
        .await
        .unwrap();

    assert_eq!(platform.count("edit:"), 0);
    assert_eq!(platform.count("send:"), 3);
    let lengths: Vec<usize> = platform.messages().iter().map(|m| m.len()).collect();
    assert_eq!(lengths, vec![1000, 1000, 500]);
}

#[tokio::test(start_paused = true)]
async fn test_multibyte_text_splits_on_char_boundaries() {
    let platform = Arc::new(MockPlatform::new(1000));
    let original = "é💭".repeat(1250);
    let mut events = text_block("b1", &original, 64);
    events.push(complete());

    coordinator(&platform, PlainRenderer { footer: false })
        .coordinate("chan", source(events))
        .await
        .unwrap();

    assert_eq!(platform.messages().concat(), original);
    for text in platform.call_texts() {
        assert!(text.chars().count() <= 1000);
    }
}

#[tokio::test(start_paused = true)]
async fn test_split_inside_code_block_repairs_fences() {
    let platform = Arc::new(MockPlatform::new(1000));
    let mut text = "x".repeat(500);
    text.push_str("\n```json\n");
    while text.chars().count() < 1600 {
        text.push_str("{\"key\": \"value\"}\n");
    }
    text.push_str("```\ndone");
    let mut events = text_block("b1", &text, 50);
    events.push(complete());

    coordinator(&platform, PlainRenderer { footer: false })
        .coordinate("chan", source(events))
        .await
        .unwrap();

    let messages = platform.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].ends_with("\n```"), "first message: {:?}", messages[0]);
    assert!(messages[1].starts_with("```json\n"), "second message: {:?}", messages[1]);
    for message in &messages {
        assert!(message.chars().count() <= 1000);
        assert_eq!(fence_lines(message) % 2, 0, "unbalanced fences in {:?}", message);
    }
    for text in platform.call_texts() {
        assert!(text.chars().count() <= 1000);
    }
    assert!(messages[1].ends_with("```\ndone"));
}

#[tokio::test(start_paused = true)]
async fn test_split_never_cuts_through_fence_line() {
    let platform = Arc::new(MockPlatform::new(1000));
    // The fence line straddles the cut point
    let mut text = "x".repeat(993);
    text.push_str("\n```json\n{\"a\": 1}\n```\n");
    let mut events = text_block("b1", &text, 2000);
    events.push(complete());

    coordinator(&platform, PlainRenderer { footer: false })
        .coordinate("chan", source(events))
        .await
        .unwrap();

    let messages = platform.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], format!("{}\n", "x".repeat(993)));
    assert!(messages[1].starts_with("```json\n"));
    assert_eq!(messages.concat(), text);
}

#[tokio::test(start_paused = true)]
async fn test_opening_fence_line_is_not_truncated_outside_code_block() {
    let platform = Arc::new(MockPlatform::new(1000));
    // No block is open before the cut, which lands inside "```json"
    let mut text = "x".repeat(998);
    text.push_str("\n```json\n{\"a\": 1}\n```\nend");
    let mut events = vec![open("b1", BlockKind::Text), delta("b1", &text), close("b1")];
    events.push(complete());

    coordinator(&platform, PlainRenderer { footer: false })
        .coordinate("chan", source(events))
        .await
        .unwrap();

    let messages = platform.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], format!("{}\n", "x".repeat(998)));
    assert!(messages[1].starts_with("```json\n"));
    for message in &messages {
        assert_eq!(fence_lines(message) % 2, 0, "unbalanced fences in {:?}", message);
    }
    assert_eq!(messages.concat(), text);
}

#[tokio::test(start_paused = true)]
async fn test_tool_header_and_result_are_separate_messages() {
    let platform = Arc::new(MockPlatform::new(1900));
    let events = vec![
        tool_use("Read", json!({"path": "/tmp/foo.txt"})),
        tool_result(
            ToolResultContent::Text {
                text: "boom".to_string(),
            },
            true,
        ),
        complete(),
    ];

    coordinator(&platform, MarkdownRenderer::new())
        .coordinate("chan", source(events))
        .await
        .unwrap();

    assert_eq!(
        platform.messages(),
        vec![
            "-# 🔧 Read · path=/tmp/foo.txt".to_string(),
            "\n⚠️ ```\nboom\n```\n".to_string(),
        ]
    );
    assert_eq!(platform.count("send:"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_block_then_fatal_error() {
    let platform = Arc::new(MockPlatform::new(1900));
    let events = vec![delta("ghost", "ignored"), fatal("boom")];

    let result = coordinator(&platform, MarkdownRenderer::new())
        .coordinate("chan", source(events))
        .await
        .unwrap();

    assert!(matches!(
        result.unwrap().payload,
        EventPayload::FatalError { message, .. } if message == "boom"
    ));
    assert_eq!(platform.messages(), vec!["❌ **Error:** boom"]);
}

// =============================================================================
// Properties
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_fatal_error_never_gets_footer() {
    let platform = Arc::new(MockPlatform::new(1900));
    let mut events = text_block("b1", "partial answer", 100);
    events.push(fatal("quota exceeded"));

    coordinator(&platform, PlainRenderer { footer: true })
        .coordinate("chan", source(events))
        .await
        .unwrap();

    assert_eq!(
        platform.messages(),
        vec!["partial answer\n[fatal quota exceeded]"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_deltas_for_unknown_or_closed_blocks_are_ignored() {
    let platform = Arc::new(MockPlatform::new(1900));
    let events = vec![
        delta("never-opened", "x"),
        open("b1", BlockKind::Text),
        delta("b1", "kept"),
        close("b1"),
        delta("b1", " after close"),
        close("b1"),
        complete(),
    ];

    coordinator(&platform, PlainRenderer { footer: false })
        .coordinate("chan", source(events))
        .await
        .unwrap();

    assert_eq!(platform.messages(), vec!["kept"]);
}

#[tokio::test(start_paused = true)]
async fn test_empty_tool_result_sends_nothing() {
    let platform = Arc::new(MockPlatform::new(1900));
    let events = vec![
        tool_result(ToolResultContent::Empty, false),
        tool_result(ToolResultContent::Parts { parts: vec![] }, true),
        complete(),
    ];

    coordinator(&platform, PlainRenderer { footer: false })
        .coordinate("chan", source(events))
        .await
        .unwrap();

    assert!(platform.messages().is_empty());
    assert!(platform.log().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_new_message_after_finalize() {
    let platform = Arc::new(MockPlatform::new(1900));
    let mut events = text_block("b1", "intro", 100);
    events.push(tool_use("Bash", json!({"command": "ls"})));
    events.extend(text_block("b2", "after", 100));
    events.push(complete());

    coordinator(&platform, PlainRenderer { footer: false })
        .coordinate("chan", source(events))
        .await
        .unwrap();

    assert_eq!(platform.messages(), vec!["intro", "[tool Bash]", "after"]);
    // Nothing edits a finished message
    assert!(platform
        .log()
        .iter()
        .filter(|e| e.starts_with("edit:"))
        .all(|e| e.starts_with("edit:m2:")));
}

#[tokio::test(start_paused = true)]
async fn test_emits_share_the_current_message() {
    let platform = Arc::new(MockPlatform::new(1900));
    let mut events = text_block("b1", "working", 100);
    events.push(ev(EventPayload::BlockEmit {
        block: EmittedBlock::Error {
            id: "e1".to_string(),
            message: "retrying".to_string(),
            code: None,
            retryable: true,
        },
    }));
    events.push(complete());

    coordinator(&platform, PlainRenderer { footer: false })
        .coordinate("chan", source(events))
        .await
        .unwrap();

    assert_eq!(platform.messages(), vec!["working[error retrying]"]);
}

#[tokio::test(start_paused = true)]
async fn test_thinking_preview_is_replaced_not_appended() {
    let platform = Arc::new(MockPlatform::new(1900));
    let events = vec![
        open("t", BlockKind::Thinking),
        delta("t", "Let me think"),
        delta("t", " about this"),
        close("t"),
        complete(),
    ];

    coordinator(&platform, MarkdownRenderer::new())
        .coordinate("chan", source(events))
        .await
        .unwrap();

    assert_eq!(
        platform.messages(),
        vec!["\n-# 💭 Let me think about this\n"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_throttled_flush_makes_no_call() {
    let platform = Arc::new(MockPlatform::new(1900));
    let coordinator = coordinator(&platform, PlainRenderer { footer: false });
    let (tx, rx) = mpsc::channel(16);
    let run = tokio::spawn(async move {
        coordinator
            .coordinate("chan", EventReceiver::new(rx))
            .await
    });

    tx.send(Ok(open("b1", BlockKind::Text))).await.unwrap();
    tx.send(Ok(delta("b1", "one"))).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(platform.log(), vec!["send:m0:one"]);

    // Within the edit interval: buffered, no call
    tx.send(Ok(delta("b1", " two"))).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(platform.log().len(), 1);

    // After the interval the next delta edits in place
    tokio::time::sleep(Duration::from_millis(600)).await;
    tx.send(Ok(delta("b1", " three"))).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(platform.log(), vec!["send:m0:one", "edit:m0:one two three"]);

    // Source ends without a terminal event; buffered text is already out
    drop(tx);
    let result = run.await.unwrap().unwrap();
    assert!(result.is_none());
    assert_eq!(platform.messages(), vec!["one two three"]);
    assert_eq!(platform.log().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_typing_stops_after_last_message() {
    let platform = Arc::new(MockPlatform::new(1900).with_typing());
    let mut events = text_block("b1", "hello", 100);
    events.push(tool_use("Read", json!({})));
    events.push(complete());

    coordinator(&platform, PlainRenderer { footer: false })
        .coordinate("chan", source(events))
        .await
        .unwrap();

    let log = platform.log();
    assert_eq!(log.first().map(String::as_str), Some("typing:true"));
    assert_eq!(log.last().map(String::as_str), Some("typing:false"));
    assert_eq!(log.iter().filter(|e| *e == "typing:false").count(), 1);

    // Every send is followed by a refresh
    for (idx, entry) in log.iter().enumerate() {
        if entry.starts_with("send:") {
            assert_eq!(log[idx + 1], "typing:true", "no refresh after {entry}");
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_typing_kept_alive_during_idle_gaps() {
    let platform = Arc::new(MockPlatform::new(1900).with_typing());
    let coordinator = coordinator(&platform, PlainRenderer { footer: false });
    let (tx, rx) = mpsc::channel(16);
    let run = tokio::spawn(async move {
        coordinator
            .coordinate("chan", EventReceiver::new(rx))
            .await
    });

    // Expiry is 10s, so refreshes come every 5s
    tokio::time::sleep(Duration::from_secs(12)).await;
    let refreshes = platform.log().iter().filter(|e| *e == "typing:true").count();
    assert_eq!(refreshes, 3);

    tx.send(Ok(complete())).await.unwrap();
    run.await.unwrap().unwrap();
    assert_eq!(platform.log().last().map(String::as_str), Some("typing:false"));
}

#[tokio::test]
async fn test_send_failure_propagates() {
    let platform = Arc::new(MockPlatform::new(1900).failing());
    let mut events = text_block("b1", "hello", 100);
    events.push(complete());

    let err = coordinator(&platform, PlainRenderer { footer: false })
        .coordinate("chan", source(events))
        .await
        .unwrap_err();

    assert!(format!("{:#}", err).contains("platform down"));
}

#[tokio::test]
async fn test_producer_error_propagates() {
    let platform = Arc::new(MockPlatform::new(1900));
    let items: Vec<anyhow::Result<AgentEvent>> = vec![
        Ok(open("b1", BlockKind::Text)),
        Err(anyhow::anyhow!("stdout closed")),
        Ok(complete()),
    ];

    let err = coordinator(&platform, PlainRenderer { footer: false })
        .coordinate("chan", stream::iter(items))
        .await
        .unwrap_err();

    let chain = format!("{:#}", err);
    assert!(chain.contains("Event source failed"));
    assert!(chain.contains("stdout closed"));
}

#[tokio::test(start_paused = true)]
async fn test_nothing_after_terminal_is_consumed() {
    let platform = Arc::new(MockPlatform::new(1900));
    let mut events = text_block("b1", "answer", 100);
    events.push(complete());
    events.extend(text_block("b2", "late", 100));

    coordinator(&platform, PlainRenderer { footer: false })
        .coordinate("chan", source(events))
        .await
        .unwrap();

    assert_eq!(platform.messages(), vec!["answer"]);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_runs_do_not_share_state() {
    let platform = Arc::new(MockPlatform::new(1900));
    let coordinator = coordinator(&platform, PlainRenderer { footer: false });

    let mut first = text_block("b1", "for alpha", 3);
    first.push(complete());
    let mut second = text_block("b1", "for beta", 3);
    second.push(complete());

    let (a, b) = tokio::join!(
        coordinator.coordinate("alpha", source(first)),
        coordinator.coordinate("beta", source(second)),
    );
    a.unwrap();
    b.unwrap();

    let pairs: Vec<(String, String)> = platform
        .channels()
        .into_iter()
        .zip(platform.messages())
        .collect();
    assert!(pairs.contains(&("alpha".to_string(), "for alpha".to_string())));
    assert!(pairs.contains(&("beta".to_string(), "for beta".to_string())));
}
