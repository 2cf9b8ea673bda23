// ABOUTME: Tests for the agent event vocabulary.
// ABOUTME: Covers serde tagging, tool result content, terminal detection and EventStamper ids.

use jake_agent::{
    AgentEvent, BlockKind, ContentPart, EmittedBlock, EventPayload, EventStamper, SystemSubtype,
    ToolResultContent,
};
use serde_json::json;

fn event(payload: EventPayload) -> AgentEvent {
    AgentEvent::new("test", 0, payload)
}

#[test]
fn test_block_open_serializes_flat() {
    let ev = event(EventPayload::BlockOpen {
        id: "b1".to_string(),
        kind: BlockKind::Thinking,
    });
    let json = serde_json::to_value(&ev).unwrap();
    assert_eq!(
        json,
        json!({"producer": "test", "timestamp_ms": 0, "type": "block_open", "id": "b1", "kind": "thinking"})
    );
}

#[test]
fn test_tool_use_emit_serializes() {
    let ev = event(EventPayload::BlockEmit {
        block: EmittedBlock::ToolUse {
            id: "b2".to_string(),
            tool_name: "Read".to_string(),
            tool_id: "toolu_1".to_string(),
            input: json!({"path": "/tmp/foo.txt"}),
        },
    });
    let json = serde_json::to_value(&ev).unwrap();
    assert_eq!(json["type"], "block_emit");
    assert_eq!(json["block"]["variant"], "tool_use");
    assert_eq!(json["block"]["tool_name"], "Read");
}

#[test]
fn test_complete_omits_absent_fields() {
    let ev = event(EventPayload::Complete {
        session_id: Some("s-1".to_string()),
        cost_usd: None,
        duration_ms: None,
    });
    let json = serde_json::to_value(&ev).unwrap();
    assert_eq!(json["session_id"], "s-1");
    assert!(json.get("cost_usd").is_none());
    assert!(ev.is_terminal());
    assert_eq!(ev.session_id(), Some("s-1"));
}

#[test]
fn test_tool_result_deserializes_from_transcript_line() {
    let line = r#"{"producer":"claude","timestamp_ms":12,"type":"block_emit","block":{"variant":"tool_result","id":"b3","tool_use_id":"toolu_1","is_error":true,"content":{"format":"parts","parts":[{"type":"text","text":"a"},{"type":"text","text":""},{"type":"text","text":"b"}]}}}"#;
    let ev: AgentEvent = serde_json::from_str(line).unwrap();
    assert_eq!(ev.timestamp_ms, 12);
    match ev.payload {
        EventPayload::BlockEmit {
            block:
                EmittedBlock::ToolResult {
                    is_error, content, ..
                },
        } => {
            assert!(is_error);
            assert_eq!(content.to_text(), "a\nb");
        }
        other => panic!("Wrong payload: {:?}", other),
    }
}

#[test]
fn test_tool_result_content_representations() {
    let text = ToolResultContent::Text {
        text: "hello".to_string(),
    };
    assert_eq!(text.to_text(), "hello");

    let parts = ToolResultContent::Parts {
        parts: vec![ContentPart::Text {
            text: "one".to_string(),
        }],
    };
    assert_eq!(parts.to_text(), "one");

    assert_eq!(ToolResultContent::Empty.to_text(), "");
}

#[test]
fn test_fatal_error_is_terminal_without_session() {
    let ev = event(EventPayload::FatalError {
        message: "boom".to_string(),
        code: Some("E42".to_string()),
    });
    assert!(ev.is_terminal());
    assert_eq!(ev.session_id(), None);
}

#[test]
fn test_system_subtype_names() {
    assert_eq!(SystemSubtype::Init.as_str(), "init");
    assert_eq!(SystemSubtype::RateLimit.as_str(), "rate_limit");
    assert_eq!(SystemSubtype::Notice.as_str(), "notice");
}

#[test]
fn test_stamper_allocates_sequential_block_ids() {
    let mut stamper = EventStamper::new("claude");
    let events = stamper.text_block("hi");
    assert_eq!(events.len(), 3);
    assert!(matches!(&events[0].payload, EventPayload::BlockOpen { id, kind: BlockKind::Text } if id == "b0"));
    assert!(matches!(&events[1].payload, EventPayload::BlockDelta { block_id, delta } if block_id == "b0" && delta == "hi"));
    assert!(matches!(&events[2].payload, EventPayload::BlockClose { block_id } if block_id == "b0"));
    assert!(events.iter().all(|e| e.producer == "claude"));

    let emitted = stamper.emit(|id| EmittedBlock::Error {
        id,
        message: "nope".to_string(),
        code: None,
        retryable: false,
    });
    assert!(matches!(
        &emitted.payload,
        EventPayload::BlockEmit { block: EmittedBlock::Error { id, .. } } if id == "b1"
    ));
}

#[test]
fn test_stamper_timestamps_are_monotonic() {
    let mut stamper = EventStamper::new("gemini");
    let first = stamper.text_block("a");
    let last = stamper.complete(None, None, None);
    assert!(first.iter().all(|e| e.timestamp_ms <= last.timestamp_ms));
}
