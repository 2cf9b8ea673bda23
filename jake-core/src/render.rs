// ABOUTME: Markdown renderer for chat platforms that understand Discord-style markdown.
// ABOUTME: Dimmed previews for thinking and tool calls, capped fenced blocks for tool output.

use crate::traits::Renderer;
use crate::utils::{char_len, take_chars};
use jake_agent::{BlockKind, EmittedBlock, SystemSubtype};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Maximum characters in a thinking or tool-input preview
const PREVIEW_CHARS: usize = 80;
/// Maximum lines of tool output shown
const TOOL_RESULT_MAX_LINES: usize = 6;
/// Maximum characters of tool output shown
const TOOL_RESULT_MAX_CHARS: usize = 400;

static BARE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+").expect("URL pattern is valid"));

/// Renders agent output as chat markdown
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    suppress_embeds: bool,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self {
            suppress_embeds: true,
        }
    }

    /// Wrap bare URLs in text blocks so the platform skips link previews
    pub fn with_suppress_embeds(mut self, suppress: bool) -> Self {
        self.suppress_embeds = suppress;
        self
    }

    fn preview(text: &str) -> String {
        let mut preview = take_chars(text, PREVIEW_CHARS).replace('\n', " ");
        if char_len(text) > PREVIEW_CHARS {
            preview.push('…');
        }
        preview
    }
}

impl Renderer for MarkdownRenderer {
    fn render_streaming(&self, kind: BlockKind, content: &str) -> String {
        match kind {
            BlockKind::Text => self.suppress_embeds(content),
            BlockKind::Thinking => format!("\n-# 💭 {}\n", Self::preview(content)),
        }
    }

    fn render_tool_header(&self, tool_name: &str, input: &Value) -> String {
        let args = match input {
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| match value {
                    Value::String(s) => format!("{key}={s}"),
                    other => format!("{key}={other}"),
                })
                .collect::<Vec<_>>()
                .join(", "),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        if args.is_empty() {
            format!("-# 🔧 {tool_name}")
        } else {
            format!("-# 🔧 {tool_name} · {}", Self::preview(&args))
        }
    }

    fn render_tool_result(&self, text: &str, is_error: bool) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        let lines: Vec<&str> = text.trim_end_matches('\n').lines().collect();
        let mut body = lines
            .iter()
            .take(TOOL_RESULT_MAX_LINES)
            .copied()
            .collect::<Vec<_>>()
            .join("\n");

        let shown_chars = char_len(&body);
        if shown_chars > TOOL_RESULT_MAX_CHARS {
            body = take_chars(&body, TOOL_RESULT_MAX_CHARS).to_string();
            body.push_str(&format!(
                "… ({} chars truncated)",
                shown_chars - TOOL_RESULT_MAX_CHARS
            ));
        }
        if lines.len() > TOOL_RESULT_MAX_LINES {
            body.push_str(&format!(
                "\n… ({} more lines)",
                lines.len() - TOOL_RESULT_MAX_LINES
            ));
        }

        let prefix = if is_error { "⚠️ " } else { "" };
        format!("\n{prefix}```\n{body}\n```\n")
    }

    fn render_emit(&self, block: &EmittedBlock) -> String {
        match block {
            EmittedBlock::ToolUse {
                tool_name, input, ..
            } => self.render_tool_header(tool_name, input),
            EmittedBlock::ToolResult {
                is_error, content, ..
            } => self.render_tool_result(&content.to_text(), *is_error),
            EmittedBlock::Error { message, .. } => format!("\n❌ **Error:** {message}\n"),
            EmittedBlock::System {
                subtype: SystemSubtype::Init,
                ..
            } => String::new(),
            EmittedBlock::System {
                subtype, message, ..
            } => format!("\n-# ℹ️ {}: {message}\n", subtype.as_str()),
        }
    }

    fn render_fatal_error(&self, message: &str) -> String {
        format!("❌ **Error:** {message}")
    }

    fn render_footer(&self, duration_ms: Option<u64>, cost_usd: Option<f64>) -> Option<String> {
        if duration_ms.is_none() && cost_usd.is_none() {
            return None;
        }
        let cost = cost_usd
            .map(|c| format!("${c:.4}"))
            .unwrap_or_else(|| "?".to_string());
        let duration = duration_ms
            .map(|ms| format!("{:.1}s", ms as f64 / 1000.0))
            .unwrap_or_else(|| "?".to_string());
        Some(format!("-# Cost: {cost} | Duration: {duration}"))
    }

    fn suppress_embeds(&self, text: &str) -> String {
        if !self.suppress_embeds {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len() + 8);
        let mut last = 0;
        for m in BARE_URL.find_iter(text) {
            out.push_str(&text[last..m.start()]);
            let preceded_by = text[..m.start()].chars().next_back();
            if matches!(preceded_by, Some('<') | Some('(')) {
                out.push_str(m.as_str());
            } else {
                out.push('<');
                out.push_str(m.as_str());
                out.push('>');
            }
            last = m.end();
        }
        out.push_str(&text[last..]);
        out
    }
}
