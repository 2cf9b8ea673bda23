// ABOUTME: Metric names and recording helpers for the relay.
// ABOUTME: Uses the `metrics` facade; a Prometheus recorder can be installed for inspection.

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

pub const MESSAGES_SENT: &str = "jake_messages_sent_total";
pub const MESSAGES_EDITED: &str = "jake_messages_edited_total";
pub const MESSAGE_SPLITS: &str = "jake_message_splits_total";
pub const RUNS: &str = "jake_runs_total";
pub const RUN_DURATION: &str = "jake_run_duration_seconds";
pub const COMMANDS: &str = "jake_commands_total";

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Complete,
    FatalError,
    /// The event source ended without a terminal event
    Incomplete,
    /// A platform call or the event source failed
    Failed,
}

impl RunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::Complete => "complete",
            RunOutcome::FatalError => "fatal_error",
            RunOutcome::Incomplete => "incomplete",
            RunOutcome::Failed => "failed",
        }
    }
}

/// Install a Prometheus recorder and describe the relay's metrics.
///
/// Returns a handle whose `render()` yields the text exposition format.
pub fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    ::metrics::describe_counter!(MESSAGES_SENT, "Messages sent to chat platforms");
    ::metrics::describe_counter!(MESSAGES_EDITED, "In-place edits of sent messages");
    ::metrics::describe_counter!(MESSAGE_SPLITS, "Times an outbound buffer overflowed the size limit");
    ::metrics::describe_counter!(RUNS, "Relayed turns by outcome");
    ::metrics::describe_histogram!(RUN_DURATION, "Wall time of a relayed turn");
    ::metrics::describe_counter!(COMMANDS, "Chat commands handled, by name");

    Ok(handle)
}

pub fn record_message_sent(platform: &'static str) {
    ::metrics::counter!(MESSAGES_SENT, "platform" => platform).increment(1);
}

pub fn record_message_edited(platform: &'static str) {
    ::metrics::counter!(MESSAGES_EDITED, "platform" => platform).increment(1);
}

pub fn record_message_split(platform: &'static str) {
    ::metrics::counter!(MESSAGE_SPLITS, "platform" => platform).increment(1);
}

pub fn record_command(command: &'static str) {
    ::metrics::counter!(COMMANDS, "command" => command).increment(1);
}

pub fn record_run(outcome: RunOutcome, elapsed: Duration) {
    ::metrics::counter!(RUNS, "outcome" => outcome.as_str()).increment(1);
    ::metrics::histogram!(RUN_DURATION).record(elapsed.as_secs_f64());
}
