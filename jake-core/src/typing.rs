// ABOUTME: Keeps a platform typing indicator alive while a turn is being relayed.
// ABOUTME: Periodic refresh task with a stop signal, a hard time limit, and abort-on-drop.

use crate::traits::TypingIndicator;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Shortest refresh period the keepalive will use
const MIN_INTERVAL: Duration = Duration::from_millis(50);

/// Refresh period for an indicator that expires after `expiry`
pub fn refresh_interval(expiry: Duration) -> Duration {
    (expiry / 2).max(MIN_INTERVAL)
}

/// Running typing keepalive for one channel.
///
/// `stop` tears it down and clears the indicator. Dropping it without
/// calling `stop` aborts the refresh task and leaves the indicator to expire.
pub struct TypingKeepalive {
    indicator: Arc<dyn TypingIndicator>,
    channel_id: String,
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TypingKeepalive {
    /// Signal typing immediately, then keep refreshing every `interval`
    /// until stopped or until `max_duration` has passed.
    pub async fn start(
        indicator: Arc<dyn TypingIndicator>,
        channel_id: &str,
        interval: Duration,
        max_duration: Duration,
    ) -> Self {
        let interval = interval.max(MIN_INTERVAL);
        signal(indicator.as_ref(), channel_id).await;

        let task_indicator = Arc::clone(&indicator);
        let task_channel = channel_id.to_string();
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let deadline = tokio::time::Instant::now() + max_duration;
            ticker.tick().await; // Skip first immediate tick

            loop {
                if tokio::time::Instant::now() > deadline {
                    tracing::warn!(
                        channel_id = %task_channel,
                        max_secs = max_duration.as_secs(),
                        "Typing indicator timed out"
                    );
                    break;
                }
                tokio::select! {
                    _ = ticker.tick() => {
                        signal(task_indicator.as_ref(), &task_channel).await;
                    }
                    _ = &mut stop_rx => break,
                }
            }
        });

        Self {
            indicator,
            channel_id: channel_id.to_string(),
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Re-signal immediately; sending a message clears the indicator on some platforms
    pub async fn refresh(&self) {
        signal(self.indicator.as_ref(), &self.channel_id).await;
    }

    /// Stop refreshing and clear the indicator
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        if let Err(e) = self.indicator.set_typing(&self.channel_id, false).await {
            tracing::debug!(channel_id = %self.channel_id, error = %e, "Failed to clear typing indicator");
        }
    }
}

impl Drop for TypingKeepalive {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn signal(indicator: &dyn TypingIndicator, channel_id: &str) {
    if let Err(e) = indicator.set_typing(channel_id, true).await {
        tracing::warn!(channel_id = %channel_id, error = %e, "Failed to refresh typing indicator");
    }
}
