// ABOUTME: AgentHandle provides a Send+Sync wrapper around agent backends.
// ABOUTME: Uses channels to communicate with a worker task that owns the backend.

use crate::traits::{AgentBackend, ConversationInfo, PromptRequest};
use crate::AgentEvent;
use anyhow::Result;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot};

/// Capacity of the per-turn event channel
const EVENT_CHANNEL_CAPACITY: usize = 2048;

/// Commands sent from AgentHandle to the backend worker
#[derive(Debug)]
pub enum Command {
    Execute {
        request: PromptRequest,
        event_tx: mpsc::Sender<Result<AgentEvent>>,
        reply: oneshot::Sender<Result<()>>,
    },
    ListConversations {
        workdir: Option<String>,
        reply: oneshot::Sender<Result<Vec<ConversationInfo>>>,
    },
}

/// Send + Sync handle that the relay interacts with.
///
/// Internally communicates with a worker task that runs the actual backend,
/// so callers never hold a borrow of the backend across await points.
#[derive(Clone)]
pub struct AgentHandle {
    tx: mpsc::Sender<Command>,
    name: &'static str,
}

impl AgentHandle {
    /// Create a new AgentHandle with the given command channel and backend name
    pub fn new(tx: mpsc::Sender<Command>, name: &'static str) -> Self {
        Self { tx, name }
    }

    /// Spawn a worker task that owns `backend` and serves commands for it.
    ///
    /// Prompts are executed one at a time; the worker forwards each event
    /// into the caller's receiver and stops early if the receiver is dropped.
    pub fn spawn<B>(backend: B) -> Self
    where
        B: AgentBackend + Send + Sync + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<Command>(32);
        let name = backend.name();

        tokio::spawn(async move {
            while let Some(cmd) = rx.recv().await {
                match cmd {
                    Command::Execute {
                        request,
                        event_tx,
                        reply,
                    } => {
                        let mut stream = match backend.execute(&request).await {
                            Ok(stream) => {
                                let _ = reply.send(Ok(()));
                                stream
                            }
                            Err(e) => {
                                let _ = reply.send(Err(e));
                                continue;
                            }
                        };

                        let mut forwarded = 0usize;
                        while let Some(item) = stream.next().await {
                            forwarded += 1;
                            if event_tx.send(item).await.is_err() {
                                tracing::debug!(backend = name, "Event receiver dropped, abandoning turn");
                                break;
                            }
                        }
                        tracing::debug!(backend = name, forwarded, "Turn finished");
                    }
                    Command::ListConversations { workdir, reply } => {
                        let result = backend.list_conversations(workdir.as_deref()).await;
                        let _ = reply.send(result);
                    }
                }
            }
            tracing::debug!(backend = name, "Backend worker shutting down");
        });

        Self::new(tx, name)
    }

    /// Get the backend name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Send a prompt and receive events via EventReceiver
    pub async fn execute(&self, request: PromptRequest) -> Result<EventReceiver> {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (reply_tx, reply_rx) = oneshot::channel();

        self.tx
            .send(Command::Execute {
                request,
                event_tx,
                reply: reply_tx,
            })
            .await
            .map_err(|_| anyhow::anyhow!("Backend worker closed"))?;

        // Wait for the backend to acknowledge the prompt started
        reply_rx
            .await
            .map_err(|_| anyhow::anyhow!("Backend worker dropped reply channel"))??;

        Ok(EventReceiver::new(event_rx))
    }

    /// List past conversations known to the backend
    pub async fn list_conversations(&self, workdir: Option<&str>) -> Result<Vec<ConversationInfo>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Command::ListConversations {
                workdir: workdir.map(str::to_string),
                reply: reply_tx,
            })
            .await
            .map_err(|_| anyhow::anyhow!("Backend worker closed"))?;
        reply_rx
            .await
            .map_err(|_| anyhow::anyhow!("Backend worker dropped reply channel"))?
    }
}

/// Pull-based receiver for the events of one turn.
///
/// This is `Send` so it can be passed across async task boundaries. A
/// producer error is delivered as an `Err` item at the point of the pull.
pub struct EventReceiver {
    rx: mpsc::Receiver<Result<AgentEvent>>,
}

impl EventReceiver {
    /// Create a new EventReceiver wrapping the given channel
    pub fn new(rx: mpsc::Receiver<Result<AgentEvent>>) -> Self {
        Self { rx }
    }

    /// Receive the next event, or None if the stream is closed
    pub async fn recv(&mut self) -> Option<Result<AgentEvent>> {
        self.rx.recv().await
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Option<Result<AgentEvent>> {
        self.rx.try_recv().ok()
    }
}

impl Stream for EventReceiver {
    type Item = Result<AgentEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
