// ABOUTME: Backend abstraction for jake: the event vocabulary and pluggable agent backends.
// ABOUTME: Provides the AgentBackend trait, Send+Sync handles, a registry, and mock/replay backends.

pub mod config;
pub mod event;
pub mod handle;
pub mod registry;
pub mod traits;

pub mod backends;

pub use event::{
    AgentEvent, BlockKind, ContentPart, EmittedBlock, EventPayload, EventStamper, SystemSubtype,
    ToolResultContent,
};
pub use handle::{AgentHandle, EventReceiver};
pub use registry::{AgentRegistry, BackendFactory};
pub use traits::{AgentBackend, ConversationInfo, EventStream, PromptRequest};
