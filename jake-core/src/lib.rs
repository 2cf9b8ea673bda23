// ABOUTME: Platform-agnostic streaming of AI assistant turns into chat messages
// ABOUTME: Provides the platform and renderer ports, the stream coordinator, and supporting state

pub mod config;
pub mod coordinator;
pub mod metrics;
pub mod paths;
pub mod render;
pub mod session;
pub mod traits;
pub mod typing;
pub mod utils;

pub use coordinator::{StreamCoordinator, StreamOptions};
pub use render::MarkdownRenderer;
pub use session::{ActiveConversation, ActiveConversations};

// Re-export core traits for convenient access
pub use traits::{ChatPlatform, MessageRef, PlatformCapabilities, Renderer, TypingIndicator};

// Re-export jake-agent types
pub use jake_agent::{AgentEvent, AgentHandle, AgentRegistry};
