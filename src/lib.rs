// ABOUTME: Root library module for the jake binary
// ABOUTME: Chat platforms, the prompt relay with its commands, and the CLI subcommands

pub mod chat;
pub mod cli;
pub mod commands;
pub mod platform;
pub mod relay;
pub mod replay;

// Re-export platform-agnostic modules from jake-core
pub use jake_core::config;
pub use jake_core::metrics;
pub use jake_core::paths;
pub use jake_core::session;

// Re-export jake-agent types for convenience
pub use jake_agent::{AgentEvent, AgentHandle, AgentRegistry};
