// ABOUTME: Built-in backend implementations (mock, replay).
// ABOUTME: Each backend implements the AgentBackend trait and is served through AgentHandle.

pub mod mock;
pub mod replay;
