// ABOUTME: In-memory store of the active conversation per (user, channel) pair.
// ABOUTME: Also resolves user-supplied working directories against the configured base.

use crate::paths::expand_tilde;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

/// The conversation a user is currently having in a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveConversation {
    /// Registry name of the backend serving this conversation
    pub backend_id: String,
    /// Directory the assistant works in
    pub workdir: PathBuf,
    /// Session token returned by the backend, used to resume
    pub session_id: Option<String>,
}

impl ActiveConversation {
    pub fn new(backend_id: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            backend_id: backend_id.into(),
            workdir: workdir.into(),
            session_id: None,
        }
    }
}

type ConversationKey = (String, String);

/// Active conversations keyed by (user_id, channel_id).
///
/// Nothing is persisted; every conversation is forgotten on restart.
#[derive(Debug, Default)]
pub struct ActiveConversations {
    store: RwLock<HashMap<ConversationKey, ActiveConversation>>,
}

impl ActiveConversations {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(user_id: &str, channel_id: &str) -> ConversationKey {
        (user_id.to_string(), channel_id.to_string())
    }

    pub fn get(&self, user_id: &str, channel_id: &str) -> Option<ActiveConversation> {
        let store = self.store.read().unwrap_or_else(|e| e.into_inner());
        store.get(&Self::key(user_id, channel_id)).cloned()
    }

    /// Start (or replace) the conversation for a user in a channel
    pub fn set(&self, user_id: &str, channel_id: &str, conversation: ActiveConversation) {
        tracing::debug!(
            user_id = %user_id,
            channel_id = %channel_id,
            backend = %conversation.backend_id,
            "Setting active conversation"
        );
        let mut store = self.store.write().unwrap_or_else(|e| e.into_inner());
        store.insert(Self::key(user_id, channel_id), conversation);
    }

    /// End a conversation. Returns whether one existed.
    pub fn remove(&self, user_id: &str, channel_id: &str) -> bool {
        let mut store = self.store.write().unwrap_or_else(|e| e.into_inner());
        store.remove(&Self::key(user_id, channel_id)).is_some()
    }

    /// Record the session token from a completed turn. Returns false when
    /// there is no active conversation to update.
    pub fn update_session_id(&self, user_id: &str, channel_id: &str, session_id: &str) -> bool {
        let mut store = self.store.write().unwrap_or_else(|e| e.into_inner());
        match store.get_mut(&Self::key(user_id, channel_id)) {
            Some(conversation) => {
                conversation.session_id = Some(session_id.to_string());
                true
            }
            None => {
                tracing::debug!(
                    user_id = %user_id,
                    channel_id = %channel_id,
                    "No active conversation to update session for"
                );
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.store.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolve a user-supplied working directory.
///
/// No path means the base itself; absolute paths are used as-is; relative
/// paths are joined onto the base. The result must be an existing directory.
pub fn resolve_workdir(base: &str, relative: Option<&str>) -> Result<PathBuf> {
    let base = expand_tilde(base);
    let candidate = match relative.map(str::trim).filter(|r| !r.is_empty()) {
        None => base,
        Some(rel) => {
            let rel = expand_tilde(rel);
            if rel.is_absolute() {
                rel
            } else {
                base.join(rel)
            }
        }
    };

    let resolved = candidate
        .canonicalize()
        .with_context(|| format!("Working directory does not exist: {}", candidate.display()))?;
    if !resolved.is_dir() {
        anyhow::bail!("Working directory does not exist: {}", resolved.display());
    }
    Ok(resolved)
}
