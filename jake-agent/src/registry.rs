// ABOUTME: Name to factory table that turns a `[backend]` config section into a running backend.
// ABOUTME: The default table knows the scripted `mock` backend and the `replay` transcript player.

use crate::config::BackendConfig;
use crate::handle::AgentHandle;
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// Builds a backend worker from the factory's slice of configuration
pub type BackendFactory = Box<dyn Fn(&Value) -> Result<AgentHandle> + Send + Sync>;

/// Backends jake can be pointed at, keyed by the `type` used in config
pub struct AgentRegistry {
    factories: BTreeMap<String, BackendFactory>,
}

impl AgentRegistry {
    /// A registry that knows no backends
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Add (or replace) the factory for `name`
    pub fn register<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn(&Value) -> Result<AgentHandle> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Start the backend registered as `name`. Unknown names list what is
    /// available so a config typo is easy to spot.
    pub fn create(&self, name: &str, config: &Value) -> Result<AgentHandle> {
        let Some(factory) = self.factories.get(name) else {
            anyhow::bail!(
                "Unknown backend '{}' (available: {})",
                name,
                self.available().join(", ")
            );
        };
        tracing::debug!(backend = name, "Starting backend");
        factory(config).with_context(|| format!("Backend '{name}' rejected its configuration"))
    }

    /// Registered names in sorted order
    pub fn available(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Start the backend a `[backend]` section asks for
    pub fn create_from_config(&self, config: &BackendConfig) -> Result<AgentHandle> {
        self.create(config.backend_type(), &config.to_json_value())
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        use crate::backends::mock::MockBackend;
        use crate::backends::replay::ReplayBackend;

        Self::new()
            .register("mock", MockBackend::factory())
            .register("replay", ReplayBackend::factory())
    }
}
