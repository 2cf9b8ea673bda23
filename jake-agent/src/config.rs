// ABOUTME: Backend section of the configuration file.
// ABOUTME: Parses [backend] with a type discriminator and a free-form table for the factory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Backend configuration with type discriminator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendConfig {
    /// Backend type: "mock", "replay", etc.
    #[serde(rename = "type", default = "default_backend_type")]
    pub backend_type: String,

    /// Remaining fields passed to backend factory
    #[serde(flatten)]
    pub config: toml::Table,
}

fn default_backend_type() -> String {
    "mock".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            backend_type: default_backend_type(),
            config: toml::Table::new(),
        }
    }
}

impl BackendConfig {
    /// Parse the body of a `[backend]` table
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse backend config TOML")
    }

    /// Get backend type name
    pub fn backend_type(&self) -> &str {
        &self.backend_type
    }

    /// Convert config table to serde_json::Value for registry
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or_else(|_| serde_json::json!({}))
    }
}
