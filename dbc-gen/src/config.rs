//! Generator configuration types
//!
//! This module defines the knobs the generator library understands. File
//! handling and command-line parsing live in the application layer
//! (dbc-gen-cli), which deserializes a `GeneratorConfig` from its TOML file.

use crate::types::{GenError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the generator library
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratorConfig {
    /// Name of the runtime module the generated code imports (reader, decoder, to_physical)
    #[serde(default = "default_runtime_module")]
    pub runtime_module: String,

    /// What generated decode code does when a switch value matches no known group
    #[serde(default)]
    pub unmatched_switch: UnmatchedSwitch,

    /// Whether to emit constants for signal value descriptions
    #[serde(default = "default_true")]
    pub value_descriptions: bool,

    /// Resolve multiplex trees on the rayon thread pool
    #[serde(default)]
    pub parallel: bool,

    /// Optional: only generate these CAN message IDs
    #[serde(default)]
    pub message_filter: Option<Vec<u32>>,
}

fn default_runtime_module() -> String {
    "dbc".to_string()
}

fn default_true() -> bool {
    true
}

/// Behavior of generated decode code for a switch value with no matching group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedSwitch {
    /// Return an instance of the deepest class whose discriminators all matched
    #[default]
    ReturnParent,
    /// Throw from the generated decode function
    Fail,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            runtime_module: default_runtime_module(),
            unmatched_switch: UnmatchedSwitch::default(),
            value_descriptions: true,
            parallel: false,
            message_filter: None,
        }
    }
}

impl GeneratorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the runtime module imported by generated code
    pub fn with_runtime_module(mut self, module: impl Into<String>) -> Self {
        self.runtime_module = module.into();
        self
    }

    /// Set the unmatched switch value policy
    pub fn with_unmatched_switch(mut self, policy: UnmatchedSwitch) -> Self {
        self.unmatched_switch = policy;
        self
    }

    /// Enable/disable value description constants
    pub fn with_value_descriptions(mut self, enabled: bool) -> Self {
        self.value_descriptions = enabled;
        self
    }

    /// Enable/disable parallel tree resolution
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Set message ID filter (only generate these IDs)
    pub fn with_message_filter(mut self, ids: Vec<u32>) -> Self {
        self.message_filter = Some(ids);
        self
    }

    /// Check whether a CAN ID passes the message filter
    pub fn should_generate(&self, can_id: u32) -> bool {
        self.message_filter
            .as_ref()
            .map_or(true, |ids| ids.contains(&can_id))
    }

    /// Reject settings that would produce unusable output
    pub fn validate(&self) -> Result<()> {
        let module = self.runtime_module.as_str();
        let valid = !module.is_empty()
            && !module.starts_with(|c: char| c.is_ascii_digit())
            && module
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
        if !valid {
            return Err(GenError::ConfigError(format!(
                "runtime_module '{}' is not a valid module path",
                module
            )));
        }
        Ok(())
    }
}
