//! Declarative stack definitions
//!
//! Builds trees and stacks from JSON documents such as:
//!
//! ```json
//! {
//!   "layers": [
//!     { "name": "guest", "permissions": [{ "scope": "glimpse:productions:*:read", "decision": true }] },
//!     { "name": "user",  "permissions": [{ "scope": "glimpse:users:*", "decision": "DENY" }] }
//!   ]
//! }
//! ```

use crate::error::{AuthzError, Result};
use crate::permission::{Decision, Permission};
use crate::stack::PermissionTreeStack;
use crate::tree::PermissionTree;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Decision as written in configuration: a boolean or a decision name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DecisionConfig {
    /// `true` allows, `false` denies
    Flag(bool),
    /// `"ALLOW"`, `"DENY"` or `"NONE"`
    Named(Decision),
}

impl From<DecisionConfig> for Decision {
    fn from(config: DecisionConfig) -> Self {
        match config {
            DecisionConfig::Flag(allow) => Decision::from(allow),
            DecisionConfig::Named(decision) => decision,
        }
    }
}

/// One permission entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionConfig {
    /// Scope pattern
    pub scope: String,

    /// Decision applied when the pattern matches
    pub decision: DecisionConfig,
}

impl PermissionConfig {
    pub fn build(&self) -> Permission {
        Permission::new(self.scope.as_str(), self.decision)
    }
}

/// A named tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Layer name (e.g. "role", "user", "session")
    pub name: String,

    /// Permissions added in order
    #[serde(default)]
    pub permissions: Vec<PermissionConfig>,
}

impl LayerConfig {
    /// Build the tree for this layer
    pub fn build(&self) -> PermissionTree {
        self.permissions.iter().map(PermissionConfig::build).collect()
    }
}

/// Ordered layers making up a stack
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackConfig {
    /// Layers, consulted in this order
    #[serde(default)]
    pub layers: Vec<LayerConfig>,
}

impl StackConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading stack configuration from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Check that every layer has a unique, non-empty name
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (idx, layer) in self.layers.iter().enumerate() {
            if layer.name.trim().is_empty() {
                return Err(AuthzError::InvalidConfig(format!("layer {} has an empty name", idx)));
            }
            if !seen.insert(layer.name.as_str()) {
                return Err(AuthzError::InvalidConfig(format!(
                    "duplicate layer name '{}'",
                    layer.name
                )));
            }
        }
        Ok(())
    }

    /// Look up a layer by name
    pub fn layer(&self, name: &str) -> Option<&LayerConfig> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    /// Build a stack with the layers pushed in file order
    pub fn build(&self) -> PermissionTreeStack {
        let stack: PermissionTreeStack = self
            .layers
            .iter()
            .map(|layer| Arc::new(layer.build()))
            .collect();

        info!(
            "Built permission stack with {} layers ({} permissions)",
            self.layers.len(),
            self.layers.iter().map(|layer| layer.permissions.len()).sum::<usize>()
        );
        stack
    }
}
