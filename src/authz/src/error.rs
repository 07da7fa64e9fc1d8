//! Error types for the permission engine
//!
//! Scope parsing, tree building and evaluation never fail. Errors only come
//! from the assertion helper and from loading declarative configuration.

use thiserror::Error;

/// Authorization errors
#[derive(Debug, Error)]
pub enum AuthzError {
    /// The evaluated scope did not resolve to ALLOW
    #[error("{}", access_denied_message(.scope))]
    AccessDenied {
        /// Scope that was requested, if one was supplied
        scope: Option<String>,
    },

    /// Invalid stack or layer definition
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed JSON configuration
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuthzError {
    /// Build an access denied error for a scope string.
    ///
    /// An empty string is treated the same as no scope at all.
    pub fn access_denied(scope: impl Into<String>) -> Self {
        let scope = scope.into();
        Self::AccessDenied {
            scope: if scope.is_empty() { None } else { Some(scope) },
        }
    }

    /// Returns true for the access denied variant
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }
}

fn access_denied_message(scope: &Option<String>) -> String {
    match scope {
        Some(scope) => format!("Missing required permission for scope {}", scope),
        None => "Missing required permissions".to_string(),
    }
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthzError>;
