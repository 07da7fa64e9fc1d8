//! Assertion helper bound to an explicitly owned permission stack
//!
//! An [`AccessGuard`] starts with an empty stack and is shared by whoever
//! assembles the application, usually behind an `Arc`. Stack mutations go
//! through a write lock so that concurrent callers always evaluate a
//! consistent set of layers.

use crate::error::{AuthzError, Result};
use crate::permission::Decision;
use crate::scope::{format_scope, AsScope};
use crate::stack::PermissionTreeStack;
use crate::tree::PermissionTree;
use parking_lot::RwLock;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, warn};

/// Lock-protected stack with ALLOW-or-error assertions
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use scope_authz::{AccessGuard, Permission, PermissionTree};
///
/// let guard = AccessGuard::new();
/// guard.push(Arc::new(PermissionTree::with_permissions([
///     Permission::allow("glimpse:productions:*:read"),
/// ])));
///
/// assert!(guard.assert_formatted("glimpse:productions:$1:read", &[&42]).is_ok());
/// assert!(guard.assert_permission("glimpse:productions:42:write").is_err());
/// ```
#[derive(Debug, Default)]
pub struct AccessGuard {
    stack: RwLock<PermissionTreeStack>,
}

impl AccessGuard {
    /// Create a guard with an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a guard around an existing stack
    pub fn with_stack(stack: PermissionTreeStack) -> Self {
        Self {
            stack: RwLock::new(stack),
        }
    }

    /// Push a tree on top of the stack
    pub fn push(&self, tree: Arc<PermissionTree>) {
        self.stack.write().push(tree);
    }

    /// Remove the most recently pushed tree
    pub fn pop(&self) -> Option<Arc<PermissionTree>> {
        self.stack.write().pop()
    }

    /// The most recently pushed tree
    pub fn peek(&self) -> Option<Arc<PermissionTree>> {
        self.stack.read().peek().cloned()
    }

    /// Drop every layer, returning to the initial empty state
    pub fn reset(&self) {
        debug!("Resetting access guard stack");
        self.stack.write().clear();
    }

    /// Swap in a new stack, returning the previous one
    pub fn replace(&self, stack: PermissionTreeStack) -> PermissionTreeStack {
        std::mem::replace(&mut *self.stack.write(), stack)
    }

    /// Copy of the current stack
    pub fn snapshot(&self) -> PermissionTreeStack {
        self.stack.read().clone()
    }

    /// Evaluate a scope against the current stack
    pub fn evaluate(&self, scope: impl AsScope) -> Decision {
        self.stack.read().evaluate(scope)
    }

    /// Returns true when the scope evaluates to ALLOW
    pub fn check(&self, scope: impl AsScope) -> bool {
        self.evaluate(scope).is_allow()
    }

    /// Succeeds only when the scope evaluates to ALLOW
    ///
    /// DENY and NO-OPINION both produce [`AuthzError::AccessDenied`]
    /// carrying the requested scope. An empty string names no scope, while
    /// an empty [`Scope`](crate::scope::Scope) value is still reported.
    pub fn assert_permission(&self, scope: impl AsScope) -> Result<()> {
        let parsed = scope.as_scope();
        let decision = self.evaluate(&*parsed);
        if decision.is_allow() {
            return Ok(());
        }

        warn!("Access denied for scope {:?} (decision {})", parsed.serialize(), decision.as_str());
        Err(match scope.raw_text() {
            Some(text) => AuthzError::access_denied(text),
            None => AuthzError::AccessDenied {
                scope: Some(parsed.serialize()),
            },
        })
    }

    /// Substitute `$n` placeholders, then assert the resulting scope
    pub fn assert_formatted(&self, pattern: &str, vars: &[&dyn Display]) -> Result<()> {
        self.assert_permission(format_scope(pattern, vars))
    }
}
