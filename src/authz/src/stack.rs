//! Layered composition of permission trees
//!
//! A stack lets independently built trees (role, user, session, ...)
//! answer one query together. Mutation is last-in first-out, but
//! evaluation walks the layers in the order they were pushed: the first
//! tree pushed is consulted first and the first explicit decision wins.

use crate::permission::Decision;
use crate::scope::AsScope;
use crate::tree::PermissionTree;
use std::sync::Arc;
use tracing::debug;

/// Ordered sequence of shared permission trees
///
/// Trees are held by reference, so one tree may sit in several stacks or
/// several times in the same stack. A tree is immutable once it is shared:
/// `Arc::make_mut` on a pushed tree yields a private copy that no stack
/// sees. To change a layer, pop it and push the rebuilt tree, or swap the
/// whole stack through [`AccessGuard::replace`](crate::guard::AccessGuard::replace).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use scope_authz::{Decision, Permission, PermissionTree, PermissionTreeStack};
///
/// let role = Arc::new(PermissionTree::with_permissions([Permission::deny("glimpse:users:*")]));
/// let user = Arc::new(PermissionTree::with_permissions([Permission::allow("glimpse:users:read")]));
///
/// let mut stack = PermissionTreeStack::new();
/// stack.push(role);
/// stack.push(user);
///
/// // The first pushed layer already has an opinion
/// assert_eq!(stack.evaluate("glimpse:users:read"), Decision::Deny);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PermissionTreeStack {
    trees: Vec<Arc<PermissionTree>>,
}

impl PermissionTreeStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a tree on top
    pub fn push(&mut self, tree: Arc<PermissionTree>) {
        self.trees.push(tree);
    }

    /// Push several trees; the last one ends up on top
    pub fn push_all(&mut self, trees: impl IntoIterator<Item = Arc<PermissionTree>>) {
        self.trees.extend(trees);
    }

    /// Remove and return the most recently pushed tree
    pub fn pop(&mut self) -> Option<Arc<PermissionTree>> {
        self.trees.pop()
    }

    /// The most recently pushed tree
    pub fn peek(&self) -> Option<&Arc<PermissionTree>> {
        self.trees.last()
    }

    /// Remove every tree
    pub fn clear(&mut self) {
        self.trees.clear();
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Trees in push order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<PermissionTree>> {
        self.trees.iter()
    }

    /// Resolve a scope against every layer
    ///
    /// Returns the first non NO-OPINION decision walking the trees in
    /// push order, or NO-OPINION if no layer has one.
    pub fn evaluate(&self, scope: impl AsScope) -> Decision {
        let scope = scope.as_scope();

        for (layer, tree) in self.trees.iter().enumerate() {
            let decision = tree.evaluate(&*scope);
            if decision.is_explicit() {
                debug!("Stack layer {} decided {} for {}", layer, decision.as_str(), scope);
                return decision;
            }
        }

        debug!("No layer of {} had an opinion on {}", self.trees.len(), scope);
        Decision::NoOpinion
    }
}

impl FromIterator<Arc<PermissionTree>> for PermissionTreeStack {
    fn from_iter<I: IntoIterator<Item = Arc<PermissionTree>>>(iter: I) -> Self {
        let mut stack = Self::new();
        stack.push_all(iter);
        stack
    }
}
