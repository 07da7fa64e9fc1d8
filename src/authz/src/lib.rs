//! # Scope Authorization Engine
//!
//! Scope-based permission evaluation: given a set of
//! (scope pattern, decision) pairs, find the effective decision for any
//! concrete scope string.
//!
//! ## Features
//!
//! - **Tiered scopes** like `glimpse:users:read` with `*` wildcard tiers
//! - **Deterministic conflict resolution**: more specific patterns win,
//!   then fewer wildcards, then DENY over ALLOW
//! - **Permission trees** indexing permissions by tier
//! - **Layered stacks** combining role, user and session trees
//! - **Declarative configuration** of stacks from JSON
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use scope_authz::{Decision, Permission, PermissionTree, PermissionTreeStack};
//!
//! let tree = PermissionTree::with_permissions([
//!     Permission::new("glimpse:test", true),
//!     Permission::new("glimpse:test2:read", false),
//! ]);
//!
//! assert_eq!(tree.evaluate("glimpse:test"), Decision::Allow);
//! assert_eq!(tree.evaluate("glimpse:test2"), Decision::NoOpinion);
//! assert_eq!(tree.evaluate("glimpse:test2:read"), Decision::Deny);
//!
//! let mut stack = PermissionTreeStack::new();
//! stack.push(Arc::new(tree));
//! assert_eq!(stack.evaluate("glimpse:test"), Decision::Allow);
//! ```

pub mod scope;
pub mod permission;
pub mod tree;
pub mod stack;
pub mod guard;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use scope::{format_scope, AsScope, Scope, SEPARATOR, WILDCARD};
pub use permission::{Decision, Permission};
pub use tree::{NodeRef, PermissionTree, FULL_ACCESS};
pub use stack::PermissionTreeStack;
pub use guard::AccessGuard;
pub use config::{LayerConfig, StackConfig};
pub use error::{AuthzError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
