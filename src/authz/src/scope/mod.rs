/// Tiered scope module
///
/// This module provides the scope representation used by permission trees:
/// tier parsing, wildcard containment, specificity ordering and
/// placeholder formatting.
///
/// # Examples
///
/// ```
/// use scope_authz::scope::Scope;
///
/// let pattern = Scope::parse("glimpse:tags:*");
/// let concrete = Scope::parse("glimpse:tags:Private:read");
///
/// assert!(pattern.includes(&concrete));
/// assert!(concrete.compare(&pattern).is_lt());
/// ```

mod types;
mod format;


pub use types::{AsScope, IntoTiers, Scope, SEPARATOR, WILDCARD};
pub use format::{format_scope, MAX_PLACEHOLDERS};
