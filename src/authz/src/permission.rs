//! Permission entries and the three-valued decision

use crate::scope::Scope;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Outcome of evaluating a scope
///
/// `NoOpinion` means "defer to someone else": trees skip it while
/// resolving and stacks fall through to the next layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Decision {
    /// No applicable entry
    #[default]
    #[serde(rename = "NONE")]
    NoOpinion,
    /// Grant access
    #[serde(rename = "ALLOW")]
    Allow,
    /// Refuse access
    #[serde(rename = "DENY")]
    Deny,
}

impl Decision {
    /// Fixed ranking used to order entries (-1, 0, 1)
    pub fn rank(self) -> i8 {
        match self {
            Self::NoOpinion => -1,
            Self::Allow => 0,
            Self::Deny => 1,
        }
    }

    /// Returns true only for ALLOW
    pub fn is_allow(self) -> bool {
        self == Self::Allow
    }

    /// Returns true for ALLOW or DENY
    pub fn is_explicit(self) -> bool {
        self != Self::NoOpinion
    }

    /// Upper-case name used in configuration and CLI output
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoOpinion => "NONE",
            Self::Allow => "ALLOW",
            Self::Deny => "DENY",
        }
    }
}

impl From<bool> for Decision {
    fn from(allow: bool) -> Self {
        if allow {
            Self::Allow
        } else {
            Self::Deny
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rank())
    }
}

/// A scope pattern paired with a decision
///
/// Permissions are immutable once built. They are added to
/// [`PermissionTree`](crate::tree::PermissionTree)s to group the grants of
/// a user, role or session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    /// Scope this permission applies to
    scope: Scope,
    /// Allow, deny or no opinion
    decision: Decision,
}

impl Permission {
    /// Create a new permission
    ///
    /// `decision` may be a [`Decision`] or a `bool` (`true` is ALLOW,
    /// `false` is DENY).
    pub fn new(scope: impl Into<Scope>, decision: impl Into<Decision>) -> Self {
        Self {
            scope: scope.into(),
            decision: decision.into(),
        }
    }

    /// Allowing permission
    pub fn allow(scope: impl Into<Scope>) -> Self {
        Self::new(scope, Decision::Allow)
    }

    /// Denying permission
    pub fn deny(scope: impl Into<Scope>) -> Self {
        Self::new(scope, Decision::Deny)
    }

    /// Returns a copy of the scope
    pub fn scope(&self) -> Scope {
        self.scope.copy()
    }

    /// Borrows the scope without copying it
    pub fn scope_ref(&self) -> &Scope {
        &self.scope
    }

    /// The decision carried by this permission
    pub fn decision(&self) -> Decision {
        self.decision
    }

    /// Priority order between two permissions
    ///
    /// `Less` means `self` is applied first. Scope specificity decides;
    /// on a tie DENY beats ALLOW beats NO-OPINION.
    pub fn compare(&self, other: &Permission) -> Ordering {
        self.scope
            .compare(&other.scope)
            .then_with(|| other.decision.rank().cmp(&self.decision.rank()))
    }

    /// Debug representation, `"<scope> = <rank>"`
    pub fn serialize(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.scope, self.decision)
    }
}
