/// Scope type definitions
///
/// Provides the core Scope type: an ordered list of colon-separated tiers
/// acting either as a concrete path or as a wildcard pattern.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Character separating the tiers of a scope
pub const SEPARATOR: char = ':';

/// Tier matching any single tier, or any remaining depth when trailing
pub const WILDCARD: &str = "*";

/// Represents a tiered scope with wildcard pattern capabilities
///
/// A scope is a colon-separated string:
/// - `glimpse:users:read` (concrete path)
/// - `glimpse:*:read` (wildcard - matches exactly one tier)
/// - `glimpse:users:*` (trailing wildcard - matches that tier and anything deeper)
///
/// Only a tier consisting of exactly `*` is a wildcard; `*admin*` is a
/// literal tier. Parsing never fails and any string is a legal tier.
///
/// # Examples
///
/// ```
/// use scope_authz::scope::Scope;
///
/// let pattern = Scope::parse("glimpse:users:*");
/// assert_eq!(pattern.len(), 3);
/// assert_eq!(pattern.wildcard_count(), 1);
/// assert!(pattern.includes("glimpse:users:robere2:email"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Scope {
    /// Parsed tiers
    tiers: Vec<String>,
    /// Number of tiers equal to the wildcard token
    wildcard_count: usize,
}

impl Scope {
    /// Creates a scope with no tiers
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a scope string
    ///
    /// The empty string yields a scope with zero tiers rather than one empty tier.
    pub fn parse(s: &str) -> Self {
        let mut scope = Self::new();
        if !s.is_empty() {
            scope.push_tier(s);
        }
        scope
    }

    /// Returns an independent copy of the tiers
    pub fn tiers(&self) -> Vec<String> {
        self.tiers.clone()
    }

    /// Borrows the tiers without copying
    pub fn as_slice(&self) -> &[String] {
        &self.tiers
    }

    /// Iterates over the tiers in order
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.tiers.iter()
    }

    /// Returns the tier at `index`
    ///
    /// Non-negative indices count from the start, negative ones from the
    /// end (`-1` is the last tier). Out of range yields `None`.
    pub fn at(&self, index: isize) -> Option<&str> {
        let resolved = if index >= 0 {
            index
        } else {
            self.tiers.len() as isize + index
        };
        if resolved < 0 {
            return None;
        }
        self.tiers.get(resolved as usize).map(String::as_str)
    }

    /// Same as [`Scope::at`], flooring a fractional index first
    pub fn at_f64(&self, index: f64) -> Option<&str> {
        let floored = index.floor();
        if !floored.is_finite() || floored.abs() > isize::MAX as f64 {
            return None;
        }
        self.at(floored as isize)
    }

    /// Number of tiers
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Returns whether this scope has no tiers
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Number of tiers equal to [`WILDCARD`]
    pub fn wildcard_count(&self) -> usize {
        self.wildcard_count
    }

    /// Returns whether the last tier is the wildcard token
    pub fn ends_with_wildcard(&self) -> bool {
        self.tiers.last().map_or(false, |tier| tier == WILDCARD)
    }

    /// Appends tiers to the end of this scope
    ///
    /// Strings are split on the separator first, so `"a:b"` appends two
    /// tiers. Another scope appends all of its tiers in order.
    pub fn push_tier(&mut self, tier: impl IntoTiers) {
        for tier in tier.into_tiers() {
            if tier == WILDCARD {
                self.wildcard_count += 1;
            }
            self.tiers.push(tier);
        }
    }

    /// Removes and returns the last tier
    pub fn pop_tier(&mut self) -> Option<String> {
        let popped = self.tiers.pop();
        if popped.as_deref() == Some(WILDCARD) {
            self.wildcard_count -= 1;
        }
        popped
    }

    /// Deep copy of this scope
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Joins the tiers back together with the separator
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for (idx, tier) in self.tiers.iter().enumerate() {
            if idx > 0 {
                out.push(SEPARATOR);
            }
            out.push_str(tier);
        }
        out
    }

    /// Checks whether this scope, used as a pattern, covers `other`
    ///
    /// - A pattern with more tiers than `other` never covers it
    /// - A non-trailing wildcard stands in for exactly one tier
    /// - A trailing wildcard covers its tier and everything deeper
    /// - Every other tier must be equal
    ///
    /// # Examples
    ///
    /// ```
    /// use scope_authz::scope::Scope;
    ///
    /// let pattern = Scope::parse("rpitv:*:a_scope");
    /// assert!(pattern.includes("rpitv:anything:a_scope"));
    /// assert!(!pattern.includes("rpitv:anything:a_scope:extra"));
    ///
    /// assert!(Scope::parse("*").includes("anything:at:all:depth"));
    /// assert!(!Scope::parse("*").includes(""));
    /// ```
    pub fn includes(&self, other: impl AsScope) -> bool {
        let other = other.as_scope();
        if self.tiers.len() > other.tiers.len() {
            return false;
        }

        let last = self.tiers.len().checked_sub(1);
        for (idx, theirs) in other.tiers.iter().enumerate() {
            match self.tiers.get(idx) {
                Some(ours) if ours == WILDCARD => {
                    if Some(idx) == last {
                        return true;
                    }
                }
                Some(ours) if ours == theirs => {}
                _ => return false,
            }
        }

        true
    }

    /// Priority order between two patterns
    ///
    /// `Less` means `self` takes priority. More tiers come first; with
    /// equal tier counts, fewer wildcards come first. Anything else is
    /// `Equal` and must keep its original order (use a stable sort).
    pub fn compare(&self, other: &Scope) -> Ordering {
        other
            .tiers
            .len()
            .cmp(&self.tiers.len())
            .then_with(|| self.wildcard_count.cmp(&other.wildcard_count))
    }
}

/// Sources of tiers accepted by [`Scope::push_tier`]
pub trait IntoTiers {
    /// Splits the value into individual tiers
    fn into_tiers(self) -> Vec<String>;
}

impl IntoTiers for &str {
    fn into_tiers(self) -> Vec<String> {
        self.split(SEPARATOR).map(str::to_string).collect()
    }
}

impl IntoTiers for String {
    fn into_tiers(self) -> Vec<String> {
        self.as_str().into_tiers()
    }
}

impl IntoTiers for &String {
    fn into_tiers(self) -> Vec<String> {
        self.as_str().into_tiers()
    }
}

impl IntoTiers for &Scope {
    fn into_tiers(self) -> Vec<String> {
        self.tiers.clone()
    }
}

impl IntoTiers for Scope {
    fn into_tiers(self) -> Vec<String> {
        self.tiers
    }
}

/// Values that can be viewed as a [`Scope`] without necessarily copying it
///
/// Lets query methods accept `&Scope`, `Scope`, `&str` and `String` alike.
pub trait AsScope {
    /// Borrow or parse into a scope
    fn as_scope(&self) -> Cow<'_, Scope>;

    /// The unparsed text, when the scope was given as a string
    fn raw_text(&self) -> Option<&str> {
        None
    }
}

impl AsScope for Scope {
    fn as_scope(&self) -> Cow<'_, Scope> {
        Cow::Borrowed(self)
    }
}

impl AsScope for str {
    fn as_scope(&self) -> Cow<'_, Scope> {
        Cow::Owned(Scope::parse(self))
    }

    fn raw_text(&self) -> Option<&str> {
        Some(self)
    }
}

impl AsScope for String {
    fn as_scope(&self) -> Cow<'_, Scope> {
        Cow::Owned(Scope::parse(self))
    }

    fn raw_text(&self) -> Option<&str> {
        Some(self)
    }
}

impl<T: AsScope + ?Sized> AsScope for &T {
    fn as_scope(&self) -> Cow<'_, Scope> {
        (**self).as_scope()
    }

    fn raw_text(&self) -> Option<&str> {
        (**self).raw_text()
    }
}

impl FromStr for Scope {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Scope {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for Scope {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&Scope> for Scope {
    fn from(scope: &Scope) -> Self {
        scope.clone()
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.serialize()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl<'a> IntoIterator for &'a Scope {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tiers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_creation() {
        let scope = Scope::parse("alpha:beta:charlie:delta");
        assert_eq!(scope.tiers(), vec!["alpha", "beta", "charlie", "delta"]);
        assert_eq!(scope.len(), 4);
        assert_eq!(scope.wildcard_count(), 0);
    }

    #[test]
    fn test_empty_scope() {
        assert!(Scope::parse("").is_empty());
        assert!(Scope::new().is_empty());
        assert_eq!(Scope::parse(""), Scope::new());
    }

    #[test]
    fn test_push_empty_string_adds_one_tier() {
        let mut scope = Scope::new();
        scope.push_tier("");
        assert_eq!(scope.len(), 1);
        assert_eq!(scope.at(0), Some(""));
    }

    #[test]
    fn test_wildcard_count_follows_mutations() {
        let mut scope = Scope::parse("glimpse:*");
        assert_eq!(scope.wildcard_count(), 1);

        scope.push_tier("*:x:*");
        assert_eq!(scope.wildcard_count(), 3);

        scope.pop_tier();
        assert_eq!(scope.wildcard_count(), 2);
        scope.pop_tier();
        assert_eq!(scope.wildcard_count(), 2);
        scope.pop_tier();
        assert_eq!(scope.wildcard_count(), 1);
    }

    #[test]
    fn test_partial_wildcard_is_literal() {
        let scope = Scope::parse("*admin*:x");
        assert_eq!(scope.wildcard_count(), 0);
        assert!(!scope.includes("root:x"));
        assert!(scope.includes("*admin*:x"));
    }

    #[test]
    fn test_ends_with_wildcard() {
        assert!(Scope::parse("a:*").ends_with_wildcard());
        assert!(!Scope::parse("*:a").ends_with_wildcard());
        assert!(!Scope::new().ends_with_wildcard());
    }

    #[test]
    fn test_display_and_from_str() {
        let scope: Scope = "testing:123:456:hello".parse().unwrap();
        assert_eq!(format!("{}", scope), "testing:123:456:hello");
    }
}
