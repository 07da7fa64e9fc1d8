/// Positional placeholder substitution for scope strings
///
/// `$1` through `$9` are replaced by the matching one-indexed value.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::fmt::Display;

use super::types::Scope;

/// Highest placeholder number that is substituted
pub const MAX_PLACEHOLDERS: usize = 9;

lazy_static! {
    /// A `$` followed by a single non-zero digit
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\$([1-9])").expect("placeholder pattern is a valid regex");
}

/// Substitutes `$1`..`$9` placeholders in `pattern`
///
/// Placeholders without a matching value are left as-is, and values
/// without a placeholder are ignored. Only the single digit after `$` is
/// consumed, so `"$11"` with one value becomes that value followed by `1`.
/// Substituted text is not scanned again.
///
/// # Examples
///
/// ```
/// use scope_authz::scope::format_scope;
///
/// assert_eq!(format_scope("$1,$3,$4", &[&"a", &"b", &"c", &"d"]), "a,c,d");
/// assert_eq!(format_scope("$1,$2,$3,$4", &[&"a", &"b", &"c"]), "a,b,c,$4");
/// assert_eq!(format_scope("9 + $1 = $2", &[&10, &21]), "9 + 10 = 21");
/// ```
pub fn format_scope(pattern: &str, vars: &[&dyn Display]) -> String {
    if vars.is_empty() {
        return pattern.to_string();
    }

    let vars = &vars[..vars.len().min(MAX_PLACEHOLDERS)];
    PLACEHOLDER
        .replace_all(pattern, |caps: &Captures| {
            let slot = caps[1].parse::<usize>().ok().and_then(|n| vars.get(n - 1));
            match slot {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

impl Scope {
    /// Returns a new scope with placeholders substituted
    ///
    /// `self` is left untouched.
    pub fn format(&self, vars: &[&dyn Display]) -> Scope {
        Scope::parse(&format_scope(&self.serialize(), vars))
    }
}

/// Formats a scope pattern with any number of displayable values
///
/// ```
/// use scope_authz::format_scope;
///
/// let user = "robere2";
/// assert_eq!(format_scope!("glimpse:users:$1:read", user), "glimpse:users:robere2:read");
/// ```
#[macro_export]
macro_rules! format_scope {
    ($pattern:expr) => {
        $crate::scope::format_scope($pattern, &[])
    };
    ($pattern:expr, $($var:expr),+ $(,)?) => {
        $crate::scope::format_scope(
            $pattern,
            &[$(&$var as &dyn ::std::fmt::Display),+],
        )
    };
}
