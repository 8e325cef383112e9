//! Token stability policy
//!
//! Decides whether an id or class token is worth pinning a locator to.
//! Generated identifiers (numeric suffixes, hash blobs) change between page
//! loads and would break the locator. The predicate is swappable: hosts
//! with unusual naming schemes supply their own.

use regex::Regex;

/// Predicate for id/class token stability
pub trait StablePolicy {
    fn is_stable(&self, token: &str) -> bool;
}

/// Default policy backed by a small set of rejection patterns.
///
/// Rejects tokens that are not plain identifiers, purely numeric, hex blobs
/// of 8+ chars, or carry a 5+ digit run.
pub struct RegexStablePolicy {
    ident: Regex,
    hex_blob: Regex,
    digit_run: Regex,
}

impl RegexStablePolicy {
    pub fn new() -> Self {
        Self {
            ident: Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("static pattern"),
            hex_blob: Regex::new(r"^[0-9a-fA-F]{8,}$").expect("static pattern"),
            digit_run: Regex::new(r"[0-9]{5,}").expect("static pattern"),
        }
    }
}

impl Default for RegexStablePolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl StablePolicy for RegexStablePolicy {
    fn is_stable(&self, token: &str) -> bool {
        !token.is_empty()
            && self.ident.is_match(token)
            && !self.hex_blob.is_match(token)
            && !self.digit_run.is_match(token)
    }
}

/// Tag names outside the plain-identifier shape render as wildcards
pub(crate) fn is_supported_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .chars()
            .enumerate()
            .all(|(i, c)| c.is_ascii_alphabetic() || (i > 0 && (c.is_ascii_digit() || c == '-')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_tokens() {
        let p = RegexStablePolicy::new();
        assert!(p.is_stable("btn-primary"));
        assert!(p.is_stable("nav_main"));
        assert!(p.is_stable("h1"));
        assert!(p.is_stable("col2"));
    }

    #[test]
    fn test_unstable_tokens() {
        let p = RegexStablePolicy::new();
        assert!(!p.is_stable(""));
        assert!(!p.is_stable("12345"));
        assert!(!p.is_stable("a1b2c3d4e5"));
        assert!(!p.is_stable("deadbeef"));
        assert!(!p.is_stable("item-10293"));
        assert!(!p.is_stable("css[module]"));
    }

    #[test]
    fn test_supported_tags() {
        assert!(is_supported_tag("div"));
        assert!(is_supported_tag("h1"));
        assert!(is_supported_tag("my-widget"));
        assert!(!is_supported_tag("ns:tag"));
        assert!(!is_supported_tag("1bad"));
        assert!(!is_supported_tag(""));
    }
}
