//! Wildcard pattern matching
//!
//! A pattern is a wildcard expression anchored at the start of the normalized
//! URL. `*` matches zero or more characters; every other character is literal.
//! Nothing is required after the last literal segment, so a pattern without
//! `*` is a plain prefix test and `foo*` matches everything starting with `foo`.
//!
//! Characters like `?`, `.`, `[` and `(` always compare literally, so no
//! pattern can fail to compile.

use crate::url::normalize;

const WILDCARD: char = '*';

/// Test a raw URL against a raw pattern.
///
/// The URL is normalized (scheme and `www.` stripped); the pattern is not.
/// An empty URL, empty normalized URL, or empty pattern never matches.
pub fn matches(url: &str, pattern: &str) -> bool {
    if url.is_empty() || pattern.is_empty() {
        return false;
    }
    Pattern::compile(pattern).matches_normalized(normalize(url))
}

// =============================================================================
// Compiled Pattern
// =============================================================================

/// A pattern split into its literal segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    /// Literal text before the first `*`. Must be a prefix of the URL.
    head: String,
    /// Literal segments after each `*`, empty ones dropped.
    tail: Vec<String>,
    has_wildcard: bool,
}

impl Pattern {
    /// Split a pattern on `*`.
    pub fn compile(source: &str) -> Self {
        let mut parts = source.split(WILDCARD);
        let head = parts.next().unwrap_or_default().to_string();
        let tail: Vec<String> = parts.filter(|s| !s.is_empty()).map(str::to_string).collect();

        Self {
            source: source.to_string(),
            head,
            tail,
            has_wildcard: source.contains(WILDCARD),
        }
    }

    /// The pattern as written.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn has_wildcard(&self) -> bool {
        self.has_wildcard
    }

    /// Match against a URL that has already been passed through
    /// [`normalize`]. Does not allocate.
    pub fn matches_normalized(&self, url: &str) -> bool {
        if url.is_empty() || self.source.is_empty() {
            return false;
        }

        if !url.starts_with(self.head.as_str()) {
            return false;
        }

        let mut pos = self.head.len();
        for segment in &self.tail {
            match url[pos..].find(segment.as_str()) {
                Some(offset) => pos += offset + segment.len(),
                None => return false,
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_applies_to_url_only() {
        assert!(matches("https://www.example.com/a", "example.com"));
        assert!(matches("http://example.com/a", "example.com"));
        assert!(!matches("example.com/a", "www.example.com"));
        assert!(matches("https://www.example.com/a", "example.com/a"));
    }

    #[test]
    fn test_wildcard_suffix() {
        assert!(matches("example.com/path", "example.*"));
        assert!(matches("example.org", "example.*"));
        assert!(!matches("example.com", "other.*"));
        assert!(matches("example.", "example.*"));
    }

    #[test]
    fn test_plain_prefix() {
        assert!(matches("https://youtube.com/watch?v=1", "youtube.com"));
        assert!(!matches("https://m.youtube.com/", "youtube.com"));
        assert!(!matches("https://you.com", "youtube.com"));
    }

    #[test]
    fn test_inner_wildcards_are_ordered() {
        assert!(matches("reddit.com/r/rust/comments/1", "reddit.com/*/rust"));
        assert!(matches("reddit.com/r/rust", "reddit.com/*rust*"));
        assert!(!matches("reddit.com/r/golang", "reddit.com/*rust"));
        assert!(matches("a.com/xbxc", "a.com/*b*c"));
        assert!(!matches("a.com/cxb", "a.com/*b*c"));
    }

    #[test]
    fn test_leading_wildcard_and_star_only() {
        assert!(matches("news.example.com", "*example.com"));
        assert!(matches("anything.at/all", "*"));
        assert!(matches("anything", "**"));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(!matches("", "example.com"));
        assert!(!matches("example.com", ""));
        assert!(!matches("https://", "*"));
        assert!(!matches("https://www.", "*"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert!(matches("example.com/a?b=(1", "example.com/a?b=(1"));
        assert!(!matches("exampleXcom", "example.com"));
        assert!(matches("example.com/[x", "example.com/[*"));
        assert!(!matches("example.com/x", "example.com/[*"));
    }

    #[test]
    fn test_compile() {
        let p = Pattern::compile("a*b**c");
        assert_eq!(p.as_str(), "a*b**c");
        assert!(p.has_wildcard());
        assert!(p.matches_normalized("a-b-c"));
        assert!(!Pattern::compile("abc").has_wildcard());
    }
}
