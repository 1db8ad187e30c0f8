//! URL normalization for the verdict hot path
//!
//! These functions avoid allocations and work directly on string slices.

// =============================================================================
// Scheme Stripping
// =============================================================================

const HTTPS_PREFIX: &[u8] = b"https://";
const HTTP_PREFIX: &[u8] = b"http://";
const WWW_PREFIX: &[u8] = b"www.";

/// Documents whose URL starts with one of these are never evaluated.
pub const DEFAULT_INTERNAL_PREFIXES: &[&str] = &[
    "about:",
    "moz-extension:",
    "chrome:",
    "chrome-extension:",
    "edge:",
    "view-source:",
];

/// Length of a leading `http://` or `https://`, or 0 if there is none.
/// The scheme is compared case-insensitively.
#[inline]
pub fn scheme_len(url: &str) -> usize {
    let bytes = url.as_bytes();
    if bytes.len() >= HTTPS_PREFIX.len() && bytes[..HTTPS_PREFIX.len()].eq_ignore_ascii_case(HTTPS_PREFIX) {
        HTTPS_PREFIX.len()
    } else if bytes.len() >= HTTP_PREFIX.len() && bytes[..HTTP_PREFIX.len()].eq_ignore_ascii_case(HTTP_PREFIX) {
        HTTP_PREFIX.len()
    } else {
        0
    }
}

/// Strip a leading `http://`/`https://` and then a leading `www.` label.
///
/// Only the URL is ever normalized; patterns are compared as written.
/// Returns a slice into the original URL.
#[inline]
pub fn normalize(url: &str) -> &str {
    let rest = &url[scheme_len(url)..];
    match rest.as_bytes().get(..WWW_PREFIX.len()) {
        Some(head) if head == WWW_PREFIX => &rest[WWW_PREFIX.len()..],
        _ => rest,
    }
}

// =============================================================================
// Internal URLs
// =============================================================================

/// Check whether a URL belongs to the browser itself (settings pages,
/// extension pages, etc).
#[inline]
pub fn is_internal_url<S: AsRef<str>>(url: &str, prefixes: &[S]) -> bool {
    prefixes.iter().any(|p| url.starts_with(p.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_len() {
        assert_eq!(scheme_len("https://example.com"), 8);
        assert_eq!(scheme_len("http://example.com"), 7);
        assert_eq!(scheme_len("HTTPS://example.com"), 8);
        assert_eq!(scheme_len("ftp://example.com"), 0);
        assert_eq!(scheme_len("example.com"), 0);
        assert_eq!(scheme_len("http:/"), 0);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("https://www.example.com/a"), "example.com/a");
        assert_eq!(normalize("http://example.com"), "example.com");
        assert_eq!(normalize("www.example.com"), "example.com");
        assert_eq!(normalize("example.com/www.x"), "example.com/www.x");
        assert_eq!(normalize("https://"), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_strips_www_once() {
        assert_eq!(normalize("https://www.www.example.com"), "www.example.com");
        assert_eq!(normalize("https://wwwexample.com"), "wwwexample.com");
    }

    #[test]
    fn test_is_internal_url() {
        assert!(is_internal_url("about:blank", DEFAULT_INTERNAL_PREFIXES));
        assert!(is_internal_url("moz-extension://abc/page.html", DEFAULT_INTERNAL_PREFIXES));
        assert!(!is_internal_url("https://example.com", DEFAULT_INTERNAL_PREFIXES));

        let custom = vec!["file:".to_string()];
        assert!(is_internal_url("file:///tmp/a", &custom));
        assert!(!is_internal_url("about:blank", &custom));
    }
}
