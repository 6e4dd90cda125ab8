//! URL canonicalization: the stable dedup key for harvested postings.

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize a URL string into the form used for deduplication.
///
/// The canonical form is scheme + host + path: two links to the same posting
/// that differ only in query string, fragment, or a trailing slash collapse
/// to one key. Canonicalizing an already-canonical URL is a no-op.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to https:// if missing
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Remove the query string
/// 6. Strip a trailing slash from the path (the root path stays `/`)
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };

    let mut parsed = url::Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str() {
        let lowered = host.to_lowercase();
        parsed
            .set_host(Some(&lowered))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);
    parsed.set_query(None);

    let path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(path.trim_end_matches('/'));
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_basic() {
        let url = canonicalize("https://example.com").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_canonicalize_default_scheme() {
        let url = canonicalize("example.com").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_canonicalize_lowercase_host() {
        let url = canonicalize("https://WORK.UA/jobs/123").unwrap();
        assert_eq!(url.host_str(), Some("work.ua"));
    }

    #[test]
    fn test_canonicalize_remove_fragment() {
        let url = canonicalize("https://example.com/jobs/5#apply").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/jobs/5");
    }

    #[test]
    fn test_canonicalize_strips_query() {
        let url = canonicalize("https://djinni.co/jobs/123?utm_source=search&page=2").unwrap();
        assert_eq!(url.query(), None);
        assert_eq!(url.as_str(), "https://djinni.co/jobs/123");
    }

    #[test]
    fn test_canonicalize_strips_trailing_slash() {
        let url = canonicalize("https://djinni.co/jobs/123/").unwrap();
        assert_eq!(url.path(), "/jobs/123");
    }

    #[test]
    fn test_canonicalize_keeps_root_path() {
        let url = canonicalize("https://example.com/").unwrap();
        assert_eq!(url.path(), "/");
    }

    #[test]
    fn test_canonicalize_query_variants_collapse() {
        let plain = canonicalize("https://work.ua/jobs/42").unwrap();
        let with_query = canonicalize("https://work.ua/jobs/42?x=1").unwrap();
        let with_slash = canonicalize("https://work.ua/jobs/42/").unwrap();
        assert_eq!(plain, with_query);
        assert_eq!(plain, with_slash);
    }

    #[test]
    fn test_canonicalize_idempotent() {
        let once = canonicalize("https://Work.UA/jobs/42/?ref=feed#top").unwrap();
        let twice = canonicalize(once.as_str()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_canonicalize_trim_whitespace() {
        let url = canonicalize("  https://example.com/jobs/1  ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/jobs/1");
    }

    #[test]
    fn test_canonicalize_unsupported_scheme() {
        let result = canonicalize("file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_canonicalize_empty() {
        let result = canonicalize("");
        assert!(matches!(result, Err(UrlError::Empty)));
    }

    #[test]
    fn test_canonicalize_whitespace_only() {
        let result = canonicalize("   ");
        assert!(matches!(result, Err(UrlError::Empty)));
    }

    #[test]
    fn test_canonicalize_http_allowed() {
        let url = canonicalize("http://example.com/jobs/1").unwrap();
        assert_eq!(url.scheme(), "http");
    }
}
