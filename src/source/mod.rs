//! URL validation and classification.
//!
//! Every input URL is classified once, up front, as either a video URL (routed
//! through the caption strategies) or a generic web page.

mod youtube;

pub use youtube::VideoIdResolver;

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use url::Url;

/// Kind of content a URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Video,
    Generic,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Video => write!(f, "video"),
            SourceKind::Generic => write!(f, "generic"),
        }
    }
}

/// An input URL together with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUrl {
    raw: String,
    kind: SourceKind,
}

impl SourceUrl {
    /// Classify `raw` against the given video host substrings.
    pub fn classify<S: AsRef<str>>(raw: &str, video_hosts: &[S]) -> Self {
        let raw = raw.trim().to_string();
        let haystack = Url::parse(&raw)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
            .unwrap_or_else(|| raw.to_lowercase());

        let is_video = video_hosts
            .iter()
            .map(|h| h.as_ref().to_lowercase())
            .any(|h| !h.is_empty() && haystack.contains(&h));

        Self {
            raw,
            kind: if is_video {
                SourceKind::Video
            } else {
                SourceKind::Generic
            },
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn is_video(&self) -> bool {
        self.kind == SourceKind::Video
    }
}

impl std::fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Check that `input` is a well-formed absolute http(s) URL with a plausible host.
pub fn is_valid_url(input: &str) -> bool {
    let input = input.trim();
    if input.is_empty() || input.chars().any(char::is_whitespace) {
        return false;
    }

    let Ok(url) = Url::parse(input) else {
        return false;
    };

    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }

    match url.host_str() {
        Some(host) => {
            let host = host.trim_start_matches('[').trim_end_matches(']');
            host.parse::<IpAddr>().is_ok()
                || host.eq_ignore_ascii_case("localhost")
                || is_domain_name(host)
        }
        None => false,
    }
}

/// Dotted domain name with a non-numeric top-level label.
fn is_domain_name(host: &str) -> bool {
    let labels: Vec<&str> = host.trim_end_matches('.').split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let label_ok = |l: &&str| {
        !l.is_empty()
            && l.len() <= 63
            && !l.starts_with('-')
            && !l.ends_with('-')
            && l.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    };

    let tld = labels[labels.len() - 1];
    labels.iter().all(label_ok) && tld.chars().any(|c| c.is_ascii_alphabetic())
}

/// Strict video ID parsing: the `v` query parameter, or the first path segment of
/// a short link. Anything else is rejected.
pub fn parse_video_id(input: &str) -> Option<String> {
    let url = Url::parse(input.trim()).ok()?;

    if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
        let v = v.trim();
        return (!v.is_empty()).then(|| v.to_string());
    }

    let host = url.host_str()?.to_lowercase();
    if host == "youtu.be" || host.ends_with(".youtu.be") {
        return url
            .path_segments()?
            .next()
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOSTS: [&str; 2] = ["youtube.com", "youtu.be"];

    #[test]
    fn test_classify() {
        assert!(SourceUrl::classify("https://youtu.be/abc123", &HOSTS).is_video());
        assert!(SourceUrl::classify("https://www.youtube.com/watch?v=dQw4w9WgXcQ", &HOSTS).is_video());
        assert!(SourceUrl::classify("https://m.YouTube.com/watch?v=dQw4w9WgXcQ", &HOSTS).is_video());
        assert_eq!(
            SourceUrl::classify("https://example.com/page", &HOSTS).kind(),
            SourceKind::Generic
        );
    }

    #[test]
    fn test_classify_uses_host_not_path() {
        let url = SourceUrl::classify("https://example.com/article-about-youtube.com", &HOSTS);
        assert_eq!(url.kind(), SourceKind::Generic);
    }

    #[test]
    fn test_classify_trims() {
        let url = SourceUrl::classify("  https://youtu.be/abc123 ", &HOSTS);
        assert_eq!(url.as_str(), "https://youtu.be/abc123");
    }

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://example.com/page"));
        assert!(is_valid_url("http://localhost:8080/x"));
        assert!(is_valid_url("http://127.0.0.1/"));
        assert!(is_valid_url("https://youtu.be/abc123"));

        assert!(!is_valid_url(""));
        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url("ftp://example.com/file"));
        assert!(!is_valid_url("https://nodot"));
        assert!(!is_valid_url("https://exa mple.com"));
        assert!(!is_valid_url("https://-bad-.com"));
    }

    #[test]
    fn test_parse_video_id() {
        assert_eq!(
            parse_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            parse_video_id("https://www.youtube.com/watch?list=PL1&v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(parse_video_id("https://youtu.be/abc123"), Some("abc123".to_string()));
        assert_eq!(parse_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"), None);
        assert_eq!(parse_video_id("https://www.youtube.com/watch?v="), None);
        assert_eq!(parse_video_id("not a url"), None);
    }
}
