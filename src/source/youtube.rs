//! Tolerant YouTube video ID resolution.

use regex::Regex;
use std::sync::OnceLock;

fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Matches the URL shapes YouTube hands out, plus bare video IDs
        Regex::new(
            r"(?xi)
            (?:
                (?:https?://)?
                (?:(?:www|m|music)\.)?
                (?:
                    youtube(?:-nocookie)?\.com/
                    (?:
                        watch\?(?:[^\s\#]*&)?v=
                        | embed/
                        | v/
                        | shorts/
                        | live/
                        | e/
                    )
                    | youtu\.be/
                )
                ([a-zA-Z0-9_-]{11})
                (?:[^a-zA-Z0-9_-]|$)
            )
            |
            # Bare video ID (11 characters)
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("video id regex is valid")
    })
}

/// Resolves video IDs from any of the common YouTube URL shapes.
///
/// More forgiving than [`super::parse_video_id`]: handles embed, shorts, live and
/// mobile links, and IDs buried after other query parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct VideoIdResolver;

impl VideoIdResolver {
    pub fn new() -> Self {
        Self
    }

    /// Extract video ID from a YouTube URL or bare ID.
    pub fn resolve(&self, input: &str) -> Option<String> {
        let caps = video_id_regex().captures(input.trim())?;

        // Try group 1 (URL format) then group 2 (bare ID)
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_video_id() {
        let resolver = VideoIdResolver::new();

        assert_eq!(
            resolver.resolve("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            resolver.resolve("https://youtu.be/dQw4w9WgXcQ?t=30"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            resolver.resolve("https://youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            resolver.resolve("https://www.youtube.com/shorts/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            resolver.resolve("https://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            resolver.resolve("https://www.youtube.com/live/dQw4w9WgXcQ?si=abc"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(resolver.resolve("dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_rejects_unresolvable() {
        let resolver = VideoIdResolver::new();

        assert_eq!(resolver.resolve("not-a-video-id"), None);
        assert_eq!(resolver.resolve(""), None);
        assert_eq!(resolver.resolve("https://youtu.be/abc123"), None);
        assert_eq!(resolver.resolve("https://www.youtube.com/@channel"), None);
        assert_eq!(resolver.resolve("https://www.youtube.com/watch?v=dQw4w9WgXcQextra"), None);
    }
}
