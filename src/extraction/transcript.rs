//! Transcript service: caption entries for a video ID.
//!
//! The default implementation reads the caption track list embedded in the
//! watch page and downloads the chosen track as `json3` timed text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use super::captions::parse_json3;
use crate::config::ExtractionSettings;
use crate::error::{KortError, Result};

/// One caption entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub text: String,
    /// Start offset in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
}

impl TranscriptEntry {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// Source of transcript entries for a video ID.
#[async_trait]
pub trait TranscriptService: Send + Sync {
    /// Fetch the ordered caption entries for `video_id`.
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptEntry>>;
}

/// A caption track as listed in the watch page player response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    #[serde(default)]
    language_code: String,
    /// `"asr"` for auto-generated tracks.
    #[serde(default)]
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

const CAPTION_TRACKS_KEY: &str = "\"captionTracks\":";

/// Transcript service backed by YouTube's public timed-text endpoints.
pub struct YoutubeTranscriptApi {
    client: reqwest::Client,
    base_url: String,
    languages: Vec<String>,
}

impl YoutubeTranscriptApi {
    /// Create a transcript service from extraction settings.
    pub fn new(settings: &ExtractionSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.strategy_timeout())
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(|e| KortError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.youtube_base_url.trim_end_matches('/').to_string(),
            languages: settings.caption_languages.clone(),
        })
    }

    async fn fetch_watch_page(&self, video_id: &str) -> Result<String> {
        let url = format!("{}/watch?v={}", self.base_url, video_id);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(KortError::VideoNotFound(video_id.to_string()));
        }
        if !status.is_success() {
            return Err(KortError::VideoSource(format!(
                "HTTP {} fetching watch page for {}",
                status, video_id
            )));
        }

        Ok(response.text().await?)
    }

    fn caption_tracks(video_id: &str, html: &str) -> Result<Vec<CaptionTrack>> {
        let Some(pos) = html.find(CAPTION_TRACKS_KEY) else {
            if html.contains("\"playabilityStatus\":{\"status\":\"ERROR\"") {
                return Err(KortError::VideoNotFound(video_id.to_string()));
            }
            return Err(KortError::TranscriptsDisabled(video_id.to_string()));
        };

        let rest = &html[pos + CAPTION_TRACKS_KEY.len()..];
        let tracks = serde_json::Deserializer::from_str(rest)
            .into_iter::<Vec<CaptionTrack>>()
            .next()
            .ok_or_else(|| KortError::TranscriptsDisabled(video_id.to_string()))??;

        if tracks.is_empty() {
            return Err(KortError::TranscriptsDisabled(video_id.to_string()));
        }
        Ok(tracks)
    }

    /// Pick a track: preferred languages first, manual before generated.
    fn choose_track<'a>(&self, tracks: &'a [CaptionTrack]) -> Option<&'a CaptionTrack> {
        for generated in [false, true] {
            for lang in &self.languages {
                let hit = tracks.iter().find(|t| {
                    t.is_generated() == generated
                        && (t.language_code == *lang
                            || t.language_code.starts_with(&format!("{}-", lang)))
                });
                if hit.is_some() {
                    return hit;
                }
            }
        }

        tracks
            .iter()
            .find(|t| !t.is_generated())
            .or_else(|| tracks.first())
    }
}

/// Rewrite a track URL so it returns `json3`.
fn json3_url(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| KortError::VideoSource(format!("Bad caption track URL: {}", e)))?;

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "fmt")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair("fmt", "json3");

    Ok(url)
}

fn is_plausible_id(video_id: &str) -> bool {
    !video_id.is_empty()
        && video_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[async_trait]
impl TranscriptService for YoutubeTranscriptApi {
    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptEntry>> {
        if !is_plausible_id(video_id) {
            return Err(KortError::InvalidInput(format!("Invalid video ID: {}", video_id)));
        }

        let html = self.fetch_watch_page(video_id).await?;
        let tracks = Self::caption_tracks(video_id, &html)?;
        let track = self
            .choose_track(&tracks)
            .ok_or_else(|| KortError::TranscriptsDisabled(video_id.to_string()))?;

        debug!(
            language = %track.language_code,
            generated = track.is_generated(),
            "Downloading caption track"
        );

        let response = self.client.get(json3_url(&track.base_url)?).send().await?;
        if !response.status().is_success() {
            return Err(KortError::VideoSource(format!(
                "HTTP {} downloading captions for {}",
                response.status(),
                video_id
            )));
        }

        let entries = parse_json3(&response.text().await?)?;
        if entries.is_empty() {
            return Err(KortError::TranscriptsDisabled(video_id.to_string()));
        }

        debug!("Fetched {} transcript entries", entries.len());
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service_for(server: &MockServer) -> YoutubeTranscriptApi {
        let settings = ExtractionSettings {
            youtube_base_url: server.uri(),
            ..ExtractionSettings::default()
        };
        YoutubeTranscriptApi::new(&settings).unwrap()
    }

    fn watch_page(server: &MockServer) -> String {
        format!(
            r#"<html><script>var ytInitialPlayerResponse = {{"captions":{{"playerCaptionsTracklistRenderer":{{"captionTracks":[{{"baseUrl":"{uri}/api/timedtext?v=abc123&lang=de","languageCode":"de"}},{{"baseUrl":"{uri}/api/timedtext?v=abc123&lang=en&kind=asr","languageCode":"en","kind":"asr"}}],"audioTracks":[]}}}}}};</script></html>"#,
            uri = server.uri()
        )
    }

    #[tokio::test]
    async fn test_fetch_prefers_configured_language() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/watch"))
            .and(query_param("v", "abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_string(watch_page(&server)))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/timedtext"))
            .and(query_param("lang", "en"))
            .and(query_param("fmt", "json3"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"events":[{"tStartMs":0,"dDurationMs":1000,"segs":[{"utf8":"hi"}]},{"tStartMs":1000,"dDurationMs":1000,"segs":[{"utf8":"there"}]}]}"#,
            ))
            .mount(&server)
            .await;

        let entries = service_for(&server).fetch("abc123").await.unwrap();
        assert_eq!(
            entries,
            vec![
                TranscriptEntry::new("hi", 0.0, 1.0),
                TranscriptEntry::new("there", 1.0, 1.0),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_without_tracks_is_disabled() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/watch"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html>{"playabilityStatus":{"status":"OK"}}</html>"#,
            ))
            .mount(&server)
            .await;

        let err = service_for(&server).fetch("abc123").await.unwrap_err();
        assert!(matches!(err, KortError::TranscriptsDisabled(_)));
    }

    #[tokio::test]
    async fn test_fetch_unplayable_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/watch"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html>{"playabilityStatus":{"status":"ERROR","reason":"Video unavailable"}}</html>"#,
            ))
            .mount(&server)
            .await;

        let err = service_for(&server).fetch("abc123").await.unwrap_err();
        assert!(matches!(err, KortError::VideoNotFound(_)));
    }

    #[tokio::test]
    async fn test_fetch_rejects_bad_id_without_network() {
        let server = MockServer::start().await;

        let err = service_for(&server).fetch("abc/../x").await.unwrap_err();
        assert!(matches!(err, KortError::InvalidInput(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn test_json3_url_replaces_format() {
        let url = json3_url("https://www.youtube.com/api/timedtext?v=x&fmt=srv3&lang=en").unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("v".to_string(), "x".to_string()),
                ("lang".to_string(), "en".to_string()),
                ("fmt".to_string(), "json3".to_string()),
            ]
        );
    }
}
