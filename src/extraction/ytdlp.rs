//! Primary video loader: yt-dlp metadata plus caption download.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument};

use super::captions::{join_entries, parse_json3};
use super::ExtractedDocument;
use crate::config::ExtractionSettings;
use crate::error::{KortError, Result};

/// Loads caption text and video metadata for a video URL.
#[async_trait]
pub trait VideoLoader: Send + Sync {
    /// Load document(s) for `url`, or fail (no captions, private, region-blocked...).
    async fn load(&self, url: &str) -> Result<Vec<ExtractedDocument>>;
}

/// Subset of the `yt-dlp --dump-json` output we care about.
#[derive(Debug, Deserialize)]
struct VideoInfo {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    uploader: Option<String>,
    #[serde(default)]
    upload_date: Option<String>,
    #[serde(default)]
    subtitles: BTreeMap<String, Vec<CaptionFormat>>,
    #[serde(default)]
    automatic_captions: BTreeMap<String, Vec<CaptionFormat>>,
}

#[derive(Debug, Clone, Deserialize)]
struct CaptionFormat {
    ext: String,
    url: String,
}

/// A chosen caption download.
#[derive(Debug, PartialEq)]
struct CaptionChoice {
    language: String,
    url: String,
}

/// Loader that shells out to yt-dlp for metadata and caption URLs.
pub struct YtDlpLoader {
    binary: String,
    client: reqwest::Client,
    languages: Vec<String>,
}

impl YtDlpLoader {
    pub fn new(settings: &ExtractionSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.strategy_timeout())
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| KortError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            binary: settings.ytdlp_path.clone(),
            client,
            languages: settings.caption_languages.clone(),
        })
    }

    /// Fetch metadata using yt-dlp.
    async fn fetch_info(&self, url: &str) -> Result<VideoInfo> {
        let output = tokio::process::Command::new(&self.binary)
            .args([
                "--dump-json",
                "--skip-download",
                "--no-playlist",
                "--no-warnings",
                url,
            ])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    KortError::ToolNotFound(self.binary.clone())
                } else {
                    KortError::ToolFailed(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(KortError::VideoNotFound(format!(
                "{} not found or unavailable: {}",
                url,
                stderr.trim()
            )));
        }

        let info: VideoInfo = serde_json::from_slice(&output.stdout).map_err(|e| {
            KortError::VideoSource(format!("Failed to parse yt-dlp output: {}", e))
        })?;
        Ok(info)
    }

    async fn download_captions(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(KortError::VideoSource(format!(
                "HTTP {} downloading captions",
                response.status()
            )));
        }
        Ok(response.text().await?)
    }
}

/// Pick a `json3` caption track.
///
/// Manual subtitles beat automatic captions; within each, preferred languages
/// (exact or regional variant) come first. With no preferred match, the first
/// manual subtitle language is used, then the original-language automatic track.
fn choose_captions(info: &VideoInfo, languages: &[String]) -> Option<CaptionChoice> {
    for pool in [&info.subtitles, &info.automatic_captions] {
        for lang in languages {
            let regional = format!("{}-", lang);
            let hit = pool
                .iter()
                .filter(|(code, _)| *code == lang || code.starts_with(&regional))
                .find_map(|(code, formats)| json3_track(code, formats));
            if hit.is_some() {
                return hit;
            }
        }
    }

    info.subtitles
        .iter()
        .filter(|(code, _)| code.as_str() != "live_chat")
        .find_map(|(code, formats)| json3_track(code, formats))
        .or_else(|| {
            info.automatic_captions
                .iter()
                .filter(|(code, _)| code.ends_with("-orig"))
                .find_map(|(code, formats)| json3_track(code, formats))
        })
}

fn json3_track(language: &str, formats: &[CaptionFormat]) -> Option<CaptionChoice> {
    formats
        .iter()
        .find(|f| f.ext == "json3")
        .map(|f| CaptionChoice {
            language: language.to_string(),
            url: f.url.clone(),
        })
}

/// yt-dlp upload dates are `YYYYMMDD`.
fn format_upload_date(raw: &str) -> Option<String> {
    chrono::NaiveDate::parse_from_str(raw, "%Y%m%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

#[async_trait]
impl VideoLoader for YtDlpLoader {
    #[instrument(skip(self))]
    async fn load(&self, url: &str) -> Result<Vec<ExtractedDocument>> {
        let info = self.fetch_info(url).await?;

        let choice = choose_captions(&info, &self.languages).ok_or_else(|| {
            KortError::TranscriptsDisabled(format!("no captions available for {}", info.id))
        })?;
        debug!(language = %choice.language, "Downloading captions");

        let entries = parse_json3(&self.download_captions(&choice.url).await?)?;
        let text = join_entries(&entries);

        let mut doc = ExtractedDocument::new(text, "primary-loader")
            .with_metadata("video_id", &info.id)
            .with_metadata("language", &choice.language);
        if let Some(title) = &info.title {
            doc = doc.with_metadata("title", title);
        }
        if let Some(author) = info.channel.as_ref().or(info.uploader.as_ref()) {
            doc = doc.with_metadata("author", author);
        }
        if let Some(published) = info.upload_date.as_deref().and_then(format_upload_date) {
            doc = doc.with_metadata("published", published);
        }

        Ok(vec![doc])
    }
}
