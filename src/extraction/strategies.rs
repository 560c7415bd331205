//! The concrete extraction strategies.
//!
//! Video URLs run, in order: [`PrimaryLoaderStrategy`], [`TranscriptApiStrategy`],
//! [`ResolvedIdStrategy`]. Everything else goes through [`WebPageStrategy`].

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::captions::join_entries;
use super::transcript::TranscriptService;
use super::web::WebExtractor;
use super::ytdlp::VideoLoader;
use super::{ExtractedDocument, ExtractionStrategy};
use crate::error::{KortError, Result};
use crate::source::{parse_video_id, SourceUrl, VideoIdResolver};

/// Delegates to the primary video loader.
pub struct PrimaryLoaderStrategy {
    loader: Arc<dyn VideoLoader>,
}

impl PrimaryLoaderStrategy {
    pub const NAME: &'static str = "primary-loader";

    pub fn new(loader: Arc<dyn VideoLoader>) -> Self {
        Self { loader }
    }
}

#[async_trait]
impl ExtractionStrategy for PrimaryLoaderStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn extract(&self, url: &SourceUrl) -> Result<Vec<ExtractedDocument>> {
        let docs = self.loader.load(url.as_str()).await?;
        Ok(docs
            .into_iter()
            .map(|doc| doc.with_default_source(Self::NAME))
            .collect())
    }
}

/// Fetch and flatten a transcript into a single document tagged with `source`.
async fn transcript_document(
    service: &dyn TranscriptService,
    video_id: &str,
    source: &str,
) -> Result<Vec<ExtractedDocument>> {
    let entries = service.fetch(video_id).await?;
    debug!("Transcript for {} has {} entries", video_id, entries.len());

    let doc = ExtractedDocument::new(join_entries(&entries), source)
        .with_metadata("video_id", video_id);
    Ok(vec![doc])
}

/// Strict ID parsing followed by a transcript fetch.
pub struct TranscriptApiStrategy {
    service: Arc<dyn TranscriptService>,
}

impl TranscriptApiStrategy {
    pub const NAME: &'static str = "transcript-fallback";

    pub fn new(service: Arc<dyn TranscriptService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ExtractionStrategy for TranscriptApiStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn extract(&self, url: &SourceUrl) -> Result<Vec<ExtractedDocument>> {
        let video_id = parse_video_id(url.as_str()).ok_or_else(|| {
            KortError::InvalidInput(format!("could not parse a video ID from {}", url))
        })?;
        transcript_document(self.service.as_ref(), &video_id, Self::NAME).await
    }
}

/// Tolerant ID resolution followed by a transcript fetch.
pub struct ResolvedIdStrategy {
    service: Arc<dyn TranscriptService>,
    resolver: VideoIdResolver,
}

impl ResolvedIdStrategy {
    pub const NAME: &'static str = "transcript-resolved";

    pub fn new(service: Arc<dyn TranscriptService>) -> Self {
        Self {
            service,
            resolver: VideoIdResolver::new(),
        }
    }
}

#[async_trait]
impl ExtractionStrategy for ResolvedIdStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn extract(&self, url: &SourceUrl) -> Result<Vec<ExtractedDocument>> {
        let video_id = self.resolver.resolve(url.as_str()).ok_or_else(|| {
            KortError::InvalidInput(format!("could not resolve a video ID from {}", url))
        })?;
        transcript_document(self.service.as_ref(), &video_id, Self::NAME).await
    }
}

/// Generic web page extraction.
pub struct WebPageStrategy {
    extractor: Arc<dyn WebExtractor>,
}

impl WebPageStrategy {
    pub const NAME: &'static str = "web";

    pub fn new(extractor: Arc<dyn WebExtractor>) -> Self {
        Self { extractor }
    }
}

#[async_trait]
impl ExtractionStrategy for WebPageStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn extract(&self, url: &SourceUrl) -> Result<Vec<ExtractedDocument>> {
        let docs = self.extractor.extract(url.as_str()).await?;
        Ok(docs
            .into_iter()
            .map(|doc| doc.with_default_source(Self::NAME))
            .collect())
    }
}
