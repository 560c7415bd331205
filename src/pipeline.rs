//! Request pipeline for Kort.
//!
//! Validates input, extracts content, and summarizes it. Each call is
//! self-contained: nothing is cached or shared between requests.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::config::{Prompts, Settings};
use crate::error::{KortError, Result};
use crate::extraction::{ContentExtractor, ExtractedDocument, ExtractionAttempt, ExtractionReport};
use crate::source::is_valid_url;
use crate::summarize::{ChatCompletionProvider, Summarizer};

pub const MISSING_INPUT_MESSAGE: &str = "Please provide the API key and URL to proceed.";
pub const INVALID_URL_MESSAGE: &str = "Invalid URL. Please enter a valid YouTube or website URL.";

/// Outcome of a full summarize request.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryOutcome {
    pub summary: String,
    pub documents: Vec<ExtractedDocument>,
    pub attempts: Vec<ExtractionAttempt>,
}

impl SummaryOutcome {
    /// Title of the first document that has one.
    pub fn title(&self) -> Option<&str> {
        self.documents.iter().find_map(|d| d.title())
    }
}

/// The extract-then-summarize pipeline.
pub struct Pipeline {
    extractor: ContentExtractor,
    summarizer: Summarizer,
}

impl Pipeline {
    /// Create a pipeline with the default collaborators.
    pub fn new(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let extractor = ContentExtractor::new(&settings.extraction)?;

        let provider = ChatCompletionProvider::new(&settings.summarizer);
        info!("Using summary model {}", provider.model());
        let summarizer = Summarizer::new(Arc::new(provider)).with_prompts(prompts);

        Ok(Self::with_components(extractor, summarizer))
    }

    /// Create a pipeline with custom components.
    pub fn with_components(extractor: ContentExtractor, summarizer: Summarizer) -> Self {
        Self {
            extractor,
            summarizer,
        }
    }

    /// Check the raw request before any network work.
    pub fn validate(url: &str, api_key: &str) -> Result<()> {
        if api_key.trim().is_empty() || url.trim().is_empty() {
            return Err(KortError::InvalidInput(MISSING_INPUT_MESSAGE.to_string()));
        }
        Self::validate_url(url)
    }

    fn validate_url(url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(KortError::InvalidInput(MISSING_INPUT_MESSAGE.to_string()));
        }
        if !is_valid_url(url) {
            return Err(KortError::InvalidInput(INVALID_URL_MESSAGE.to_string()));
        }
        Ok(())
    }

    /// Extract content only.
    #[instrument(skip(self))]
    pub async fn extract(&self, url: &str) -> Result<ExtractionReport> {
        Self::validate_url(url)?;
        Ok(self.extractor.extract_with_report(url.trim()).await?)
    }

    /// Validate, extract, and summarize `url`.
    #[instrument(skip(self, api_key))]
    pub async fn summarize(&self, url: &str, api_key: &str) -> Result<SummaryOutcome> {
        Self::validate(url, api_key)?;

        let report = self.extractor.extract_with_report(url.trim()).await?;
        info!("Extracted {} document(s)", report.documents.len());

        let summary = self
            .summarizer
            .summarize(&report.documents, api_key.trim())
            .await?;

        Ok(SummaryOutcome {
            summary,
            documents: report.documents,
            attempts: report.attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractionSettings;
    use crate::extraction::{
        AttemptOutcome, ExtractionError, TranscriptEntry, TranscriptService, VideoLoader,
        WebExtractor,
    };
    use crate::summarize::{SummarizationError, SummaryProvider};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeLoader {
        calls: AtomicUsize,
        text: Option<&'static str>,
    }

    #[async_trait]
    impl VideoLoader for FakeLoader {
        async fn load(&self, _url: &str) -> Result<Vec<ExtractedDocument>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.text {
                Some(text) => Ok(vec![ExtractedDocument::new(text, "primary-loader")]),
                None => Err(KortError::ToolFailed("yt-dlp exited with status 1".into())),
            }
        }
    }

    struct FakeTranscripts {
        requested: Mutex<Vec<String>>,
        entries: Vec<&'static str>,
    }

    #[async_trait]
    impl TranscriptService for FakeTranscripts {
        async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptEntry>> {
            self.requested.lock().unwrap().push(video_id.to_string());
            if self.entries.is_empty() {
                return Err(KortError::TranscriptsDisabled(video_id.to_string()));
            }
            Ok(self
                .entries
                .iter()
                .enumerate()
                .map(|(i, text)| TranscriptEntry::new(*text, i as f64, 1.0))
                .collect())
        }
    }

    struct FakeWeb {
        calls: AtomicUsize,
        docs: Vec<ExtractedDocument>,
    }

    #[async_trait]
    impl WebExtractor for FakeWeb {
        async fn extract(&self, _url: &str) -> Result<Vec<ExtractedDocument>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.docs.clone())
        }
    }

    #[derive(Default)]
    struct FakeProvider {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SummaryProvider for FakeProvider {
        async fn complete(
            &self,
            prompt: &str,
            _api_key: &str,
        ) -> std::result::Result<String, SummarizationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("provider summary".to_string())
        }
    }

    struct Harness {
        loader: Arc<FakeLoader>,
        transcripts: Arc<FakeTranscripts>,
        web: Arc<FakeWeb>,
        provider: Arc<FakeProvider>,
        pipeline: Pipeline,
    }

    fn harness(
        loader_text: Option<&'static str>,
        transcript: Vec<&'static str>,
        web_docs: Vec<ExtractedDocument>,
    ) -> Harness {
        let loader = Arc::new(FakeLoader {
            calls: AtomicUsize::new(0),
            text: loader_text,
        });
        let transcripts = Arc::new(FakeTranscripts {
            requested: Mutex::new(Vec::new()),
            entries: transcript,
        });
        let web = Arc::new(FakeWeb {
            calls: AtomicUsize::new(0),
            docs: web_docs,
        });
        let provider = Arc::new(FakeProvider::default());

        let extractor = ContentExtractor::from_collaborators(
            &ExtractionSettings::default(),
            loader.clone(),
            transcripts.clone(),
            web.clone(),
        );
        let pipeline = Pipeline::with_components(extractor, Summarizer::new(provider.clone()));

        Harness {
            loader,
            transcripts,
            web,
            provider,
            pipeline,
        }
    }

    #[test]
    fn test_validate_missing_input() {
        for (url, key) in [("", "key"), ("https://example.com", ""), ("  ", "  ")] {
            let err = Pipeline::validate(url, key).unwrap_err();
            assert!(matches!(err, KortError::InvalidInput(msg) if msg == MISSING_INPUT_MESSAGE));
        }
    }

    #[test]
    fn test_validate_bad_url() {
        let err = Pipeline::validate("not a url", "key").unwrap_err();
        assert!(matches!(err, KortError::InvalidInput(msg) if msg == INVALID_URL_MESSAGE));
    }

    #[test]
    fn test_validate_ok() {
        assert!(Pipeline::validate("https://youtu.be/abc123", "gsk-key").is_ok());
    }

    #[tokio::test]
    async fn test_primary_loader_success_skips_fallbacks() {
        let h = harness(Some("hello world"), vec!["unused"], vec![]);

        let outcome = h
            .pipeline
            .summarize("https://youtu.be/abc123", "gsk-key")
            .await
            .unwrap();

        assert_eq!(outcome.summary, "provider summary");
        assert_eq!(outcome.documents.len(), 1);
        assert_eq!(outcome.documents[0].text, "hello world");
        assert_eq!(outcome.attempts.len(), 1);
        assert!(h.transcripts.requested.lock().unwrap().is_empty());
        assert_eq!(h.web.calls.load(Ordering::SeqCst), 0);

        let prompts = h.provider.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(
            prompts[0],
            "Provide a concise summary of the following content in 300 words:\nContent: hello world\n"
        );
    }

    #[tokio::test]
    async fn test_transcript_fallback_marks_source() {
        let h = harness(None, vec!["hi", "there"], vec![]);

        let report = h.pipeline.extract("https://youtu.be/abc123").await.unwrap();

        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.documents[0].text, "hi there");
        assert_eq!(report.documents[0].source(), Some("transcript-fallback"));
        assert_eq!(h.loader.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*h.transcripts.requested.lock().unwrap(), vec!["abc123"]);
        assert_eq!(report.attempts.len(), 2);
        assert!(matches!(report.attempts[0].outcome, AttemptOutcome::Failure(_)));
        assert_eq!(report.attempts[1].outcome, AttemptOutcome::Success);
    }

    #[tokio::test]
    async fn test_transcript_success_skips_resolved_strategy() {
        let h = harness(None, vec!["hi", "there"], vec![]);

        let report = h
            .pipeline
            .extract("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
            .await
            .unwrap();

        assert_eq!(report.documents[0].source(), Some("transcript-fallback"));
        assert_eq!(report.attempts.len(), 2);
        assert_eq!(report.attempts[1].strategy, "transcript-fallback");
        assert_eq!(*h.transcripts.requested.lock().unwrap(), vec!["dQw4w9WgXcQ"]);
    }

    #[tokio::test]
    async fn test_generic_url_with_no_documents() {
        let h = harness(Some("never used"), vec!["never"], vec![]);

        let err = h
            .pipeline
            .summarize("https://example.com/page", "gsk-key")
            .await
            .unwrap_err();

        assert!(matches!(
            &err,
            KortError::Extraction(ExtractionError::NoContentExtracted { attempts }) if attempts.len() == 1
        ));
        assert!(err.to_string().contains("No content could be extracted"));
        assert_eq!(h.web.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.loader.calls.load(Ordering::SeqCst), 0);
        assert!(h.provider.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_all_video_strategies_fail_is_repeatable() {
        let h = harness(None, vec![], vec![]);

        for _ in 0..2 {
            let err = h
                .pipeline
                .summarize("https://www.youtube.com/watch?v=dQw4w9WgXcQ", "gsk-key")
                .await
                .unwrap_err();
            match err {
                KortError::Extraction(e) => assert_eq!(e.attempts().len(), 3),
                other => panic!("unexpected error: {:?}", other),
            }
        }
        assert!(h.provider.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_key_fails_before_extraction() {
        let h = harness(Some("hello"), vec![], vec![ExtractedDocument::new("page", "web")]);

        for url in ["https://youtu.be/abc123", "https://example.com"] {
            let err = h.pipeline.summarize(url, "").await.unwrap_err();
            assert!(matches!(err, KortError::InvalidInput(_)));
        }
        assert_eq!(h.loader.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.web.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generic_url_summarizes_page_text() {
        let page = ExtractedDocument::new("page body", "web").with_metadata("title", "A Page");
        let h = harness(None, vec![], vec![page]);

        let outcome = h
            .pipeline
            .summarize("https://example.com/page", "gsk-key")
            .await
            .unwrap();

        assert_eq!(outcome.title(), Some("A Page"));
        assert_eq!(h.loader.calls.load(Ordering::SeqCst), 0);
        assert!(h.transcripts.requested.lock().unwrap().is_empty());
    }
}
