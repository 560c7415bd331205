//! Content extraction: URL in, plain-text documents out.
//!
//! Video URLs walk an ordered list of strategies and stop at the first one that
//! produces non-empty text. Every strategy failure (error, timeout, panic, empty
//! result) is recorded as an [`ExtractionAttempt`] and the next strategy runs.
//! Only exhausting the list surfaces [`ExtractionError::NoContentExtracted`].

mod captions;
mod strategies;
mod transcript;
mod web;
mod ytdlp;

pub use strategies::{PrimaryLoaderStrategy, ResolvedIdStrategy, TranscriptApiStrategy, WebPageStrategy};
pub use transcript::{TranscriptEntry, TranscriptService, YoutubeTranscriptApi};
pub use web::{page_text, PageText, WebExtractor, WebPageExtractor};
pub use ytdlp::{VideoLoader, YtDlpLoader};

use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::ExtractionSettings;
use crate::source::SourceUrl;

/// A unit of plain text ready for prompting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub text: String,
    /// Provenance: always `source`, plus `title`, `author`, `video_id`... when known.
    pub metadata: BTreeMap<String, String>,
}

impl ExtractedDocument {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert("source".to_string(), source.into());
        Self {
            text: text.into(),
            metadata,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Set `source` unless the producer already did.
    pub fn with_default_source(mut self, source: &str) -> Self {
        self.metadata
            .entry("source".to_string())
            .or_insert_with(|| source.to_string());
        self
    }

    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").map(String::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").map(String::as_str)
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Result of a single strategy attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum AttemptOutcome {
    Success,
    Failure(String),
}

/// One entry in the diagnostic trace of an extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionAttempt {
    pub strategy: String,
    pub outcome: AttemptOutcome,
}

impl std::fmt::Display for ExtractionAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.outcome {
            AttemptOutcome::Success => write!(f, "{}: ok", self.strategy),
            AttemptOutcome::Failure(reason) => write!(f, "{}: {}", self.strategy, reason),
        }
    }
}

/// Documents plus the attempts it took to get them.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub documents: Vec<ExtractedDocument>,
    pub attempts: Vec<ExtractionAttempt>,
}

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("No content could be extracted from the provided URL.")]
    NoContentExtracted { attempts: Vec<ExtractionAttempt> },
}

impl ExtractionError {
    pub fn attempts(&self) -> &[ExtractionAttempt] {
        match self {
            ExtractionError::NoContentExtracted { attempts } => attempts,
        }
    }
}

/// One way of turning a URL into documents.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    /// Stable name, used in metadata and diagnostics.
    fn name(&self) -> &'static str;

    async fn extract(&self, url: &SourceUrl) -> crate::Result<Vec<ExtractedDocument>>;
}

/// Classifies URLs and runs the matching strategy chain.
pub struct ContentExtractor {
    video_hosts: Vec<String>,
    video_strategies: Vec<Box<dyn ExtractionStrategy>>,
    generic_strategy: Box<dyn ExtractionStrategy>,
    strategy_timeout: Duration,
}

impl ContentExtractor {
    /// Build the default chain: yt-dlp loader, transcript API, tolerant ID
    /// resolution, and the web page extractor.
    pub fn new(settings: &ExtractionSettings) -> crate::Result<Self> {
        Ok(Self::from_collaborators(
            settings,
            Arc::new(YtDlpLoader::new(settings)?),
            Arc::new(YoutubeTranscriptApi::new(settings)?),
            Arc::new(WebPageExtractor::new(settings)?),
        ))
    }

    /// Build the standard chain on top of custom collaborators.
    pub fn from_collaborators(
        settings: &ExtractionSettings,
        loader: Arc<dyn VideoLoader>,
        transcripts: Arc<dyn TranscriptService>,
        web: Arc<dyn WebExtractor>,
    ) -> Self {
        Self::with_strategies(
            settings.video_hosts.clone(),
            vec![
                Box::new(PrimaryLoaderStrategy::new(loader)),
                Box::new(TranscriptApiStrategy::new(transcripts.clone())),
                Box::new(ResolvedIdStrategy::new(transcripts)),
            ],
            Box::new(WebPageStrategy::new(web)),
            settings.strategy_timeout(),
        )
    }

    /// Build an extractor from an explicit strategy list.
    pub fn with_strategies(
        video_hosts: Vec<String>,
        video_strategies: Vec<Box<dyn ExtractionStrategy>>,
        generic_strategy: Box<dyn ExtractionStrategy>,
        strategy_timeout: Duration,
    ) -> Self {
        Self {
            video_hosts,
            video_strategies,
            generic_strategy,
            strategy_timeout,
        }
    }

    pub fn classify(&self, url: &str) -> SourceUrl {
        SourceUrl::classify(url, &self.video_hosts)
    }

    /// Extract documents from `url`.
    pub async fn extract(&self, url: &str) -> Result<Vec<ExtractedDocument>, ExtractionError> {
        self.extract_with_report(url).await.map(|report| report.documents)
    }

    /// Extract documents from `url`, keeping the attempt trace.
    #[instrument(skip(self))]
    pub async fn extract_with_report(&self, url: &str) -> Result<ExtractionReport, ExtractionError> {
        let source = self.classify(url);
        info!("Classified {} as {}", source, source.kind());

        let chain: Vec<&dyn ExtractionStrategy> = if source.is_video() {
            self.video_strategies.iter().map(|s| s.as_ref()).collect()
        } else {
            vec![self.generic_strategy.as_ref()]
        };

        let mut attempts = Vec::with_capacity(chain.len());
        for strategy in chain {
            match self.run_strategy(strategy, &source).await {
                Ok(documents) => {
                    info!("Strategy {} produced {} document(s)", strategy.name(), documents.len());
                    attempts.push(ExtractionAttempt {
                        strategy: strategy.name().to_string(),
                        outcome: AttemptOutcome::Success,
                    });
                    return Ok(ExtractionReport { documents, attempts });
                }
                Err(reason) => {
                    warn!("Strategy {} failed: {}", strategy.name(), reason);
                    attempts.push(ExtractionAttempt {
                        strategy: strategy.name().to_string(),
                        outcome: AttemptOutcome::Failure(reason),
                    });
                }
            }
        }

        Err(ExtractionError::NoContentExtracted { attempts })
    }

    /// Run one strategy, folding every kind of failure into a reason string.
    async fn run_strategy(
        &self,
        strategy: &dyn ExtractionStrategy,
        source: &SourceUrl,
    ) -> Result<Vec<ExtractedDocument>, String> {
        let attempt = AssertUnwindSafe(strategy.extract(source)).catch_unwind();

        let documents = match tokio::time::timeout(self.strategy_timeout, attempt).await {
            Err(_) => {
                return Err(format!(
                    "timed out after {}s",
                    self.strategy_timeout.as_secs_f32()
                ))
            }
            Ok(Err(panic)) => return Err(format!("panicked: {}", panic_message(&*panic))),
            Ok(Ok(Err(e))) => return Err(e.to_string()),
            Ok(Ok(Ok(documents))) => documents,
        };

        let documents: Vec<ExtractedDocument> =
            documents.into_iter().filter(|d| !d.is_blank()).collect();
        if documents.is_empty() {
            return Err("no content returned".to_string());
        }
        Ok(documents)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KortError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Behavior {
        Succeed(&'static str),
        Fail,
        Empty,
        Panic,
        Hang,
    }

    struct FakeStrategy {
        name: &'static str,
        behavior: Behavior,
        calls: Arc<AtomicUsize>,
    }

    impl FakeStrategy {
        fn boxed(name: &'static str, behavior: Behavior) -> (Box<dyn ExtractionStrategy>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let strategy = Box::new(Self {
                name,
                behavior,
                calls: calls.clone(),
            });
            (strategy, calls)
        }
    }

    #[async_trait]
    impl ExtractionStrategy for FakeStrategy {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn extract(&self, _url: &SourceUrl) -> crate::Result<Vec<ExtractedDocument>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Succeed(text) => Ok(vec![ExtractedDocument::new(text, self.name)]),
                Behavior::Fail => Err(KortError::TranscriptsDisabled("abc123".to_string())),
                Behavior::Empty => Ok(vec![ExtractedDocument::new("   ", self.name)]),
                Behavior::Panic => panic!("boom"),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Vec::new())
                }
            }
        }
    }

    fn extractor(
        video: Vec<Box<dyn ExtractionStrategy>>,
        generic: Box<dyn ExtractionStrategy>,
    ) -> ContentExtractor {
        ContentExtractor::with_strategies(
            vec!["youtube.com".to_string(), "youtu.be".to_string()],
            video,
            generic,
            Duration::from_millis(200),
        )
    }

    #[test]
    fn test_document_source_defaults() {
        let doc = ExtractedDocument::new("text", "web").with_default_source("other");
        assert_eq!(doc.source(), Some("web"));
    }

    #[tokio::test]
    async fn test_generic_url_only_runs_web_strategy() {
        let (a, a_calls) = FakeStrategy::boxed("a", Behavior::Succeed("video"));
        let (web, web_calls) = FakeStrategy::boxed("web", Behavior::Succeed("page text"));

        let docs = extractor(vec![a], web)
            .extract("https://example.com/page")
            .await
            .unwrap();

        assert_eq!(docs[0].text, "page text");
        assert_eq!(web_calls.load(Ordering::SeqCst), 1);
        assert_eq!(a_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let (a, a_calls) = FakeStrategy::boxed("a", Behavior::Succeed("captions"));
        let (b, b_calls) = FakeStrategy::boxed("b", Behavior::Succeed("transcript"));
        let (web, web_calls) = FakeStrategy::boxed("web", Behavior::Succeed("page"));

        let report = extractor(vec![a, b], web)
            .extract_with_report("https://youtu.be/abc123")
            .await
            .unwrap();

        assert_eq!(report.documents[0].text, "captions");
        assert_eq!(report.attempts.len(), 1);
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
        assert_eq!(web_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failures_fall_through_in_order() {
        let (a, _) = FakeStrategy::boxed("a", Behavior::Panic);
        let (b, _) = FakeStrategy::boxed("b", Behavior::Empty);
        let (c, _) = FakeStrategy::boxed("c", Behavior::Hang);
        let (d, _) = FakeStrategy::boxed("d", Behavior::Succeed("finally"));
        let (web, _) = FakeStrategy::boxed("web", Behavior::Fail);

        let report = extractor(vec![a, b, c, d], web)
            .extract_with_report("https://www.youtube.com/watch?v=abc123")
            .await
            .unwrap();

        let names: Vec<&str> = report.attempts.iter().map(|a| a.strategy.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
        assert_eq!(report.attempts[0].outcome, AttemptOutcome::Failure("panicked: boom".to_string()));
        assert_eq!(
            report.attempts[1].outcome,
            AttemptOutcome::Failure("no content returned".to_string())
        );
        assert!(matches!(&report.attempts[2].outcome, AttemptOutcome::Failure(r) if r.starts_with("timed out")));
        assert_eq!(report.attempts[3].outcome, AttemptOutcome::Success);
    }

    #[tokio::test]
    async fn test_exhausted_chain_is_no_content() {
        let (a, _) = FakeStrategy::boxed("a", Behavior::Fail);
        let (b, _) = FakeStrategy::boxed("b", Behavior::Fail);
        let (web, _) = FakeStrategy::boxed("web", Behavior::Succeed("page"));
        let extractor = extractor(vec![a, b], web);

        for _ in 0..2 {
            let err = extractor.extract("https://youtu.be/abc123").await.unwrap_err();
            assert_eq!(err.to_string(), "No content could be extracted from the provided URL.");
            assert_eq!(err.attempts().len(), 2);
        }
    }
}
