//! Generic web page extraction.
//!
//! Fetches a page with a browser-like User-Agent (certificate checks relaxed
//! by default) and reduces the HTML to readable plain text.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Node, Selector};
use std::time::Duration;
use tracing::{debug, instrument};

use super::ExtractedDocument;
use crate::config::ExtractionSettings;
use crate::error::{KortError, Result};

/// Extracts plain-text documents from an arbitrary web page.
#[async_trait]
pub trait WebExtractor: Send + Sync {
    /// Fetch `url` and return its text. An empty list means nothing usable was found.
    async fn extract(&self, url: &str) -> Result<Vec<ExtractedDocument>>;
}

/// Candidate containers for the main content, most specific first.
const MAIN_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role='main']",
    "#content",
    "#main",
    ".post-content",
    ".entry-content",
    "body",
];

/// Elements whose text never reaches the document.
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "svg", "nav", "header", "footer", "aside",
    "form", "iframe", "button",
];

/// Elements that break text onto a new line.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4",
    "h5", "h6", "blockquote", "pre", "table", "tr", "td", "th", "dd", "dt", "figcaption",
];

/// reqwest + scraper web extractor.
pub struct WebPageExtractor {
    client: reqwest::Client,
}

impl WebPageExtractor {
    pub fn new(settings: &ExtractionSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.strategy_timeout())
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.as_str())
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| KortError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn fetch(&self, url: &str) -> Result<(String, String)> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(KortError::WebExtraction(format!("HTTP {} for {}", status, url)));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_lowercase();

        Ok((content_type, response.text().await?))
    }
}

#[async_trait]
impl WebExtractor for WebPageExtractor {
    #[instrument(skip(self))]
    async fn extract(&self, url: &str) -> Result<Vec<ExtractedDocument>> {
        let (content_type, body) = self.fetch(url).await?;

        let page = if content_type.starts_with("text/plain") {
            PageText {
                title: None,
                text: normalize_lines(&body),
            }
        } else if content_type.contains("html") || content_type.contains("xml") {
            page_text(&body)
        } else {
            return Err(KortError::WebExtraction(format!(
                "unsupported content type {}",
                content_type
            )));
        };

        if page.text.is_empty() {
            debug!("Page contained no readable text");
            return Ok(Vec::new());
        }

        let mut doc = ExtractedDocument::new(page.text, "web").with_metadata("url", url);
        if let Some(title) = page.title {
            doc = doc.with_metadata("title", title);
        }
        Ok(vec![doc])
    }
}

/// Title and readable text of an HTML page.
#[derive(Debug, PartialEq)]
pub struct PageText {
    pub title: Option<String>,
    pub text: String,
}

/// Reduce an HTML document to its title and visible main-content text.
pub fn page_text(html: &str) -> PageText {
    let document = Html::parse_document(html);

    let title = Selector::parse("title").ok().and_then(|sel| {
        document
            .select(&sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    });

    let mut text = String::new();
    for selector in MAIN_SELECTORS {
        let Ok(sel) = Selector::parse(selector) else {
            continue;
        };
        if let Some(root) = document.select(&sel).next() {
            let mut raw = String::new();
            collect_text(root, &mut raw);
            text = normalize_lines(&raw);
            if !text.is_empty() {
                break;
            }
        }
    }

    PageText { title, text }
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_TAGS.contains(&name) {
                    continue;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Collapse whitespace within lines and drop blank lines.
fn normalize_lines(raw: &str) -> String {
    raw.lines()
        .map(super::captions::collapse_whitespace)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
