//! Visible-text extraction for posting descriptions.
//!
//! Scoring needs plain text, not structure: the extractor drops non-content
//! elements (scripts, styles, navigation, chrome, cookie banners), collects
//! the remaining body text, collapses whitespace, and caps the result so the
//! scoring endpoint's input stays bounded.
//!
//! Extraction never fails upward. A page that cannot be fetched or parsed
//! yields an empty string, which the orchestrator treats as "no usable
//! description".

use async_trait::async_trait;
use scraper::{Html, Node, Selector};
use url::Url;

use crate::fetch::FetchClient;

/// Elements whose text is never part of the posting description.
const NOISE_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "header", "footer", "aside", "iframe", "svg",
];

/// Configuration for description extraction.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Maximum extracted length in characters (default: 5000)
    pub max_len: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { max_len: 5_000 }
    }
}

/// Stable extractor trait so the orchestrator can be tested without network.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract the cleaned visible text of a posting page.
    ///
    /// Returns an empty string on any failure.
    async fn extract(&self, url: &Url) -> String;
}

/// Fetch-and-clean description extractor.
pub struct DescriptionExtractor {
    fetch: FetchClient,
    config: ExtractConfig,
}

impl DescriptionExtractor {
    /// Create an extractor over the given fetch client.
    pub fn new(fetch: FetchClient, config: ExtractConfig) -> Self {
        Self { fetch, config }
    }

    async fn try_extract(&self, url: &Url) -> Result<String, jobscout_core::Error> {
        let response = self.fetch.fetch(url).await?;
        Ok(visible_text(&response.text(), self.config.max_len))
    }
}

#[async_trait]
impl Extractor for DescriptionExtractor {
    async fn extract(&self, url: &Url) -> String {
        match self.try_extract(url).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("description extraction failed for {url}: {e}");
                String::new()
            }
        }
    }
}

/// Collect the visible text of a document body.
///
/// Text nodes under any noise tag or cookie-banner-looking container are
/// skipped; the rest is whitespace-collapsed and truncated to `max_len`
/// characters on a char boundary.
pub fn visible_text(html: &str, max_len: usize) -> String {
    let doc = Html::parse_document(html);
    let body_selector = Selector::parse("body").expect("invalid selector");

    let Some(body) = doc.select(&body_selector).next() else {
        return String::new();
    };

    let mut pieces: Vec<&str> = Vec::new();
    for node in body.descendants() {
        let Node::Text(text) = node.value() else { continue };

        let noisy = node.ancestors().any(|ancestor| {
            let Node::Element(el) = ancestor.value() else { return false };
            NOISE_TAGS.contains(&el.name()) || looks_like_cookie_banner(el)
        });
        if noisy {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            pieces.push(trimmed);
        }
    }

    let joined = pieces.join(" ");
    let collapsed: String = joined.split_whitespace().collect::<Vec<_>>().join(" ");

    match collapsed.char_indices().nth(max_len) {
        Some((idx, _)) => collapsed[..idx].to_string(),
        None => collapsed,
    }
}

fn looks_like_cookie_banner(el: &scraper::node::Element) -> bool {
    el.attr("id")
        .into_iter()
        .chain(el.attr("class"))
        .any(|value| value.to_ascii_lowercase().contains("cookie"))
}
