//! HTTP content fetcher: GET the page, strip markup to text, collect image candidates.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use super::{CollabError, ContentFetcher, FetchedPage};

static OG_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:image"], meta[name="og:image"]"#).unwrap());
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img[src]").unwrap());

/// Elements whose text is never shown.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Fetches pages over HTTP with `reqwest`.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(concat!("linkpost/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }

    /// Uses a caller-configured client (timeouts, proxies).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Visible text of an HTML document, whitespace collapsed.
pub(crate) fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::new();
    for node in document.root_element().descendants() {
        let Some(chunk) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            text.push_str(chunk);
            text.push(' ');
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Absolute image URLs referenced by the page; `og:image` first.
pub(crate) fn extract_image_urls(html: &str, base: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let og = document
        .select(&OG_IMAGE)
        .filter_map(|e| e.value().attr("content"));
    let imgs = document.select(&IMG).filter_map(|e| e.value().attr("src"));
    let mut urls: Vec<String> = Vec::new();
    for src in og.chain(imgs) {
        if let Ok(resolved) = base.join(src.trim()) {
            let s = resolved.to_string();
            if !urls.contains(&s) {
                urls.push(s);
            }
        }
    }
    urls
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, CollabError> {
        let base = Url::parse(url).map_err(|e| CollabError::Fetch(format!("{}: {}", url, e)))?;
        let response = self
            .client
            .get(base.clone())
            .send()
            .await
            .map_err(|e| CollabError::Fetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| CollabError::Fetch(e.to_string()))?;
        let html = response
            .text()
            .await
            .map_err(|e| CollabError::Fetch(e.to_string()))?;
        let content = html_to_text(&html);
        let image_urls = extract_image_urls(&html, &base);
        debug!(url, chars = content.len(), images = image_urls.len(), "fetched page");
        if content.is_empty() {
            return Err(CollabError::Fetch(format!("{}: empty page", url)));
        }
        Ok(FetchedPage {
            content,
            image_urls,
        })
    }
}
