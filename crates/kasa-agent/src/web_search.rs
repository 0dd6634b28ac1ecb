//! Web search providers

use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use crate::error::{Error, Result};

const DUCKDUCKGO_URL: &str = "https://html.duckduckgo.com/html/";
const MAX_RESULTS: usize = 5;

/// Runs a free-text web query and returns the findings as plain text
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Search the web. An empty string means nothing was found.
    async fn run(&self, query: &str) -> Result<String>;
}

/// DuckDuckGo search through its HTML results page. Needs no API key.
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    endpoint: String,
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl DuckDuckGoSearch {
    pub fn new() -> Self {
        Self::with_endpoint(DUCKDUCKGO_URL)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent("Mozilla/5.0 (compatible; kasa/0.1)")
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl WebSearch for DuckDuckGoSearch {
    async fn run(&self, query: &str) -> Result<String> {
        if query.trim().is_empty() {
            return Ok(String::new());
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::WebSearch(format!("HTTP {}", status.as_u16())));
        }

        let html = response.text().await?;
        let results = parse_results(&html, MAX_RESULTS);
        tracing::debug!("Web search returned {} results", results.len());
        Ok(format_search_results(&results))
    }
}

/// One organic search hit
#[derive(Debug, Clone, PartialEq, Eq)]
struct SearchResult {
    title: String,
    snippet: String,
    url: String,
}

fn collapse_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(result: ElementRef<'_>, selector: &Selector) -> String {
    result
        .select(selector)
        .next()
        .map(collapse_text)
        .unwrap_or_default()
}

/// Organic results from a DuckDuckGo HTML page, ads skipped
fn parse_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    let (Ok(result_sel), Ok(title_sel), Ok(snippet_sel), Ok(url_sel)) = (
        Selector::parse("div.result:not(.result--ad)"),
        Selector::parse("a.result__a"),
        Selector::parse(".result__snippet"),
        Selector::parse(".result__url"),
    ) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    document
        .select(&result_sel)
        .map(|result| SearchResult {
            title: first_text(result, &title_sel),
            snippet: first_text(result, &snippet_sel),
            url: first_text(result, &url_sel),
        })
        .filter(|r| !r.snippet.is_empty())
        .take(max_results)
        .collect()
}

fn format_search_results(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| {
            let mut line = String::new();
            if !r.title.is_empty() {
                line.push_str(&r.title);
                line.push_str(": ");
            }
            line.push_str(&r.snippet);
            if !r.url.is_empty() {
                line.push_str(&format!(" ({})", r.url));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
