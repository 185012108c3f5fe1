//! Live search lookup over the DuckDuckGo HTML endpoint.

use super::{render_hits, InsightLookup, SearchHit, MAX_HITS};
use crate::errors::LookupFailure;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Keyword search lookup that degrades to a fallback string.
///
/// Issues one search per query, keeps at most [`MAX_HITS`] results, and
/// converts every failure, transport, empty results, or an unparseable
/// page, into the configured fallback. "No results" and transport
/// failures are distinguished in logs but not in the returned text.
#[derive(Debug, Clone)]
pub struct InsightScout {
    http: reqwest::Client,
    endpoint: String,
    fallback: String,
}

impl InsightScout {
    /// Creates a scout with the given fallback string.
    #[must_use]
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            fallback: fallback.into(),
        }
    }

    /// Overrides the search endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// The fallback string returned when search is unavailable.
    #[must_use]
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, LookupFailure> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("q", query)])
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| LookupFailure::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupFailure::transport(format!("status {status}")));
        }

        let html = response
            .text()
            .await
            .map_err(|e| LookupFailure::transport(e.to_string()))?;

        let hits = parse_results(&html)?;
        if hits.is_empty() {
            return Err(LookupFailure::NoResults);
        }
        Ok(hits)
    }
}

#[async_trait]
impl InsightLookup for InsightScout {
    fn name(&self) -> &str {
        "insight_scout"
    }

    async fn lookup(&self, query: &str) -> String {
        let outcome = self.search(query).await;
        self.degrade(query, outcome)
    }
}

impl InsightScout {
    fn degrade(&self, query: &str, outcome: Result<Vec<SearchHit>, LookupFailure>) -> String {
        match outcome {
            Ok(hits) => render_hits(&hits),
            Err(LookupFailure::NoResults) => {
                tracing::debug!(query, "search returned nothing usable, using fallback");
                self.fallback.clone()
            }
            Err(error) => {
                tracing::warn!(query, error = %error, "search degraded to fallback");
                self.fallback.clone()
            }
        }
    }
}

fn parse_results(html: &str) -> Result<Vec<SearchHit>, LookupFailure> {
    let document = Html::parse_document(html);
    let result_selector =
        Selector::parse("div.result").map_err(|e| LookupFailure::malformed(e.to_string()))?;
    let title_selector =
        Selector::parse("a.result__a").map_err(|e| LookupFailure::malformed(e.to_string()))?;
    let snippet_selector =
        Selector::parse(".result__snippet").map_err(|e| LookupFailure::malformed(e.to_string()))?;

    let mut hits = Vec::new();
    for result in document.select(&result_selector) {
        if hits.len() == MAX_HITS {
            break;
        }
        let title = result
            .select(&title_selector)
            .next()
            .map(|node| collapse_whitespace(&node.text().collect::<String>()))
            .unwrap_or_default();
        if title.is_empty() {
            continue;
        }
        let snippet = result
            .select(&snippet_selector)
            .next()
            .map(|node| collapse_whitespace(&node.text().collect::<String>()))
            .unwrap_or_default();
        hits.push(SearchHit::new(title, snippet));
    }
    Ok(hits)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
