use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::core::lib::{SearchProvider, SearchResult, WrenError, WrenResult};

const SOURCE: &str = "DuckDuckGo";
const MAX_RELATED_TOPICS: usize = 5;

/// DuckDuckGo instant-answer search.
#[derive(Debug)]
pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> WrenResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WrenError::SearchError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, endpoint: endpoint.into() })
    }
}

#[async_trait::async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str) -> WrenResult<Vec<SearchResult>> {
        debug!(query, "searching the web");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("format", "json"), ("no_html", "1")])
            .send()
            .await
            .map_err(|e| WrenError::SearchError(format!("Web search request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WrenError::SearchError(format!("Web search failed with status code: {}", status)));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| WrenError::SearchError(format!("Failed to read search response: {}", e)))?;

        Ok(parse_instant_answer(&json))
    }
}

/// Collects the abstract and up to five related topics from an
/// instant-answer document.
pub fn parse_instant_answer(json: &Value) -> Vec<SearchResult> {
    let text = |key: &str| json.get(key).and_then(Value::as_str).unwrap_or_default().to_string();
    let mut results = Vec::new();

    let abstract_text = text("Abstract");
    if !abstract_text.is_empty() {
        results.push(SearchResult {
            title: text("Heading"),
            snippet: abstract_text,
            url: text("AbstractURL"),
            source: SOURCE.to_string(),
        });
    }

    let topics = json.get("RelatedTopics").and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default();
    for topic in topics.iter().take(MAX_RELATED_TOPICS) {
        let (Some(snippet), Some(url)) = (
            topic.get("Text").and_then(Value::as_str),
            topic.get("FirstURL").and_then(Value::as_str),
        ) else {
            continue;
        };
        let title = snippet.split(" - ").next().unwrap_or(snippet);
        results.push(SearchResult {
            title: title.to_string(),
            snippet: snippet.to_string(),
            url: url.to_string(),
            source: SOURCE.to_string(),
        });
    }

    results
}
