//! Serper.dev web search client.
//!
//! Wraps the Serper search API with a sliding-window rate limit, HTML
//! stripping of snippets, and deterministic mock results when no API key is
//! configured or the upstream call fails.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use trawl_core::error::{TrawlError, TrawlResult};
use trawl_core::traits::{WebHit, WebSearcher};

const SERPER_URL: &str = "https://google.serper.dev/search";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const RATE_WINDOW: Duration = Duration::from_secs(60);
const RATE_LIMIT: usize = 10;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static SENTENCE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

/// Tracks request timestamps within the sliding window.
struct RateLimiter {
    window: Duration,
    limit: usize,
    timestamps: Mutex<Vec<Instant>>,
}

impl RateLimiter {
    fn new(window: Duration, limit: usize) -> Self {
        Self {
            window,
            limit,
            timestamps: Mutex::new(Vec::new()),
        }
    }

    /// Record one request, failing when the window is already full.
    fn acquire(&self) -> TrawlResult<()> {
        let now = Instant::now();
        let mut timestamps = self
            .timestamps
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        timestamps.retain(|t| now.duration_since(*t) <= self.window);
        if timestamps.len() >= self.limit {
            return Err(TrawlError::rate_limit(format!(
                "Rate limit exceeded ({} req/min)",
                self.limit
            )));
        }
        timestamps.push(now);
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
    // Some response shapes use `results` instead of `organic`.
    #[serde(default)]
    results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    date: Option<String>,
}

/// Web searcher backed by Serper.dev.
///
/// Without an API key every search returns mock results, which keeps the
/// rest of the pipeline exercisable offline.
pub struct SerperClient {
    client: Client,
    api_key: Option<String>,
    limiter: RateLimiter,
}

impl SerperClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.is_empty()),
            limiter: RateLimiter::new(RATE_WINDOW, RATE_LIMIT),
        }
    }

    /// Read `SERPER_API_KEY` from the environment.
    pub fn from_env() -> Self {
        Self::new(std::env::var("SERPER_API_KEY").ok())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn call_serper(&self, api_key: &str, query: &str, k: usize) -> TrawlResult<Vec<WebHit>> {
        self.limiter.acquire()?;

        let body = json!({ "q": query, "num": k });
        let response = self
            .client
            .post(SERPER_URL)
            .header("X-API-KEY", api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| TrawlError::web_search(format!("Serper request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await.unwrap_or_default();
            return Err(TrawlError::web_search(format!(
                "Serper API error: {}: {}",
                status, error
            )));
        }

        let parsed: SerperResponse = response
            .json()
            .await
            .map_err(|e| TrawlError::web_search(format!("Failed to parse response: {}", e)))?;

        let organic = if parsed.organic.is_empty() {
            parsed.results
        } else {
            parsed.organic
        };

        Ok(organic
            .into_iter()
            .take(k)
            .map(|item| WebHit {
                title: item.title,
                link: item.link,
                snippet: strip_html(&item.snippet),
                published: item.date,
            })
            .collect())
    }
}

#[async_trait]
impl WebSearcher for SerperClient {
    async fn search(&self, query: &str, k: usize) -> TrawlResult<Vec<WebHit>> {
        let api_key = match &self.api_key {
            Some(key) => key.clone(),
            None => {
                warn!("SERPER_API_KEY not set, using mock results");
                return Ok(mock_results(query, k));
            }
        };

        match self.call_serper(&api_key, query, k).await {
            Ok(hits) => Ok(hits),
            Err(e) => {
                warn!(error = %e, "Web search failed, falling back to mock results");
                Ok(mock_results(query, k))
            }
        }
    }
}

/// Remove HTML tags from a snippet.
pub fn strip_html(raw: &str) -> String {
    HTML_TAG.replace_all(raw, "").into_owned()
}

/// Deterministic stand-in results for keyless or failed searches.
pub fn mock_results(query: &str, k: usize) -> Vec<WebHit> {
    let snippets = [
        format!(
            "This is a mock search result for the query '{}'. It provides relevant information about the topic.",
            query
        ),
        format!(
            "Another mock search result related to '{}'. This helps test the system functionality.",
            query
        ),
        format!(
            "A third mock result for '{}' to demonstrate multiple search results.",
            query
        ),
    ];
    snippets
        .into_iter()
        .enumerate()
        .take(k)
        .map(|(i, snippet)| WebHit {
            title: format!("Mock Result {} for '{}'", i + 1, query),
            link: format!("https://example.com/result{}", i + 1),
            snippet,
            published: None,
        })
        .collect()
}

/// Naive extractive summary of a batch of snippets: the first three
/// sentences longer than 20 characters.
pub fn summarize_results(hits: &[WebHit]) -> String {
    if hits.is_empty() {
        return "No results to summarize.".to_string();
    }

    let text = hits
        .iter()
        .filter(|h| !h.snippet.is_empty())
        .map(|h| h.snippet.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let sentences: Vec<&str> = SENTENCE_BREAK
        .split(&text)
        .map(str::trim)
        .filter(|s| s.len() > 20)
        .take(3)
        .collect();

    if sentences.is_empty() {
        "No content available for summarization.".to_string()
    } else {
        format!("{}.", sentences.join(". "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html_removes_tags() {
        assert_eq!(strip_html("a <b>bold</b> claim"), "a bold claim");
        assert_eq!(strip_html("plain text"), "plain text");
    }

    #[test]
    fn test_mock_results_truncate() {
        let hits = mock_results("rust", 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Mock Result 1 for 'rust'");
        assert_eq!(hits[1].link, "https://example.com/result2");
    }

    #[test]
    fn test_mock_results_cap_at_three() {
        assert_eq!(mock_results("rust", 10).len(), 3);
    }

    #[tokio::test]
    async fn test_keyless_search_returns_mocks() {
        let client = SerperClient::new(None);
        let hits = client.search("hybrid retrieval", 5).await.unwrap();
        assert_eq!(hits.len(), 3);
        assert!(hits[0].snippet.contains("hybrid retrieval"));
    }

    #[test]
    fn test_empty_key_counts_as_missing() {
        let client = SerperClient::new(Some(String::new()));
        assert!(!client.has_api_key());
    }

    #[test]
    fn test_rate_limiter_caps_window() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 3);
        for _ in 0..3 {
            limiter.acquire().unwrap();
        }
        let err = limiter.acquire().unwrap_err();
        assert!(matches!(err, TrawlError::RateLimit { .. }));
    }

    #[test]
    fn test_rate_limiter_releases_after_window() {
        let limiter = RateLimiter::new(Duration::from_millis(10), 1);
        limiter.acquire().unwrap();
        std::thread::sleep(Duration::from_millis(20));
        limiter.acquire().unwrap();
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(summarize_results(&[]), "No results to summarize.");
    }

    #[test]
    fn test_summarize_takes_first_sentences() {
        let hits = vec![WebHit {
            title: String::new(),
            link: String::new(),
            snippet: "The quick brown fox jumps over the lazy dog. A second sentence with enough length here. Third sentence that is also long enough. Fourth sentence never appears in output.".to_string(),
            published: None,
        }];
        let summary = summarize_results(&hits);
        assert!(summary.starts_with("The quick brown fox"));
        assert!(!summary.contains("Fourth"));
        assert!(summary.ends_with('.'));
    }

    #[test]
    fn test_summarize_short_snippets_only() {
        let hits = vec![WebHit {
            title: String::new(),
            link: String::new(),
            snippet: "too short".to_string(),
            published: None,
        }];
        assert_eq!(
            summarize_results(&hits),
            "No content available for summarization."
        );
    }
}
