// Retriever Agent: web search through the Google Custom Search JSON API

use crate::config::Config;
use crate::error::ApiError;
use crate::models::SearchResult;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};

const GOOGLE_CSE_URL: &str = "https://www.googleapis.com/customsearch/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// The provider never returns more than this many items per call.
pub const MAX_RESULTS: usize = 10;
pub const DEFAULT_RESULTS: usize = 5;

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, ApiError>;
}

#[derive(Debug, Clone)]
struct GoogleCredentials {
    api_key: String,
    cse_id: String,
}

#[derive(Debug, Clone)]
pub struct RetrieverAgent {
    client: reqwest::Client,
    endpoint: String,
    credentials: Option<GoogleCredentials>,
}

impl RetrieverAgent {
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        let credentials = match (&config.google_api_key, &config.google_cse_id) {
            (Some(api_key), Some(cse_id)) => Some(GoogleCredentials {
                api_key: api_key.clone(),
                cse_id: cse_id.clone(),
            }),
            _ => None,
        };

        Ok(Self {
            client,
            endpoint: GOOGLE_CSE_URL.to_string(),
            credentials,
        })
    }
}

#[async_trait]
impl SearchProvider for RetrieverAgent {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, ApiError> {
        let Some(creds) = &self.credentials else {
            return Err(ApiError::NotConfigured(
                "Google API not configured. Set GOOGLE_API_KEY and GOOGLE_CSE_ID in .env".to_string(),
            ));
        };

        let num = limit.clamp(1, MAX_RESULTS).to_string();
        info!("Retriever: Searching for: {} (num={})", query, num);

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", creds.api_key.as_str()),
                ("cx", creds.cse_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            let message = provider_error_message(&bytes);
            error!("Google API error ({}): {}", status, message);
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body: GoogleResponse = serde_json::from_slice(&bytes)?;
        let results: Vec<SearchResult> = body.items.into_iter().map(SearchResult::from).collect();
        debug!("Retriever: {} result(s)", results.len());
        Ok(results)
    }
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
    #[serde(default)]
    error: Option<GoogleError>,
}

#[derive(Debug, Deserialize)]
struct GoogleItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
}

fn provider_error_message(body: &[u8]) -> String {
    serde_json::from_slice::<GoogleResponse>(body)
        .ok()
        .and_then(|b| b.error)
        .map(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "Search API error".to_string())
}

impl From<GoogleItem> for SearchResult {
    fn from(item: GoogleItem) -> Self {
        let source = url::Url::parse(&item.link)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();

        SearchResult {
            title: item.title,
            url: item.link,
            snippet: item.snippet,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn items_map_to_results_with_hostname() {
        let body: GoogleResponse = serde_json::from_str(
            r#"{"items": [
                {"title": "Rust", "link": "https://www.rust-lang.org/learn", "snippet": "A language"},
                {"title": "Broken", "link": "not a url"}
            ]}"#,
        )
        .unwrap();

        let results: Vec<SearchResult> = body.items.into_iter().map(SearchResult::from).collect();
        assert_eq!(results[0].source, "www.rust-lang.org");
        assert_eq!(results[0].url, "https://www.rust-lang.org/learn");
        assert_eq!(results[0].snippet, "A language");
        assert_eq!(results[1].source, "");
        assert_eq!(results[1].snippet, "");
    }

    #[test]
    fn empty_response_has_no_items() {
        let body: GoogleResponse = serde_json::from_str(r#"{"kind": "customsearch#search"}"#).unwrap();
        assert!(body.items.is_empty());
        assert!(body.error.is_none());
    }

    #[test]
    fn provider_error_message_is_read() {
        let body = br#"{"error": {"code": 403, "message": "API key not valid"}}"#;
        assert_eq!(provider_error_message(body), "API key not valid");
        assert_eq!(provider_error_message(b"<html>502</html>"), "Search API error");
        assert_eq!(provider_error_message(br#"{"error": {}}"#), "Search API error");
    }

    #[tokio::test]
    async fn unconfigured_search_fails_without_network() {
        let agent = RetrieverAgent::from_config(&Config::for_tests(PathBuf::from("briefs"))).unwrap();
        let err = agent.search("rust", 5).await.unwrap_err();
        assert!(matches!(err, ApiError::NotConfigured(ref m) if m.contains("GOOGLE_API_KEY")));
    }
}
