// src/research.rs
//! Company research through the Google Custom Search JSON API

use crate::core::ServiceClient;
use crate::environment::{ApiKeys, EnvironmentConfig};
use crate::error::PitchResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

const SERVICE_NAME: &str = "Google Search";
const RESULT_COUNT: u8 = 3;
pub const NO_RESULTS_MESSAGE: &str = "No relevant recent information found online.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

/// Returns a few ranked snippets about a company. No matches is `Ok(vec![])`.
#[async_trait]
pub trait ResearchService: Send + Sync {
    async fn research(&self, company_name: &str) -> PitchResult<Vec<SearchResult>>;
}

/// True when there is nothing worth searching for
pub fn is_unknown_company(company_name: &str) -> bool {
    let name = company_name.trim();
    name.is_empty() || name.eq_ignore_ascii_case("not found")
}

pub fn research_query(company_name: &str) -> String {
    format!(
        "{} recent innovations or projects in AI, moving to cloud, or cybersecurity",
        company_name.trim()
    )
}

/// Bullet list handed to the model as web data
pub fn format_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return NO_RESULTS_MESSAGE.to_string();
    }

    results
        .iter()
        .map(|r| format!("- **{}**: {} ({})", r.title, r.snippet, r.url))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    link: String,
}

pub struct GoogleSearchClient {
    service: ServiceClient,
    api_key: String,
    cse_id: String,
    base_url: String,
}

impl GoogleSearchClient {
    pub fn new(api_key: String, cse_id: String, base_url: String, timeout_seconds: u64) -> PitchResult<Self> {
        Ok(Self {
            service: ServiceClient::new(SERVICE_NAME, timeout_seconds)?,
            api_key,
            cse_id,
            base_url,
        })
    }

    pub fn from_config(config: &EnvironmentConfig, keys: &ApiKeys) -> PitchResult<Self> {
        let (api_key, cse_id) = keys.search()?;
        Self::new(
            api_key.to_string(),
            cse_id.to_string(),
            config.search_base_url.clone(),
            config.timeout_seconds,
        )
    }
}

#[async_trait]
impl ResearchService for GoogleSearchClient {
    async fn research(&self, company_name: &str) -> PitchResult<Vec<SearchResult>> {
        if is_unknown_company(company_name) {
            return Ok(Vec::new());
        }

        info!("Researching company: {}", company_name.trim());

        let count = RESULT_COUNT.to_string();
        let query = research_query(company_name);
        let builder = self.service.http().get(&self.base_url).query(&[
            ("key", self.api_key.as_str()),
            ("cx", self.cse_id.as_str()),
            ("q", query.as_str()),
            ("num", count.as_str()),
        ]);

        let response: SearchResponse = self.service.send_json(builder).await?;

        Ok(response
            .items
            .into_iter()
            .map(|item| SearchResult {
                title: item.title,
                snippet: item.snippet,
                url: item.link,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_company() {
        assert!(is_unknown_company(""));
        assert!(is_unknown_company("  "));
        assert!(is_unknown_company("Not found"));
        assert!(is_unknown_company("NOT FOUND"));
        assert!(!is_unknown_company("Acme"));
    }

    #[test]
    fn test_format_results() {
        assert_eq!(format_results(&[]), NO_RESULTS_MESSAGE);

        let results = vec![SearchResult {
            title: "Acme moves to cloud".to_string(),
            snippet: "Acme announced...".to_string(),
            url: "https://example.com/acme".to_string(),
        }];
        assert_eq!(
            format_results(&results),
            "- **Acme moves to cloud**: Acme announced... (https://example.com/acme)"
        );
    }

    #[test]
    fn test_missing_items_is_empty_result() {
        let response: SearchResponse = serde_json::from_str(r#"{"kind": "customsearch"}"#).unwrap();
        assert!(response.items.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_company_skips_request() {
        let client = GoogleSearchClient::new(
            "key".to_string(),
            "cse".to_string(),
            "http://127.0.0.1:9/never-called".to_string(),
            1,
        )
        .unwrap();

        assert!(client.research("Not found").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_does_not_expose_api_key() {
        let client = GoogleSearchClient::new(
            "SECRET-KEY-123".to_string(),
            "cse".to_string(),
            "http://127.0.0.1:9/customsearch/v1".to_string(),
            2,
        )
        .unwrap();

        let err = client.research("Globex").await.unwrap_err();
        assert!(err.is_upstream());
        assert!(!err.to_string().contains("SECRET-KEY-123"));
        assert!(!err.to_string().contains("key="));
    }
}
