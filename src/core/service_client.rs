// src/core/service_client.rs
//! HTTP client shared by the language-model and search integrations.
//!
//! Every failure leaving this module is a `PitchError::Upstream` tagged with
//! the service name.

use crate::error::{PitchError, PitchResult};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{error, trace};

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub struct ServiceClient {
    client: reqwest::Client,
    service: &'static str,
}

impl ServiceClient {
    pub fn new(service: &'static str, timeout_seconds: u64) -> PitchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| PitchError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, service })
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.client
    }

    /// Send a prepared request and decode a JSON body from a 2xx response
    pub async fn send_json<R>(&self, request: RequestBuilder) -> PitchResult<R>
    where
        R: DeserializeOwned,
    {
        // reqwest errors carry the request URL, which may hold an API key
        let response = request.send().await.map_err(|e| {
            let e = e.without_url();
            error!("{} request failed: {}", self.service, e);
            PitchError::upstream(self.service, None, e.to_string())
        })?;

        let status = response.status();
        trace!("{} response status: {}", self.service, status);

        let body = response.text().await.map_err(|e| {
            PitchError::upstream(
                self.service,
                Some(status.as_u16()),
                format!("Failed to read response body: {}", e.without_url()),
            )
        })?;

        if !status.is_success() {
            error!("{} error response {}: {}", self.service, status, body);
            return Err(self.status_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            PitchError::upstream(
                self.service,
                Some(status.as_u16()),
                format!("Unexpected response format: {}", e),
            )
        })
    }

    fn status_error(&self, status: StatusCode, body: &str) -> PitchError {
        let message = match status.as_u16() {
            401 | 403 => format!("Authentication failed: {}", body),
            429 => format!("Rate limit exceeded: {}", body),
            _ if body.trim().is_empty() => "Unknown error".to_string(),
            _ => body.to_string(),
        };
        PitchError::upstream(self.service, Some(status.as_u16()), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_errors_are_upstream() {
        let client = ServiceClient::new("OpenAI", DEFAULT_TIMEOUT_SECS).unwrap();

        let err = client.status_error(StatusCode::UNAUTHORIZED, "bad key");
        assert!(err.is_upstream());
        assert!(err.to_string().contains("Authentication failed"));

        let err = client.status_error(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(err.to_string().contains("(429)"));
        assert!(err.to_string().contains("Rate limit exceeded"));

        let err = client.status_error(StatusCode::BAD_GATEWAY, "");
        assert!(err.to_string().ends_with("Unknown error"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_upstream() {
        let client = ServiceClient::new("Google Search", 2).unwrap();
        let request = client.http().get("http://127.0.0.1:9/unreachable");

        let result: PitchResult<serde_json::Value> = client.send_json(request).await;
        match result {
            Err(PitchError::Upstream { service, status, .. }) => {
                assert_eq!(service, "Google Search");
                assert_eq!(status, None);
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
    }
}
