// src/submit/transport.rs
// =============================================================================
// Outbound HTTP for submissions.
//
// The submitter talks to a `Transport` rather than to reqwest directly. The
// production implementation wraps a reqwest `Client`; tests use a recording
// fake and never touch the network.
//
// A transport reports every HTTP status as a response. Only failures to get
// a response at all (DNS, TLS, timeout, connection reset) are errors.
// =============================================================================

use crate::error::{IndexNowError, Result};
use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// What the submitter needs to know about a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Reason phrase for the status ("OK", "Too Many Requests", ...)
    pub reason: String,
    /// Raw `Retry-After` header, if the server sent one
    pub retry_after: Option<String>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A request that produced no response.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub code: Option<u16>,
}

impl From<TransportError> for IndexNowError {
    fn from(e: TransportError) -> Self {
        IndexNowError::Mixed {
            message: e.message,
            code: e.code,
        }
    }
}

/// JSON body of a multi-URL submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPayload {
    pub host: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_location: Option<String>,
    pub url_list: Vec<String>,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` (query already attached).
    async fn get(&self, url: &Url) -> std::result::Result<TransportResponse, TransportError>;

    /// POST `payload` as JSON to `url`.
    async fn post_json(
        &self,
        url: &Url,
        payload: &BatchPayload,
    ) -> std::result::Result<TransportResponse, TransportError>;

    /// GET `url` and return the body of a successful response.
    async fn fetch_text(&self, url: &str) -> std::result::Result<String, TransportError>;
}

/// reqwest-backed transport with a per-request timeout.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("indexnow-notifier/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| IndexNowError::HttpClient(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url) -> std::result::Result<TransportResponse, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(categorize_error)?;

        Ok(analyze_response(&response))
    }

    async fn post_json(
        &self,
        url: &Url,
        payload: &BatchPayload,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(url.clone())
            .json(payload)
            .send()
            .await
            .map_err(categorize_error)?;

        Ok(analyze_response(&response))
    }

    async fn fetch_text(&self, url: &str) -> std::result::Result<String, TransportError> {
        let response = self.client.get(url).send().await.map_err(categorize_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError {
                message: format!("Failed to fetch {}: HTTP {}", url, status.as_u16()),
                code: Some(status.as_u16()),
            });
        }

        response.text().await.map_err(categorize_error)
    }
}

fn analyze_response(response: &reqwest::Response) -> TransportResponse {
    let status = response.status();

    TransportResponse {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("").to_string(),
        retry_after: response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    }
}

// Same buckets the link checker used, folded into one message.
fn categorize_error(error: reqwest::Error) -> TransportError {
    let detail = error.to_string();

    let message = if error.is_timeout() {
        format!("Request timed out: {}", detail)
    } else if error.is_connect() {
        format!("Connection failed: {}", detail)
    } else if error.is_redirect() {
        format!("Too many redirects: {}", detail)
    } else {
        detail
    };

    TransportError {
        message,
        code: error.status().map(|s| s.as_u16()),
    }
}
