//! Broker REST API client for fetching event type definitions.
//!
//! This module provides a client for the broker's event type endpoints:
//! - `GET {base}/event-types` - all event types
//! - `GET {base}/event-types/{name}` - a single event type
//!
//! # Architecture
//!
//! The [`BrokerClient`] is cheap to clone and designed to be shared across
//! request handlers. It includes:
//! - A per-request timeout taken from the server configuration
//! - Forwarding of the caller's `Authorization` header, so the broker
//!   applies the caller's own access rights
//! - Structured error handling with [`BrokerError`]
//!
//! Responses are returned as raw JSON; interpreting them is the linter's job.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Url};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur when talking to the broker.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The request to the broker timed out.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The broker is unreachable.
    #[error("broker unavailable: {0}")]
    Unavailable(String),

    /// The broker answered with a non-200 status.
    #[error("Status:{status}, {reason}. Nakadi: {body}")]
    Status {
        /// HTTP status code returned by the broker.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
        /// Response body, usually a problem+json document.
        body: String,
    },

    /// The broker answered 200 but the body is not JSON.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Client configuration error.
    #[error("client configuration error: {0}")]
    Configuration(String),
}

impl BrokerError {
    /// The broker's status code, if it answered with an error status.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Client for the broker's event type endpoints.
///
/// # Example
///
/// ```rust,ignore
/// use std::time::Duration;
/// use eventtype_linter_server::broker::BrokerClient;
///
/// let client = BrokerClient::new("https://nakadi.example.org", Duration::from_secs(5))?;
/// let event_type = client.fetch_event_type("shop.order-placed", Some("Bearer token")).await?;
/// ```
#[derive(Debug, Clone)]
pub struct BrokerClient {
    /// The underlying HTTP client.
    http_client: Client,

    /// Base URL of the broker API.
    base_url: Url,

    /// Timeout applied to each request, kept for error reporting.
    timeout: Duration,
}

impl BrokerClient {
    /// Creates a new broker client.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Configuration`] if the base URL is not a valid
    /// http(s) URL or the HTTP client cannot be created.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BrokerError> {
        let base_url = base_url.into();
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| BrokerError::Configuration(format!("invalid base URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BrokerError::Configuration(format!(
                "base URL '{base_url}' cannot carry a path"
            )));
        }

        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BrokerError::Configuration(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url,
            timeout,
        })
    }

    /// Fetches a single event type definition by name.
    ///
    /// The name is sent as one percent-encoded path segment.
    ///
    /// # Errors
    ///
    /// - [`BrokerError::Status`] - The broker answered with a non-200 status
    /// - [`BrokerError::Timeout`] - The request timed out
    /// - [`BrokerError::Unavailable`] - The broker is unreachable
    /// - [`BrokerError::InvalidResponse`] - The body is not JSON
    pub async fn fetch_event_type(
        &self,
        name: &str,
        authorization: Option<&str>,
    ) -> Result<Value, BrokerError> {
        let url = self.endpoint(&["event-types", name]);
        self.get_json(url, authorization).await
    }

    /// Fetches all event type definitions.
    ///
    /// # Errors
    ///
    /// Same as [`BrokerClient::fetch_event_type`].
    pub async fn fetch_event_types(&self, authorization: Option<&str>) -> Result<Value, BrokerError> {
        let url = self.endpoint(&["event-types"]);
        self.get_json(url, authorization).await
    }

    /// Returns the base URL of the broker API, without trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base URL can always carry a path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json(&self, url: Url, authorization: Option<&str>) -> Result<Value, BrokerError> {
        debug!(url = %url, "Fetching from broker");

        let mut request = self.http_client.get(url.clone());
        if let Some(authorization) = authorization {
            request = request.header(AUTHORIZATION, authorization);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                BrokerError::Timeout(self.timeout)
            } else if e.is_connect() {
                BrokerError::Unavailable(format!("connection failed: {e}"))
            } else {
                BrokerError::Unavailable(format!("request failed: {e}"))
            }
        })?;

        let status = response.status();

        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = %status, "Broker returned an error status");
            return Err(BrokerError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| BrokerError::InvalidResponse(format!("failed to parse response: {e}")))
    }
}
