//! Academy sync Redmine infrastructure adapter.
//!
//! Implements the [`reconcile::TrackerClient`] trait over the Redmine REST
//! API using [`reqwest`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. It attaches
//! the `X-Redmine-API-Key` and JSON content-type headers to every request,
//! joins paths onto the configured base URL, and reports every HTTP status
//! back to the domain unchanged. Nothing is retried.
//!
//! ## TLS
//!
//! The training tracker is served with a self-signed certificate, so
//! certificate validation is disabled for this client. Do not point it at a
//! tracker reachable over an untrusted network.

use async_trait::async_trait;
use reconcile::{TrackerClient, TrackerConfig, TrackerResponse, TransportError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Header carrying the Redmine API key.
pub const API_KEY_HEADER: &str = "x-redmine-api-key";

/// The client could not be constructed.
#[derive(Debug, Error)]
pub enum RedmineError {
    /// The API key contains characters that are not valid in an HTTP header.
    #[error("API key is not a valid HTTP header value")]
    InvalidApiKey,

    /// The HTTP client (TLS backend) failed to initialise.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// [`TrackerClient`] backed by the Redmine REST API.
///
/// Read-only after construction; share it by reference.
#[derive(Debug, Clone)]
pub struct RedmineClient {
    http: reqwest::Client,
    base_url: String,
}

impl RedmineClient {
    /// Creates a client for `config.base_url` authenticating with
    /// `config.api_key`.
    pub fn new(config: &TrackerConfig) -> Result<Self, RedmineError> {
        let mut api_key = HeaderValue::from_str(config.api_key.expose())
            .map_err(|_| RedmineError::InvalidApiKey)?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Absolute URL for a tracker-relative `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn finish(
        method: &'static str,
        path: &str,
        sent: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<TrackerResponse, TransportError> {
        let transport = |err: reqwest::Error| TransportError::new(method, path, err.to_string());

        let response = sent.map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport)?;
        debug!(method, path, status, "Tracker call completed");
        Ok(TrackerResponse::new(status, body))
    }
}

#[async_trait]
impl TrackerClient for RedmineClient {
    async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<TrackerResponse, TransportError> {
        let mut request = self.http.get(self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        Self::finish("GET", path, request.send().await).await
    }

    async fn post(&self, path: &str, payload: &Value) -> Result<TrackerResponse, TransportError> {
        let sent = self.http.post(self.url(path)).json(payload).send().await;
        Self::finish("POST", path, sent).await
    }

    async fn delete(&self, path: &str) -> Result<TrackerResponse, TransportError> {
        let sent = self.http.delete(self.url(path)).send().await;
        Self::finish("DELETE", path, sent).await
    }
}
