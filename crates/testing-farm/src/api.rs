//! REST client for the Testing Farm request endpoint.
//!
//! Wraps `POST /v0.1/requests` using [`reqwest`]. One call per job, no
//! retries: a transport failure or a rejected request is returned to
//! the caller as-is.

use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::request::DispatchRequest;

/// Public Testing Farm development instance.
pub const DEFAULT_API_URL: &str = "https://api.dev.testing-farm.io";

/// Path of the request submission endpoint, relative to the API URL.
const REQUESTS_PATH: &str = "/v0.1/requests";

/// Testing Farm API key.
///
/// `Debug` output is redacted so the key never ends up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// HTTP client for a Testing Farm instance.
pub struct TestingFarmApi {
    client: reqwest::Client,
    api_url: String,
    api_key: ApiKey,
}

/// Body returned by `POST /v0.1/requests` on success. Only the id is used.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Server-assigned request identifier.
    pub id: String,
}

/// Wire body: the request with the API key alongside it.
#[derive(Serialize)]
struct SubmitBody<'a> {
    api_key: &'a str,
    #[serde(flatten)]
    request: &'a DispatchRequest,
}

/// Errors from the Testing Farm REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum TestingFarmApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Testing Farm answered with something other than `200 OK`.
    #[error("Testing Farm API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A `200 OK` body that does not carry a request id.
    #[error("Unexpected Testing Farm response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

impl TestingFarmApi {
    /// Create a client for a Testing Farm instance.
    ///
    /// * `api_url` - Base URL, e.g. `https://api.dev.testing-farm.io`.
    pub fn new(api_url: impl Into<String>, api_key: ApiKey) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, api_key)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>, api_key: ApiKey) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_key,
        }
    }

    /// Base URL as configured, without the endpoint path.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Full URL of the submission endpoint.
    pub fn requests_url(&self) -> String {
        format!("{}{REQUESTS_PATH}", self.api_url.trim_end_matches('/'))
    }

    /// Submit a test request.
    ///
    /// Sends a `POST /v0.1/requests` with the request and API key as JSON
    /// and returns the request id Testing Farm assigned.
    pub async fn submit_request(
        &self,
        request: &DispatchRequest,
    ) -> Result<String, TestingFarmApiError> {
        let body = SubmitBody {
            api_key: self.api_key.expose(),
            request,
        };

        let response = self
            .client
            .post(self.requests_url())
            .json(&body)
            .send()
            .await?;

        let submitted: SubmitResponse = Self::parse_response(response).await?;
        tracing::info!(tf_id = %submitted.id, "Testing Farm request accepted");
        Ok(submitted.id)
    }

    // ---- private helpers ----

    /// Read the body and decode it, or turn a non-`200` status into
    /// [`TestingFarmApiError::ApiError`] after logging the body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, TestingFarmApiError> {
        let status = response.status();
        tracing::info!(status = status.as_u16(), "Testing Farm response");

        let body = response.text().await?;
        if status != StatusCode::OK {
            tracing::error!(status = status.as_u16(), body = %body, "Testing Farm rejected request");
            return Err(TestingFarmApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}
