//! HTTP client for the Dreamer's Land info backend.
//!
//! The backend exposes a single unauthenticated endpoint, `GET /api/info`,
//! returning the `ProfileSnapshot` document.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::debug;

use crate::models::ProfileSnapshot;

use super::{ApiError, InfoSource};

// ============================================================================
// Constants
// ============================================================================

/// Backend used when nothing else is configured
pub const DEFAULT_BACKEND_URL: &str = "https://janvi.jarvibeta.xyz";

/// HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const INFO_PATH: &str = "/api/info";

const USER_AGENT: &str = concat!("dreamer-info/", env!("CARGO_PKG_VERSION"));

/// API client for the info backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client with the given request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn info_url(&self) -> String {
        format!("{}{}", self.base_url, INFO_PATH)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Fetch and parse the info document.
    pub async fn fetch_info(&self) -> Result<ProfileSnapshot, ApiError> {
        let url = self.info_url();
        debug!(url = %url, "Fetching info document");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let body = response.text().await?;

        ProfileSnapshot::from_json(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl InfoSource for ApiClient {
    async fn fetch_info(&self) -> Result<ProfileSnapshot, ApiError> {
        ApiClient::fetch_info(self).await
    }
}
