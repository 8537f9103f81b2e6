//! HTTP client for the Analytics Reporting API
//!
//! [`ReportSource`] abstracts where report pages come from so the export
//! pipeline can be driven by mocks in tests. [`AnalyticsClient`] is the
//! production implementation, speaking JSON over HTTPS to the v4 `batchGet`
//! endpoint.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Result, SourceError};

use super::request::ReportQuery;
use super::response::{GetReportsResponse, ReportPage};

/// Production `batchGet` endpoint.
pub const REPORTING_ENDPOINT: &str =
    "https://analyticsreporting.googleapis.com/v4/reports:batchGet";

/// Source of report pages.
#[async_trait]
pub trait ReportSource: Send {
    /// Fetch the page the query's current token points at.
    ///
    /// # Arguments
    /// * `query` - Query to send, including its pagination cursor
    ///
    /// # Returns
    /// * `Result<ReportPage>` - Decoded page or error
    async fn fetch_page(&mut self, query: &ReportQuery) -> Result<ReportPage>;

    /// Total number of rows the query matches.
    ///
    /// The default implementation issues a regular page fetch and reads the
    /// count from it; the fetched rows are discarded.
    async fn total(&mut self, query: &ReportQuery) -> Result<u64> {
        Ok(self.fetch_page(query).await?.row_count)
    }
}

/// Client for the Analytics Reporting API v4.
pub struct AnalyticsClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl AnalyticsClient {
    /// Create a client from a ready bearer token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: REPORTING_ENDPOINT.to_string(),
            token: token.into(),
        }
    }

    /// Create a client reading the bearer token from a file.
    ///
    /// The file holds a ready OAuth2 access token; surrounding whitespace is
    /// ignored. Obtaining the token is the operator's job.
    ///
    /// # Arguments
    /// * `path` - Token file path
    ///
    /// # Returns
    /// * `Result<Self>` - Client, or error when the file is missing or empty
    pub fn from_credentials(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| SourceError::Credentials {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;

        let token = raw.trim();
        if token.is_empty() {
            return Err(SourceError::Credentials {
                path: path.display().to_string(),
                detail: "token file is empty".to_string(),
            }
            .into());
        }

        Ok(Self::new(token))
    }

    /// Point the client at a different endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl ReportSource for AnalyticsClient {
    async fn fetch_page(&mut self, query: &ReportQuery) -> Result<ReportPage> {
        debug!("Requesting page with token {:?}", query.page_token());

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&query.to_request_body())
            .send()
            .await
            .map_err(|e| SourceError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::ApiStatus {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let decoded: GetReportsResponse = response
            .json()
            .await
            .map_err(|e| SourceError::DecodeFailed(e.to_string()))?;

        ReportPage::from_response(decoded)
    }
}
