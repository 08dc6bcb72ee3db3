//! Sample API Client
//!
//! HTTP access to the backend sample API.
//!
//! ## Architecture
//!
//! - **SampleSource**: the read operations the dashboard needs, as a trait
//! - **ApiClient**: reqwest implementation with base URL and `X-API-Key` injection
//!
//! Errors propagate unchanged to the caller; nothing here retries.

mod http;

pub use http::{ApiClient, API_KEY_HEADER};

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{BackendHealth, ListSamplesParams, MetadataSearchParams, Sample};

/// Read operations against the sample API
#[async_trait]
pub trait SampleSource: Send + Sync {
    /// `GET /samples/`
    async fn list_samples(&self, params: &ListSamplesParams) -> Result<Vec<Sample>, ClientError>;

    /// `GET /samples/{sample_id}`
    async fn get_sample(&self, sample_id: &str) -> Result<Sample, ClientError>;

    /// `GET /samples/search/metadata`
    async fn search_by_metadata(
        &self,
        params: &MetadataSearchParams,
    ) -> Result<Vec<Sample>, ClientError>;

    /// `GET /health`
    async fn health(&self) -> Result<BackendHealth, ClientError>;
}

/// Errors that can occur when talking to the sample API
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Sample API unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Status { status: 404, .. })
    }
}
