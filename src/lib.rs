//! # NGS Dashboard
//!
//! Read-only dashboard over a genomic sample API: lists de-identified
//! samples and shows, per sequencing run, its metadata and a
//! coverage/quality chart.
//!
//! ## Modules
//!
//! - [`config`]: TOML + environment configuration
//! - [`model`]: Typed API contract (samples, runs, files, results)
//! - [`client`]: HTTP client for the sample API
//! - [`query`]: Keyed query cache with shared fetches and polling
//! - [`queries`]: The dashboard's read operations
//! - [`chart`]: Run quality chart adapter
//! - [`views`]: Server-rendered HTML views
//! - [`web`]: Axum router and server
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ngs_dashboard::{ApiClient, AppState, Config, SampleQueries};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env();
//!     let client = ApiClient::new(config.backend.clone())?;
//!
//!     let queries = Arc::new(SampleQueries::new(Arc::new(client), config.query.clone()));
//!     let first_page = queries.list_samples(None).await;
//!     println!("{} samples", first_page.data().map(|s| s.len()).unwrap_or(0));
//!
//!     let server = config.server.clone();
//!     ngs_dashboard::serve(AppState::new(Arc::clone(&queries), config), &server).await?;
//!     queries.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod chart;
pub mod client;
pub mod config;
pub mod model;
pub mod queries;
pub mod query;
pub mod views;
pub mod web;

pub use chart::{build_quality_chart, ChartOption, ChartOutput};
pub use client::{ApiClient, ClientError, SampleSource, API_KEY_HEADER};
pub use config::{
    BackendConfig, Config, ConfigError, LoggingConfig, QueryConfig, ServerConfig,
};
pub use model::{
    BackendHealth, FileLocation, ListSamplesParams, MetadataSearchParams, PipelineResult, Run,
    RunMetadata, Sample,
};
pub use queries::SampleQueries;
pub use query::{QueryClient, QueryError, QueryKey, QueryOptions, QueryState, QueryStatus};
pub use web::{build_router, serve, AppState, WebError};
