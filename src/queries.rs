//! Sample read operations
//!
//! The dashboard's data-fetch layer: each operation is a keyed query on
//! a [`QueryClient`] backed by a [`SampleSource`].
//!
//! - `list_samples`: key `samples` + params, polled on a fixed interval
//! - `get_sample_detail`: key `sample` + id, disabled without an id
//! - `search_by_metadata`: key `search` + key/value, disabled when incomplete

use std::sync::Arc;

use crate::client::{ClientError, SampleSource};
use crate::config::QueryConfig;
use crate::model::{BackendHealth, ListSamplesParams, MetadataSearchParams, Sample};
use crate::query::{QueryClient, QueryKey, QueryOptions, QueryState};

pub const LIST_SAMPLES: &str = "samples";
pub const SAMPLE_DETAIL: &str = "sample";
pub const METADATA_SEARCH: &str = "search";

/// Cache-backed sample queries shared by every view
pub struct SampleQueries {
    source: Arc<dyn SampleSource>,
    samples: QueryClient<Vec<Sample>>,
    detail: QueryClient<Sample>,
    search: QueryClient<Vec<Sample>>,
    config: QueryConfig,
}

impl SampleQueries {
    pub fn new(source: Arc<dyn SampleSource>, config: QueryConfig) -> Self {
        Self {
            source,
            samples: QueryClient::new(),
            detail: QueryClient::new(),
            search: QueryClient::new(),
            config,
        }
    }

    /// List queries poll; between polls the last snapshot is current
    pub fn list_options(&self) -> QueryOptions {
        let interval = self.config.samples_refetch_interval();
        QueryOptions::new()
            .stale_time(interval)
            .refetch_interval(interval)
            .gc_time(self.config.gc_time())
    }

    pub fn detail_options(&self, enabled: bool) -> QueryOptions {
        QueryOptions::new()
            .enabled(enabled)
            .stale_time(self.config.detail_stale_time())
            .gc_time(self.config.gc_time())
    }

    /// List samples; `None` means `skip=0, limit=50`
    pub async fn list_samples(&self, params: Option<ListSamplesParams>) -> QueryState<Vec<Sample>> {
        let params = params.unwrap_or_default();
        let key = QueryKey::new(LIST_SAMPLES, &params);
        let source = Arc::clone(&self.source);

        self.samples
            .query(key, &self.list_options(), move || {
                let source = Arc::clone(&source);
                let params = params.clone();
                async move { source.list_samples(&params).await }
            })
            .await
    }

    /// Fetch one sample; stays pending without issuing a request when
    /// the id is missing or empty
    pub async fn get_sample_detail(&self, sample_id: Option<&str>) -> QueryState<Sample> {
        let sample_id = sample_id.unwrap_or_default().to_string();
        let key = QueryKey::new(SAMPLE_DETAIL, &sample_id);
        let options = self.detail_options(!sample_id.is_empty());
        let source = Arc::clone(&self.source);

        self.detail
            .query(key, &options, move || {
                let source = Arc::clone(&source);
                let sample_id = sample_id.clone();
                async move { source.get_sample(&sample_id).await }
            })
            .await
    }

    /// Search samples by a metadata key/value pair
    pub async fn search_by_metadata(&self, params: MetadataSearchParams) -> QueryState<Vec<Sample>> {
        let key = QueryKey::new(METADATA_SEARCH, &params);
        let options = self.detail_options(params.is_complete());
        let source = Arc::clone(&self.source);

        self.search
            .query(key, &options, move || {
                let source = Arc::clone(&source);
                let params = params.clone();
                async move { source.search_by_metadata(&params).await }
            })
            .await
    }

    /// Backend health, uncached
    pub async fn backend_health(&self) -> Result<BackendHealth, ClientError> {
        self.source.health().await
    }

    /// Stop pollers and drop cached snapshots
    pub async fn shutdown(&self) {
        self.samples.shutdown().await;
        self.detail.shutdown().await;
        self.search.shutdown().await;
    }
}
