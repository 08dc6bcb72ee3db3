//! Application State
//!
//! Shared state accessible by all route handlers.

use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::queries::SampleQueries;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Cache-backed sample queries
    pub queries: Arc<SampleQueries>,
    pub config: Arc<Config>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(queries: Arc<SampleQueries>, config: Config) -> Self {
        Self {
            queries,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Seconds between list page reloads
    pub fn list_refresh_secs(&self) -> u64 {
        self.config.query.samples_refetch_secs.max(1)
    }
}
