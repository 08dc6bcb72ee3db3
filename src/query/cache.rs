//! Request-keyed query cache
//!
//! Holds the latest snapshot per `QueryKey`, shares one in-flight fetch
//! between every caller asking for the same key, and runs interval
//! refetches for keys that ask for polling.

use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{QueryError, QueryKey, QueryState};
use crate::client::ClientError;

/// Per-query behaviour
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Disabled queries never fetch and stay pending
    pub enabled: bool,
    /// How long a successful result is served without refetching
    pub stale_time: Duration,
    /// Refetch on this interval regardless of staleness
    pub refetch_interval: Option<Duration>,
    /// Drop entries (and their pollers) nobody observed for this long
    pub gc_time: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            stale_time: Duration::ZERO,
            refetch_interval: None,
            gc_time: Duration::from_secs(300),
        }
    }
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn refetch_interval(mut self, interval: Duration) -> Self {
        self.refetch_interval = Some(interval);
        self
    }

    pub fn gc_time(mut self, gc_time: Duration) -> Self {
        self.gc_time = gc_time;
        self
    }
}

type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, ClientError>> + Send + Sync>;
type SharedFetch<T> = Shared<BoxFuture<'static, QueryState<T>>>;

struct Entry<T> {
    state: QueryState<T>,
    fetched_at: Option<Instant>,
    last_observed: Instant,
    in_flight: Option<SharedFetch<T>>,
    poller: Option<JoinHandle<()>>,
}

impl<T> Entry<T> {
    fn new() -> Self {
        Self {
            state: QueryState::Pending,
            fetched_at: None,
            last_observed: Instant::now(),
            in_flight: None,
            poller: None,
        }
    }

    fn is_fresh(&self, stale_time: Duration) -> bool {
        self.state.is_success()
            && self
                .fetched_at
                .map(|at| at.elapsed() < stale_time)
                .unwrap_or(false)
    }

    fn is_idle(&self, gc_time: Duration) -> bool {
        self.in_flight.is_none() && self.last_observed.elapsed() >= gc_time
    }
}

impl<T> Drop for Entry<T> {
    fn drop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }
}

struct Inner<T> {
    entries: RwLock<HashMap<QueryKey, Entry<T>>>,
}

/// Keyed cache of query results with de-duplicated fetches and polling
pub struct QueryClient<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for QueryClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + Sync + 'static> Default for QueryClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> QueryClient<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Observe a query: serve it from cache while fresh, otherwise fetch
    /// (joining an in-flight fetch for the same key) and return the result.
    ///
    /// The first observation of a key with `refetch_interval` set starts
    /// its poller.
    pub async fn query<F, Fut>(&self, key: QueryKey, options: &QueryOptions, fetcher: F) -> QueryState<T>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        if !options.enabled {
            tracing::trace!(key = %key, "Query disabled");
            return QueryState::Pending;
        }

        let fetcher: Fetcher<T> = Arc::new(move || fetcher().boxed());

        {
            let mut entries = self.inner.entries.write().await;
            entries.retain(|k, e| k == &key || e.poller.is_some() || !e.is_idle(options.gc_time));

            let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
            entry.last_observed = Instant::now();

            if let Some(interval) = options.refetch_interval {
                if entry.poller.is_none() {
                    entry.poller = Some(Inner::spawn_poller(
                        Arc::downgrade(&self.inner),
                        key.clone(),
                        interval,
                        options.gc_time,
                        Arc::clone(&fetcher),
                    ));
                }
            }

            if entry.is_fresh(options.stale_time) {
                tracing::trace!(key = %key, "Query cache hit");
                return entry.state.clone();
            }
        }

        tracing::trace!(key = %key, "Query cache miss");
        Inner::fetch(&self.inner, &key, &fetcher).await
    }

    /// Current state of a key without fetching
    pub async fn peek(&self, key: &QueryKey) -> QueryState<T> {
        self.inner
            .entries
            .read()
            .await
            .get(key)
            .map(|e| e.state.clone())
            .unwrap_or_default()
    }

    /// Mark a key stale so the next observation refetches
    pub async fn invalidate(&self, key: &QueryKey) {
        if let Some(entry) = self.inner.entries.write().await.get_mut(key) {
            entry.fetched_at = None;
        }
    }

    /// Number of cached keys
    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Stop every poller and drop all cached state
    pub async fn shutdown(&self) {
        let mut entries = self.inner.entries.write().await;
        let pollers = entries.values().filter(|e| e.poller.is_some()).count();
        entries.clear();
        tracing::debug!(pollers, "Query cache shut down");
    }
}

impl<T: Send + Sync + 'static> Inner<T> {
    /// Join or start the fetch for a key.
    ///
    /// The fetch runs on its own task so it completes and lands in the
    /// cache even if every caller stops waiting.
    async fn fetch(this: &Arc<Self>, key: &QueryKey, fetcher: &Fetcher<T>) -> QueryState<T> {
        let shared = {
            let mut entries = this.entries.write().await;
            let entry = entries.entry(key.clone()).or_insert_with(Entry::new);

            match &entry.in_flight {
                Some(in_flight) => {
                    tracing::trace!(key = %key, "Joining in-flight fetch");
                    in_flight.clone()
                }
                None => {
                    let request = fetcher();
                    let weak = Arc::downgrade(this);
                    let task_key = key.clone();

                    let handle = tokio::spawn(async move {
                        let state = match request.await {
                            Ok(data) => QueryState::Success(Arc::new(data)),
                            Err(e) => {
                                tracing::debug!(key = %task_key, error = %e, "Query fetch failed");
                                QueryState::Error(QueryError::from(e))
                            }
                        };
                        if let Some(inner) = weak.upgrade() {
                            inner.complete(&task_key, state.clone()).await;
                        }
                        state
                    });

                    let shared = async move {
                        handle.await.unwrap_or_else(|e| {
                            QueryState::Error(QueryError::new(format!("fetch task failed: {}", e)))
                        })
                    }
                    .boxed()
                    .shared();

                    entry.in_flight = Some(shared.clone());
                    shared
                }
            }
        };

        shared.await
    }

    /// Store a finished fetch, replacing the previous snapshot wholesale
    async fn complete(&self, key: &QueryKey, state: QueryState<T>) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(key) {
            entry.state = state;
            entry.fetched_at = Some(Instant::now());
            entry.in_flight = None;
        }
    }

    fn spawn_poller(
        weak: Weak<Self>,
        key: QueryKey,
        interval: Duration,
        gc_time: Duration,
        fetcher: Fetcher<T>,
    ) -> JoinHandle<()> {
        tracing::debug!(key = %key, interval_ms = interval.as_millis() as u64, "Starting query poller");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);

            // Skip the first immediate tick
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let Some(inner) = weak.upgrade() else {
                    break;
                };

                if inner.evict_if_idle(&key, gc_time).await {
                    tracing::debug!(key = %key, "Query unobserved, stopping poller");
                    break;
                }

                if let QueryState::Error(e) = Inner::fetch(&inner, &key, &fetcher).await {
                    tracing::warn!(key = %key, error = %e, "Scheduled refetch failed");
                }
            }
        })
    }

    /// Remove a key nobody observed within `gc_time`
    async fn evict_if_idle(&self, key: &QueryKey, gc_time: Duration) -> bool {
        let mut entries = self.entries.write().await;
        let idle = entries.get(key).map(|e| e.is_idle(gc_time)).unwrap_or(true);
        if idle {
            if let Some(mut entry) = entries.remove(key) {
                // Called from the poller itself; let it finish on its own
                entry.poller.take();
            }
        }
        idle
    }
}
