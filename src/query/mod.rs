//! Query Layer
//!
//! Cache-and-refetch machinery the read operations are built on,
//! independent of any UI runtime.
//!
//! ## Components
//!
//! - **QueryState**: pending / success(data) / error state machine
//! - **QueryKey**: operation name + serialized request parameters
//! - **QueryClient**: keyed cache with shared in-flight fetches and polling
//!
//! ## Lifecycle of a key
//!
//! 1. First observation creates the entry in `Pending` and starts a fetch
//! 2. Concurrent observers of the same key await the same fetch
//! 3. The result replaces the entry's snapshot wholesale
//! 4. Keys with a refetch interval are refetched by a background task
//! 5. Entries nobody observes for `gc_time` are dropped with their poller

mod cache;
mod key;
mod state;

pub use cache::{QueryClient, QueryOptions};
pub use key::QueryKey;
pub use state::{QueryError, QueryState, QueryStatus};
