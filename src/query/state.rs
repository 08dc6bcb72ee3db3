//! Query state machine
//!
//! Every cache-backed read surfaces exactly one of three states:
//! pending, success with data, or error.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::client::ClientError;

/// Observable state of a keyed query
#[derive(Debug)]
pub enum QueryState<T> {
    /// Not fetched yet, or disabled
    Pending,
    /// Last fetch succeeded; data is an immutable snapshot
    Success(Arc<T>),
    /// Last fetch failed
    Error(QueryError),
}

// Manual impl: cloning shares the snapshot, T itself need not be Clone
impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        match self {
            QueryState::Pending => QueryState::Pending,
            QueryState::Success(data) => QueryState::Success(Arc::clone(data)),
            QueryState::Error(e) => QueryState::Error(e.clone()),
        }
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        QueryState::Pending
    }
}

impl<T> QueryState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, QueryState::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, QueryState::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QueryState::Error(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&QueryError> {
        match self {
            QueryState::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn status(&self) -> QueryStatus {
        match self {
            QueryState::Pending => QueryStatus::Pending,
            QueryState::Success(_) => QueryStatus::Success,
            QueryState::Error(_) => QueryStatus::Error,
        }
    }
}

impl<T, E> From<Result<T, E>> for QueryState<T>
where
    E: Into<QueryError>,
{
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => QueryState::Success(Arc::new(data)),
            Err(e) => QueryState::Error(e.into()),
        }
    }
}

/// State discriminant, for logs and JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Pending,
    Success,
    Error,
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryStatus::Pending => write!(f, "pending"),
            QueryStatus::Success => write!(f, "success"),
            QueryStatus::Error => write!(f, "error"),
        }
    }
}

/// The one error kind the fetch layer surfaces.
///
/// Network failures, error statuses and undecodable bodies all collapse
/// into this; only the message survives for logging.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct QueryError {
    message: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ClientError> for QueryError {
    fn from(e: ClientError) -> Self {
        Self::new(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_pending() {
        let state: QueryState<Vec<u8>> = QueryState::default();
        assert!(state.is_pending());
        assert!(state.data().is_none());
        assert_eq!(state.status(), QueryStatus::Pending);
    }

    #[test]
    fn test_from_result() {
        let ok: QueryState<u32> = Ok::<_, ClientError>(7).into();
        assert_eq!(ok.data(), Some(&7));

        let err: QueryState<u32> = Err::<u32, _>(ClientError::Status {
            status: 404,
            message: "Sample X not found".to_string(),
        })
        .into();
        assert!(err.is_error());
        assert_eq!(err.error().unwrap().message(), "API error 404: Sample X not found");
    }

    #[test]
    fn test_clone_shares_snapshot() {
        let state = QueryState::Success(Arc::new(vec![1, 2, 3]));
        let copy = state.clone();
        match (&state, &copy) {
            (QueryState::Success(a), QueryState::Success(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("expected success"),
        }
    }
}
