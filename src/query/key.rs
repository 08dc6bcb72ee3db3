//! Query keys: operation name plus canonical request parameters

use serde::Serialize;
use std::fmt;

/// Identifies one cached request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    operation: &'static str,
    params: String,
}

impl QueryKey {
    /// Key for an operation and its serialized parameters
    pub fn new<P: Serialize + ?Sized>(operation: &'static str, params: &P) -> Self {
        // Value's Display is compact JSON; struct fields keep declaration order
        let params = serde_json::to_value(params)
            .map(|v| v.to_string())
            .unwrap_or_default();
        Self { operation, params }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn params(&self) -> &str {
        &self.params
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operation, self.params)
    }
}
