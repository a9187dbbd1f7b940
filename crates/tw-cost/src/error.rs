// error.rs — Error types for cost queries.

use thiserror::Error;

/// Errors reported by a [`CostExplorer`](crate::CostExplorer).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CostError {
    /// The cost service rejected or failed the request.
    #[error("cost query failed: {0}")]
    Unavailable(String),

    /// The cost service did not answer within the call timeout.
    #[error("cost query timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The service answered but had nothing usable (e.g. no forecast yet).
    #[error("no {0} data available")]
    NoData(String),

    /// A returned amount was not a finite number.
    #[error("invalid amount {amount} for service '{service}'")]
    InvalidAmount { service: String, amount: f64 },
}
