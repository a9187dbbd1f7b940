// error.rs — Error types for the lifecycle subsystem.

use thiserror::Error;

/// Errors that can occur while interpreting resource identifiers.
///
/// Classification itself never fails: ambiguous tag data always resolves to
/// a safe default. Only identifier parsing can reject its input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// The identifier does not have the expected structural segments.
    #[error("malformed resource identifier '{identifier}': {reason}")]
    MalformedIdentifier { identifier: String, reason: String },
}

/// Errors reported by a [`TagSource`](crate::source::TagSource) while
/// enumerating tagged resources.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The enumeration service rejected or failed the request.
    #[error("tag enumeration failed: {0}")]
    Unavailable(String),

    /// The enumeration service did not answer within the call timeout.
    #[error("tag enumeration timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// A page token was not recognised (the sequence cannot be resumed).
    #[error("invalid page token '{0}'")]
    InvalidToken(String),
}
