// error.rs — Error types for the disposition subsystem.

use thiserror::Error;
use tw_lifecycle::LifecycleError;

/// A failure reported by a [`ResourceActions`](crate::ResourceActions) backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    /// The provider rejected the call (not found, wrong state, permissions…).
    #[error("{action} rejected for '{target}': {message}")]
    Rejected {
        action: String,
        target: String,
        message: String,
    },

    /// The call did not complete within the per-call timeout.
    #[error("{action} timed out after {seconds}s")]
    Timeout { action: String, seconds: u64 },

    /// The backend itself is unusable (credentials, network, local I/O).
    #[error("action backend unavailable: {0}")]
    Unavailable(String),
}

/// Why a single resource was not disposed of.
///
/// Only [`Unsupported`](DispositionError::Unsupported) is a soft outcome;
/// see [`is_hard_failure`](DispositionError::is_hard_failure).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispositionError {
    /// The identifier could not be parsed.
    #[error(transparent)]
    MalformedIdentifier(#[from] LifecycleError),

    /// The resource kind has no termination path. Left untouched.
    #[error("unsupported resource type for termination: {service}:{resource_type} ({resource_id})")]
    Unsupported {
        resource_id: String,
        service: String,
        resource_type: String,
    },

    /// A termination call failed.
    #[error("failed to dispose of {resource_id}: {source}")]
    ActionFailed {
        resource_id: String,
        source: ActionError,
    },
}

impl DispositionError {
    /// Unsupported kinds are a note, not a failure.
    pub fn is_hard_failure(&self) -> bool {
        !matches!(self, DispositionError::Unsupported { .. })
    }
}
