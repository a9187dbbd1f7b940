// error.rs — Error types for configuration, notification, and run control.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building a [`GovernanceConfig`](crate::GovernanceConfig).
///
/// These are the only errors that stop the process: they happen at startup,
/// before any run begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// An option has a value of the wrong shape.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Errors from a [`NotificationSink`](crate::NotificationSink). Never fatal.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Writing to a local sink failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The event could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The transport failed before getting an answer (connect, timeout, TLS).
    #[error("notification transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status.
    #[error("notification endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Errors in run state handling.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RunError {
    /// Invalid state transition.
    #[error("invalid run transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}
