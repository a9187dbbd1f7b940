//! # tw-run
//!
//! Governance run orchestration for Tagwarden.
//!
//! A [`GovernanceRun`] ties the other crates together: it pages through the
//! tag source, classifies every resource, disposes of (or alerts about)
//! expired ones, builds the cost report, and emits notifications. The
//! outcome is a single [`RunResult`].
//!
//! ## Key components
//!
//! - [`GovernanceConfig`] — immutable run configuration (TOML + overrides)
//! - [`RunState`] — the run's state machine with error capture
//! - [`RunResult`] — the Run Aggregator: counters, lists, errors, cost report
//! - [`SummaryEmitter`] — renders warnings, alerts and the weekly summary
//! - [`EventDispatcher`] / [`NotificationSink`] — pluggable delivery
//!
//! ## Key invariants
//!
//! - **Fail soft**: `execute` always returns a result and always reaches
//!   `Summarized`. Failures are recorded, never raised.
//! - **All or nothing scan**: a failed page discards the whole scan.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod run;
pub mod run_state;
pub mod summary;
pub mod webhook;

pub use config::GovernanceConfig;
pub use error::{ConfigError, NotifyError, RunError};
pub use events::{EventDispatcher, GovernanceEvent, LogSink, Notice, NotificationSink, SinkFailure};
pub use result::{DispositionRecord, RunErrorRecord, RunResult};
pub use run::GovernanceRun;
pub use run_state::{RunStage, RunState};
pub use summary::SummaryEmitter;
pub use webhook::WebhookSink;
