// events.rs — Governance events and notification dispatch.
//
// A run emits at most three events: an expiration warning, an expired-
// resource alert (manual path only), and either the weekly summary or a
// run-failed notice. Each event carries its structured payload plus the
// rendered `Notice`, so sinks that only deliver text (webhook, mail relay)
// need no rendering logic of their own.
//
// Sinks are fire-and-forget from the run's point of view: the dispatcher
// returns sink failures so the run can record them, but never stops.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tw_lifecycle::ResourceRecord;
use uuid::Uuid;

use crate::error::NotifyError;
use crate::run_state::RunStage;

/// Human-readable rendering of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub subject: String,
    pub body: String,
}

/// Events emitted by a governance run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GovernanceEvent {
    /// Resources entered the warning window.
    ExpirationWarning {
        run_id: Uuid,
        resources: Vec<ResourceRecord>,
        notice: Notice,
        timestamp: DateTime<Utc>,
    },

    /// Resources expired and auto-termination is off.
    ExpirationAlert {
        run_id: Uuid,
        resources: Vec<ResourceRecord>,
        notice: Notice,
        timestamp: DateTime<Utc>,
    },

    /// End-of-run summary.
    WeeklySummary {
        run_id: Uuid,
        checked: usize,
        warned: usize,
        terminated: usize,
        total_cost: Option<f64>,
        notice: Notice,
        timestamp: DateTime<Utc>,
    },

    /// The run could not enumerate resources.
    RunFailed {
        run_id: Uuid,
        stage: RunStage,
        reason: String,
        notice: Notice,
        timestamp: DateTime<Utc>,
    },
}

impl GovernanceEvent {
    pub fn event_type(&self) -> &str {
        match self {
            GovernanceEvent::ExpirationWarning { .. } => "expiration_warning",
            GovernanceEvent::ExpirationAlert { .. } => "expiration_alert",
            GovernanceEvent::WeeklySummary { .. } => "weekly_summary",
            GovernanceEvent::RunFailed { .. } => "run_failed",
        }
    }

    pub fn notice(&self) -> &Notice {
        match self {
            GovernanceEvent::ExpirationWarning { notice, .. }
            | GovernanceEvent::ExpirationAlert { notice, .. }
            | GovernanceEvent::WeeklySummary { notice, .. }
            | GovernanceEvent::RunFailed { notice, .. } => notice,
        }
    }

    pub fn run_id(&self) -> Uuid {
        match self {
            GovernanceEvent::ExpirationWarning { run_id, .. }
            | GovernanceEvent::ExpirationAlert { run_id, .. }
            | GovernanceEvent::WeeklySummary { run_id, .. }
            | GovernanceEvent::RunFailed { run_id, .. } => *run_id,
        }
    }
}

/// Receives governance events.
///
/// Implementations must bound their own delivery time; a slow sink delays
/// the rest of the run.
pub trait NotificationSink: Send {
    /// Deliver one event. Errors are recorded but don't stop the run.
    fn send(&self, event: &GovernanceEvent) -> Result<(), NotifyError>;

    /// Sink display name (for logs and error records).
    fn name(&self) -> &str;
}

/// Appends events as JSONL to a file.
pub struct LogSink {
    path: PathBuf,
}

impl LogSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl NotificationSink for LogSink {
    fn send(&self, event: &GovernanceEvent) -> Result<(), NotifyError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| NotifyError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| NotifyError::Io {
                path: self.path.display().to_string(),
                source,
            })?;

        let json = serde_json::to_string(event)?;
        writeln!(file, "{}", json).map_err(|source| NotifyError::Io {
            path: self.path.display().to_string(),
            source,
        })?;

        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// A sink failure, as returned by [`EventDispatcher::dispatch`].
#[derive(Debug)]
pub struct SinkFailure {
    pub sink: String,
    pub error: NotifyError,
}

/// Fans events out to every registered sink.
///
/// A failing sink does not prevent the others from receiving the event.
pub struct EventDispatcher {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.sinks.push(sink);
    }

    /// Builder form of [`add_sink`](Self::add_sink).
    pub fn with_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.add_sink(sink);
        self
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Send `event` to all sinks and return the ones that failed.
    pub fn dispatch(&self, event: &GovernanceEvent) -> Vec<SinkFailure> {
        let mut failures = Vec::new();
        for sink in &self.sinks {
            match sink.send(event) {
                Ok(()) => {
                    tracing::debug!(sink = sink.name(), event = event.event_type(), "event delivered");
                }
                Err(error) => {
                    tracing::warn!(
                        sink = sink.name(),
                        event = event.event_type(),
                        "notification sink error: {}",
                        error
                    );
                    failures.push(SinkFailure {
                        sink: sink.name().to_string(),
                        error,
                    });
                }
            }
        }
        failures
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
