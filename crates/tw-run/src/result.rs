// result.rs — Run Aggregator.
//
// RunResult is the single record of one governance run. The orchestrator
// feeds it classifications, disposition attempts, the cost report, and any
// stage failure; it owns the counters and the run state.
//
// Counters:
//   checked:    resources classified (zeroed on enumeration failure)
//   warned:     resources in the expiring-soon list
//   terminated: successful dispositions only

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tw_cost::CostReport;
use tw_disposition::{DispositionAttempt, DispositionError, DispositionOutcome};
use tw_lifecycle::{Classified, LifecycleState, ResourceRecord};
use uuid::Uuid;

use crate::error::RunError;
use crate::run_state::{RunStage, RunState};

/// A failure recorded against the stage it happened in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunErrorRecord {
    pub stage: RunStage,
    pub message: String,
}

/// What happened to one expired resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispositionRecord {
    pub resource_id: String,
    pub outcome: DispositionOutcome,
}

/// The outcome of one governance run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub auto_termination: bool,
    pub checked: usize,
    pub warned: usize,
    pub terminated: usize,
    /// Expiring-soon resources in scan order.
    pub expiring_soon: Vec<ResourceRecord>,
    /// Expired resources in scan order.
    pub expired: Vec<ResourceRecord>,
    /// One entry per disposition attempt, in the order of `expired`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dispositions: Vec<DispositionRecord>,
    /// Non-fatal observations (e.g. unsupported resource kinds).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<RunErrorRecord>,
    pub cost_report: Option<CostReport>,
    pub state: RunState,
    /// Every state the run passed through, oldest first.
    pub history: Vec<RunState>,
}

impl RunResult {
    pub fn new(started_at: DateTime<Utc>, auto_termination: bool) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at,
            auto_termination,
            checked: 0,
            warned: 0,
            terminated: 0,
            expiring_soon: Vec::new(),
            expired: Vec::new(),
            dispositions: Vec::new(),
            notes: Vec::new(),
            errors: Vec::new(),
            cost_report: None,
            state: RunState::Start,
            history: vec![RunState::Start],
        }
    }

    /// Move the run to `next`, keeping the history.
    pub fn advance(&mut self, next: RunState) -> Result<(), RunError> {
        self.state.transition(next)?;
        self.history.push(self.state.clone());
        tracing::info!(run_id = %self.run_id, state = %self.state, "run state changed");
        Ok(())
    }

    /// Capture a stage failure: record it and move to ErrorCaptured.
    pub fn capture_error(&mut self, stage: RunStage, reason: impl Into<String>) {
        let reason = reason.into();
        self.record_error(stage, reason.clone());
        if let Err(e) = self.advance(RunState::ErrorCaptured { stage, reason }) {
            tracing::warn!(run_id = %self.run_id, "could not capture error: {}", e);
        }
    }

    /// Record a failure without changing state.
    pub fn record_error(&mut self, stage: RunStage, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(run_id = %self.run_id, stage = %stage, "{}", message);
        self.errors.push(RunErrorRecord { stage, message });
    }

    /// Count one classified resource and file it by state.
    pub fn record_classified(&mut self, classified: &Classified) {
        self.checked += 1;
        let Some(record) = classified.record() else {
            return;
        };
        match classified.state {
            LifecycleState::ExpiringSoon(_) => self.expiring_soon.push(record),
            LifecycleState::Expired(_) => self.expired.push(record),
            LifecycleState::Persistent | LifecycleState::Active => {}
        }
    }

    /// Discard everything the scan produced.
    ///
    /// A partial enumeration is not reported: the run behaves as if nothing
    /// was checked.
    pub fn reset_scan(&mut self) {
        self.checked = 0;
        self.warned = 0;
        self.terminated = 0;
        self.expiring_soon.clear();
        self.expired.clear();
    }

    /// Reduce a batch of disposition attempts into the counters.
    ///
    /// Successes count as terminated, unsupported kinds become notes, and
    /// every other failure is an error of the disposing stage.
    pub fn record_dispositions(&mut self, attempts: Vec<DispositionAttempt>) {
        for attempt in attempts {
            let outcome = DispositionOutcome::from(&attempt.result);
            match &attempt.result {
                Ok(_) => self.terminated += 1,
                Err(e @ DispositionError::Unsupported { .. }) => self.notes.push(e.to_string()),
                Err(e) => self.record_error(RunStage::Disposing, e.to_string()),
            }
            self.dispositions.push(DispositionRecord {
                resource_id: attempt.resource_id,
                outcome,
            });
        }
    }

    /// Disposition outcome for `resource_id`, if one was attempted.
    pub fn disposition_of(&self, resource_id: &str) -> Option<&DispositionOutcome> {
        self.dispositions
            .iter()
            .find(|d| d.resource_id == resource_id)
            .map(|d| &d.outcome)
    }

    /// Whether the resource scan failed.
    pub fn enumeration_failed(&self) -> bool {
        self.errors.iter().any(|e| e.stage == RunStage::Scanning)
    }

    /// One-line summary for logs and terminals.
    pub fn summary_line(&self) -> String {
        let cost = match &self.cost_report {
            Some(report) if !report.is_error() => format!("${:.2}", report.total_cost),
            Some(_) => "error".to_string(),
            None => "n/a".to_string(),
        };
        format!(
            "run {} [{}]: checked={} warned={} terminated={} expired={} errors={} cost={}",
            self.run_id,
            self.state,
            self.checked,
            self.warned,
            self.terminated,
            self.expired.len(),
            self.errors.len(),
            cost
        )
    }
}
