// run_state.rs — Governance run state machine.
//
// A run walks a fixed sequence of stages:
//   Start → Scanning → Classified → Disposing → Reporting → Summarized
//
// ErrorCaptured is a side-transition reachable from any non-terminal state.
// It only short-circuits the stage that failed: from ErrorCaptured the run
// may resume at any later stage (e.g. a failed scan skips straight to
// Reporting, because cost reporting does not depend on the scan).
// Summarized is terminal and is always reached.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RunError;

/// Position of a state in the stage sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    Start,
    Scanning,
    Classified,
    Disposing,
    Reporting,
    Summarized,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStage::Start => "start",
            RunStage::Scanning => "scanning",
            RunStage::Classified => "classified",
            RunStage::Disposing => "disposing",
            RunStage::Reporting => "reporting",
            RunStage::Summarized => "summarized",
        };
        write!(f, "{}", name)
    }
}

/// The lifecycle state of one governance run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    Start,
    Scanning,
    Classified,
    Disposing,
    Reporting,
    Summarized,
    /// A stage failed; remaining work in that stage was skipped.
    ErrorCaptured { stage: RunStage, reason: String },
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::ErrorCaptured { stage, .. } => write!(f, "error_captured({})", stage),
            other => write!(f, "{}", other.stage()),
        }
    }
}

impl RunState {
    /// The stage this state belongs to. ErrorCaptured belongs to the stage
    /// that failed.
    pub fn stage(&self) -> RunStage {
        match self {
            RunState::Start => RunStage::Start,
            RunState::Scanning => RunStage::Scanning,
            RunState::Classified => RunStage::Classified,
            RunState::Disposing => RunStage::Disposing,
            RunState::Reporting => RunStage::Reporting,
            RunState::Summarized => RunStage::Summarized,
            RunState::ErrorCaptured { stage, .. } => *stage,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Summarized)
    }

    /// Check whether transitioning from this state to `next` is valid.
    pub fn can_transition_to(&self, next: &RunState) -> bool {
        if self.is_terminal() {
            return false;
        }

        match (self, next) {
            // Capturing an error in the current stage, or a later one.
            (_, RunState::ErrorCaptured { stage, .. }) => *stage >= self.stage(),
            // After an error, resume at any later stage.
            (RunState::ErrorCaptured { stage, .. }, next) => next.stage() > *stage,
            _ => matches!(
                (self, next),
                (RunState::Start, RunState::Scanning)
                    | (RunState::Scanning, RunState::Classified)
                    | (RunState::Classified, RunState::Disposing)
                    | (RunState::Disposing, RunState::Reporting)
                    | (RunState::Reporting, RunState::Summarized)
            ),
        }
    }

    /// Transition in place, or report why not.
    pub fn transition(&mut self, next: RunState) -> Result<(), RunError> {
        if !self.can_transition_to(&next) {
            return Err(RunError::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            });
        }
        *self = next;
        Ok(())
    }
}
