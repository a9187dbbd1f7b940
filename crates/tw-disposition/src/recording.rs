// recording.rs — Action backend that records instead of deleting.
//
// RecordingActions never calls a provider. Every call is appended to an
// in-memory journal and, when a path is configured, to a JSONL file (one
// call per line). It is the dry-run backend for the CLI and the test double
// that lets tests check which calls were issued, and in which order.
//
// Specific calls can be primed to fail so batch fault isolation can be
// exercised without a real provider.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::actions::ResourceActions;
use crate::error::ActionError;

/// One issued action, as recorded in the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCall {
    /// Action name, e.g. `scale_service`.
    pub action: String,
    pub region: String,
    /// What the call targets, e.g. `main/api` or `i-0abc`.
    pub target: String,
    /// Extra call arguments, e.g. `desired_count=0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub succeeded: bool,
    pub timestamp: DateTime<Utc>,
}

/// Dry-run / test action backend.
///
/// Cloning shares the journal, so a test can keep a handle while the
/// dispatcher owns the boxed backend.
#[derive(Debug, Clone, Default)]
pub struct RecordingActions {
    journal: Arc<Mutex<Vec<ActionCall>>>,
    failures: Arc<HashMap<(String, String), String>>,
    log_path: Option<PathBuf>,
}

impl RecordingActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also append each call to a JSONL file.
    pub fn with_log(mut self, path: impl AsRef<Path>) -> Self {
        self.log_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Make `action` on `target` fail with `message`.
    ///
    /// Must be called before the backend is shared.
    pub fn fail_on(mut self, action: &str, target: &str, message: &str) -> Self {
        Arc::make_mut(&mut self.failures).insert(
            (action.to_string(), target.to_string()),
            message.to_string(),
        );
        self
    }

    /// Snapshot of every call issued so far, oldest first.
    pub fn calls(&self) -> Vec<ActionCall> {
        self.lock().clone()
    }

    /// Action names of every call issued so far (handy for ordering checks).
    pub fn action_names(&self) -> Vec<String> {
        self.lock().iter().map(|c| c.action.clone()).collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ActionCall>> {
        // A panic while holding the lock leaves the journal readable.
        self.journal.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(
        &self,
        action: &str,
        region: &str,
        target: String,
        detail: Option<String>,
    ) -> Result<(), ActionError> {
        let failure = self
            .failures
            .get(&(action.to_string(), target.clone()))
            .cloned();

        let call = ActionCall {
            action: action.to_string(),
            region: region.to_string(),
            target: target.clone(),
            detail,
            succeeded: failure.is_none(),
            timestamp: Utc::now(),
        };
        tracing::info!(action, region, target = %target, succeeded = call.succeeded, "recorded action");

        self.append_to_log(&call)?;
        self.lock().push(call);

        match failure {
            Some(message) => Err(ActionError::Rejected {
                action: action.to_string(),
                target,
                message,
            }),
            None => Ok(()),
        }
    }

    fn append_to_log(&self, call: &ActionCall) -> Result<(), ActionError> {
        let Some(path) = &self.log_path else {
            return Ok(());
        };
        let unavailable =
            |e: std::io::Error| ActionError::Unavailable(format!("{}: {}", path.display(), e));

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(unavailable)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(unavailable)?;
        let json = serde_json::to_string(call)
            .map_err(|e| ActionError::Unavailable(format!("serialize action: {}", e)))?;
        writeln!(file, "{}", json).map_err(unavailable)?;
        Ok(())
    }
}

impl ResourceActions for RecordingActions {
    fn terminate_instance(&self, region: &str, instance_id: &str) -> Result<(), ActionError> {
        self.record("terminate_instance", region, instance_id.to_string(), None)
    }

    fn delete_db_instance(
        &self,
        region: &str,
        db_identifier: &str,
        skip_final_snapshot: bool,
    ) -> Result<(), ActionError> {
        self.record(
            "delete_db_instance",
            region,
            db_identifier.to_string(),
            Some(format!("skip_final_snapshot={}", skip_final_snapshot)),
        )
    }

    fn scale_service(
        &self,
        region: &str,
        cluster: &str,
        service: &str,
        desired_count: u32,
    ) -> Result<(), ActionError> {
        self.record(
            "scale_service",
            region,
            format!("{}/{}", cluster, service),
            Some(format!("desired_count={}", desired_count)),
        )
    }

    fn delete_service(&self, region: &str, cluster: &str, service: &str) -> Result<(), ActionError> {
        self.record("delete_service", region, format!("{}/{}", cluster, service), None)
    }

    fn delete_cache_cluster(&self, region: &str, cluster_id: &str) -> Result<(), ActionError> {
        self.record("delete_cache_cluster", region, cluster_id.to_string(), None)
    }

    fn name(&self) -> &str {
        "recording"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn clones_share_the_journal() {
        let actions = RecordingActions::new();
        let handle = actions.clone();
        actions.terminate_instance("us-east-1", "i-1").unwrap();
        assert_eq!(handle.action_names(), vec!["terminate_instance"]);
    }

    #[test]
    fn primed_failure_is_recorded_and_returned() {
        let actions = RecordingActions::new().fail_on("delete_cache_cluster", "c-1", "not found");
        let err = actions.delete_cache_cluster("us-east-1", "c-1").unwrap_err();
        assert!(matches!(err, ActionError::Rejected { .. }));
        let calls = actions.calls();
        assert_eq!(calls.len(), 1);
        assert!(!calls[0].succeeded);
    }

    #[test]
    fn writes_jsonl_log() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("actions.jsonl");
        let actions = RecordingActions::new().with_log(&path);

        actions.scale_service("eu-west-1", "main", "api", 0).unwrap();
        actions.delete_service("eu-west-1", "main", "api").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: ActionCall = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.action, "scale_service");
        assert_eq!(first.detail.as_deref(), Some("desired_count=0"));
    }
}
