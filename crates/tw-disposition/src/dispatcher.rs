// dispatcher.rs — Per-resource-kind termination dispatch.
//
// `Dispatcher::dispose()` parses the identifier once and matches on the
// closed ServiceKind set:
//
//   ComputeInstance  → terminate_instance            (no wait)
//   Database         → delete_db_instance            (no final snapshot)
//   ContainerService → scale_service(0) → delete_service
//   CacheCluster     → delete_cache_cluster
//   Unsupported      → untouched, reported as a note
//
// The container-service order is fixed: the platform refuses to delete a
// service whose desired count is non-zero, so a failed scale-down stops the
// sequence before the delete is attempted.
//
// Skipping the database's final snapshot is a fixed policy. Expired
// resources are temporary by declaration; there is no per-call override.

use serde::{Deserialize, Serialize};
use tw_lifecycle::{ResourceId, ResourceRecord, ServiceKind};

use crate::actions::ResourceActions;
use crate::error::{ActionError, DispositionError};

/// Databases are always deleted without a final snapshot.
const SKIP_FINAL_SNAPSHOT: bool = true;

/// A successfully disposed resource and the calls that did it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disposed {
    pub resource_id: String,
    pub kind: ServiceKind,
    /// Action names in the order they were issued.
    pub actions: Vec<String>,
}

/// The result of disposing one resource in a batch.
#[derive(Debug, Clone)]
pub struct DispositionAttempt {
    pub resource_id: String,
    pub result: Result<Disposed, DispositionError>,
}

/// Serializable form of a [`DispositionAttempt`] for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispositionOutcome {
    Disposed { kind: ServiceKind, actions: Vec<String> },
    /// Left untouched (unsupported kind). Not a failure.
    Skipped { reason: String },
    Failed { reason: String },
}

impl From<&Result<Disposed, DispositionError>> for DispositionOutcome {
    fn from(result: &Result<Disposed, DispositionError>) -> Self {
        match result {
            Ok(disposed) => DispositionOutcome::Disposed {
                kind: disposed.kind.clone(),
                actions: disposed.actions.clone(),
            },
            Err(e) if !e.is_hard_failure() => DispositionOutcome::Skipped {
                reason: e.to_string(),
            },
            Err(e) => DispositionOutcome::Failed {
                reason: e.to_string(),
            },
        }
    }
}

/// Routes expired resources to the matching termination calls.
pub struct Dispatcher {
    actions: Box<dyn ResourceActions>,
}

impl Dispatcher {
    pub fn new(actions: Box<dyn ResourceActions>) -> Self {
        Self { actions }
    }

    /// Name of the underlying action backend.
    pub fn backend(&self) -> &str {
        self.actions.name()
    }

    /// Dispose of one resource.
    ///
    /// Never panics and never touches an unsupported kind. The caller decides
    /// whether disposition is allowed at all (auto-termination policy).
    pub fn dispose(&self, resource_id: &str) -> Result<Disposed, DispositionError> {
        let id = ResourceId::parse(resource_id)?;
        tracing::info!(resource = %id, kind = id.kind.kind_name(), "attempting termination");

        let region = id.region.as_str();
        let mut issued = Vec::new();

        match &id.kind {
            ServiceKind::ComputeInstance { instance_id } => {
                self.call(&id, &mut issued, "terminate_instance", || {
                    self.actions.terminate_instance(region, instance_id)
                })?;
            }
            ServiceKind::Database { db_identifier } => {
                self.call(&id, &mut issued, "delete_db_instance", || {
                    self.actions
                        .delete_db_instance(region, db_identifier, SKIP_FINAL_SNAPSHOT)
                })?;
            }
            ServiceKind::ContainerService { cluster, service } => {
                self.call(&id, &mut issued, "scale_service", || {
                    self.actions.scale_service(region, cluster, service, 0)
                })?;
                self.call(&id, &mut issued, "delete_service", || {
                    self.actions.delete_service(region, cluster, service)
                })?;
            }
            ServiceKind::CacheCluster { cluster_id } => {
                self.call(&id, &mut issued, "delete_cache_cluster", || {
                    self.actions.delete_cache_cluster(region, cluster_id)
                })?;
            }
            ServiceKind::Unsupported {
                service,
                resource_type,
            } => {
                tracing::warn!(resource = %id, "unsupported resource type for termination");
                return Err(DispositionError::Unsupported {
                    resource_id: id.raw.clone(),
                    service: service.clone(),
                    resource_type: resource_type.clone(),
                });
            }
        }

        tracing::info!(resource = %id, "terminated {}", id.kind);
        Ok(Disposed {
            resource_id: id.raw,
            kind: id.kind,
            actions: issued,
        })
    }

    /// Dispose of every record, in order, isolating failures.
    ///
    /// The returned attempts are in the same order as `records`.
    pub fn dispose_batch(&self, records: &[ResourceRecord]) -> Vec<DispositionAttempt> {
        records
            .iter()
            .map(|record| {
                let result = self.dispose(&record.resource_id);
                if let Err(e) = &result {
                    if e.is_hard_failure() {
                        tracing::warn!(resource = %record.resource_id, "failed to terminate: {}", e);
                    }
                }
                DispositionAttempt {
                    resource_id: record.resource_id.clone(),
                    result,
                }
            })
            .collect()
    }

    fn call(
        &self,
        id: &ResourceId,
        issued: &mut Vec<String>,
        action: &str,
        f: impl FnOnce() -> Result<(), ActionError>,
    ) -> Result<(), DispositionError> {
        f().map_err(|source| DispositionError::ActionFailed {
            resource_id: id.raw.clone(),
            source,
        })?;
        issued.push(action.to_string());
        Ok(())
    }
}
