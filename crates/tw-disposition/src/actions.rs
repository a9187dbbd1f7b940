// actions.rs — The termination call surface.
//
// One method per supported resource kind. Implementations talk to the
// provider's deletion APIs; the dispatcher decides which ones to call and in
// what order. Each call is a single best-effort attempt: implementations must
// not retry, and must bound their wait with a timeout.

use crate::error::ActionError;

/// Provider deletion calls, one per supported resource kind.
///
/// All calls are expected to be idempotent on the provider side: deleting
/// something that is already gone should surface as `Rejected`, never as a
/// panic or an indefinite wait.
pub trait ResourceActions: Send + Sync {
    /// Terminate a compute instance. Returns once the request is accepted;
    /// does not wait for the instance to stop.
    fn terminate_instance(&self, region: &str, instance_id: &str) -> Result<(), ActionError>;

    /// Delete a managed database instance.
    fn delete_db_instance(
        &self,
        region: &str,
        db_identifier: &str,
        skip_final_snapshot: bool,
    ) -> Result<(), ActionError>;

    /// Set the desired task count of a container service.
    fn scale_service(
        &self,
        region: &str,
        cluster: &str,
        service: &str,
        desired_count: u32,
    ) -> Result<(), ActionError>;

    /// Delete a container service. The platform rejects this while the
    /// desired count is non-zero.
    fn delete_service(&self, region: &str, cluster: &str, service: &str) -> Result<(), ActionError>;

    /// Delete a managed cache cluster.
    fn delete_cache_cluster(&self, region: &str, cluster_id: &str) -> Result<(), ActionError>;

    /// Backend display name (for logs).
    fn name(&self) -> &str;
}
