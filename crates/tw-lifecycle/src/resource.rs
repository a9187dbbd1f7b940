// resource.rs — Tagged resources and structured resource identifiers.
//
// Identifiers follow the provider's colon-separated form:
//
//   arn:<provider>:<service>:<region>:<account>:<resource path>
//
// The resource path may itself contain ':' (e.g. `db:orders`), so the
// identifier is split into at most six segments. Parsing happens once at the
// boundary; the dispatcher matches on `ServiceKind` and never looks at the
// raw string again.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classifier::ExpiryDetail;
use crate::error::LifecycleError;

const IDENTIFIER_SEGMENTS: usize = 6;

/// One enumerated resource: its identifier and raw tag map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedResource {
    pub resource_id: String,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl TaggedResource {
    pub fn new(resource_id: impl Into<String>, tags: HashMap<String, String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            tags,
        }
    }
}

/// An expiring or expired resource as it appears in run reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub resource_id: String,
    pub owner: Option<String>,
    pub detail: ExpiryDetail,
}

/// The kind of resource an identifier names, with the fields each
/// termination call needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServiceKind {
    /// A compute instance (`ec2` … `instance/<id>`).
    ComputeInstance { instance_id: String },
    /// A managed relational database instance (`rds` … `db:<identifier>`).
    Database { db_identifier: String },
    /// A container-orchestration service (`ecs` … `service/<cluster>/<name>`).
    ContainerService { cluster: String, service: String },
    /// A managed cache cluster (`elasticache` … `cluster:<id>`).
    CacheCluster { cluster_id: String },
    /// Anything else. Never touched by the dispatcher.
    Unsupported {
        service: String,
        resource_type: String,
    },
}

impl ServiceKind {
    fn from_parts(service: &str, path: &str) -> Self {
        match service {
            "ec2" => {
                if let Some(id) = path.strip_prefix("instance/").filter(|id| is_segment(id)) {
                    return ServiceKind::ComputeInstance {
                        instance_id: id.to_string(),
                    };
                }
            }
            "rds" => {
                if let Some(id) = path.strip_prefix("db:").filter(|id| is_segment(id)) {
                    return ServiceKind::Database {
                        db_identifier: id.to_string(),
                    };
                }
            }
            "ecs" => {
                if let Some((cluster, name)) = path
                    .strip_prefix("service/")
                    .and_then(|rest| rest.split_once('/'))
                    .filter(|(c, n)| is_segment(c) && is_segment(n))
                {
                    return ServiceKind::ContainerService {
                        cluster: cluster.to_string(),
                        service: name.to_string(),
                    };
                }
            }
            "elasticache" => {
                if let Some(id) = path.strip_prefix("cluster:").filter(|id| is_segment(id)) {
                    return ServiceKind::CacheCluster {
                        cluster_id: id.to_string(),
                    };
                }
            }
            _ => {}
        }

        let resource_type = path
            .split(['/', ':'])
            .next()
            .unwrap_or_default()
            .to_string();
        ServiceKind::Unsupported {
            service: service.to_string(),
            resource_type,
        }
    }

    /// Short name of the kind, for logs and reports.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ServiceKind::ComputeInstance { .. } => "compute_instance",
            ServiceKind::Database { .. } => "database",
            ServiceKind::ContainerService { .. } => "container_service",
            ServiceKind::CacheCluster { .. } => "cache_cluster",
            ServiceKind::Unsupported { .. } => "unsupported",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, ServiceKind::Unsupported { .. })
    }
}

fn is_segment(s: &str) -> bool {
    !s.is_empty() && !s.contains('/')
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKind::ComputeInstance { instance_id } => {
                write!(f, "compute instance {}", instance_id)
            }
            ServiceKind::Database { db_identifier } => write!(f, "database {}", db_identifier),
            ServiceKind::ContainerService { cluster, service } => {
                write!(f, "container service {}/{}", cluster, service)
            }
            ServiceKind::CacheCluster { cluster_id } => write!(f, "cache cluster {}", cluster_id),
            ServiceKind::Unsupported {
                service,
                resource_type,
            } => write!(f, "unsupported {}:{}", service, resource_type),
        }
    }
}

/// A parsed resource identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceId {
    /// The original identifier string.
    pub raw: String,
    pub provider: String,
    pub service: String,
    pub region: String,
    pub account: String,
    /// Service-specific path segment (e.g. `instance/i-0abc`).
    pub resource: String,
    pub kind: ServiceKind,
}

impl ResourceId {
    /// Parse an identifier of the form
    /// `arn:<provider>:<service>:<region>:<account>:<resource path>`.
    pub fn parse(identifier: &str) -> Result<Self, LifecycleError> {
        let malformed = |reason: String| LifecycleError::MalformedIdentifier {
            identifier: identifier.to_string(),
            reason,
        };

        let parts: Vec<&str> = identifier.splitn(IDENTIFIER_SEGMENTS, ':').collect();
        if parts.len() < IDENTIFIER_SEGMENTS {
            return Err(malformed(format!(
                "expected {} ':'-separated segments, found {}",
                IDENTIFIER_SEGMENTS,
                parts.len()
            )));
        }
        if parts[0] != "arn" {
            return Err(malformed(format!("unexpected prefix '{}'", parts[0])));
        }
        if parts[2].is_empty() {
            return Err(malformed("empty service segment".to_string()));
        }
        if parts[5].is_empty() {
            return Err(malformed("empty resource segment".to_string()));
        }

        Ok(Self {
            raw: identifier.to_string(),
            provider: parts[1].to_string(),
            service: parts[2].to_string(),
            region: parts[3].to_string(),
            account: parts[4].to_string(),
            resource: parts[5].to_string(),
            kind: ServiceKind::from_parts(parts[2], parts[5]),
        })
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
