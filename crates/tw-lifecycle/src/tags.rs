// tags.rs — Typed view over the lifecycle tags of a resource.
//
// Resources arrive as a raw `tag key → string` map. The governance-relevant
// subset is:
//
//   Lifecycle  = persistent | temporary   (absent → persistent)
//   CreatedAt  = timestamp                (optional)
//   ExpiresAt  = timestamp                (optional)
//   Owner      = contact                  (optional, falls back to config)
//
// A tag that cannot be read is treated as absent. Absent dates never
// expire a resource.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag key holding the lifecycle intent.
pub const LIFECYCLE_TAG: &str = "Lifecycle";
/// Tag key holding the creation timestamp.
pub const CREATED_AT_TAG: &str = "CreatedAt";
/// Tag key holding the explicit expiry timestamp.
pub const EXPIRES_AT_TAG: &str = "ExpiresAt";
/// Tag key holding the owner contact.
pub const OWNER_TAG: &str = "Owner";
/// Tag key used to scope enumeration and cost queries to one project.
pub const PROJECT_TAG: &str = "Project";

/// The declared lifecycle intent of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleKind {
    /// Never expires. Also the meaning of an absent tag.
    Persistent,
    /// Expires `termination_days` after creation unless `ExpiresAt` says otherwise.
    Temporary,
    /// Any other value. Only an explicit `ExpiresAt` can expire these.
    Other(String),
}

impl LifecycleKind {
    /// Interpret the raw `Lifecycle` tag value.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// A missing or blank tag means persistent.
    pub fn from_tag(value: Option<&str>) -> Self {
        let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return LifecycleKind::Persistent;
        };
        if raw.eq_ignore_ascii_case("persistent") {
            LifecycleKind::Persistent
        } else if raw.eq_ignore_ascii_case("temporary") {
            LifecycleKind::Temporary
        } else {
            LifecycleKind::Other(raw.to_string())
        }
    }
}

impl fmt::Display for LifecycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleKind::Persistent => write!(f, "persistent"),
            LifecycleKind::Temporary => write!(f, "temporary"),
            LifecycleKind::Other(value) => write!(f, "{}", value),
        }
    }
}

/// The governance-relevant view of a resource's tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleTags {
    pub lifecycle: LifecycleKind,
    pub created_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub owner: Option<String>,
}

impl LifecycleTags {
    /// Build the typed view from a raw tag map.
    pub fn from_tags(tags: &HashMap<String, String>) -> Self {
        Self {
            lifecycle: LifecycleKind::from_tag(tags.get(LIFECYCLE_TAG).map(String::as_str)),
            created_at: timestamp_tag(tags, CREATED_AT_TAG),
            expires_at: timestamp_tag(tags, EXPIRES_AT_TAG),
            owner: tags
                .get(OWNER_TAG)
                .map(|o| o.trim())
                .filter(|o| !o.is_empty())
                .map(str::to_string),
        }
    }

    /// A tag set with only the lifecycle intent filled in.
    pub fn with_lifecycle(lifecycle: LifecycleKind) -> Self {
        Self {
            lifecycle,
            created_at: None,
            expires_at: None,
            owner: None,
        }
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

fn timestamp_tag(tags: &HashMap<String, String>, key: &str) -> Option<DateTime<Utc>> {
    let raw = tags.get(key)?;
    let parsed = parse_timestamp(raw);
    if parsed.is_none() {
        tracing::warn!(tag = key, value = %raw, "ignoring unparseable timestamp tag");
    }
    parsed
}

/// Parse a timestamp tag value into a UTC instant.
///
/// Accepted forms:
/// - RFC 3339 with a trailing `Z` or an explicit offset (`+02:00`)
/// - naive date-time (`2024-05-01T12:00:00`, optional fraction), read as UTC
/// - bare date (`2024-05-01`), read as midnight UTC
///
/// `2024-05-01T00:00:00Z` and `2024-05-01T02:00:00+02:00` are the same instant.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
