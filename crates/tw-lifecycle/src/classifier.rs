// classifier.rs — Lifecycle classification.
//
// `classify()` is the single decision point that turns a resource's tags
// into a LifecycleState. Rules are evaluated in order:
//
// 1. Lifecycle persistent (or absent)         → Persistent
// 2. ExpiresAt present: days until expiry     → Expired (< 0)
//                                             → ExpiringSoon (<= warning)
//                                             → Active
// 3. Temporary with CreatedAt: days since     → Expired (>= termination)
//                                             → ExpiringSoon (>= warning)
//                                             → Active
// 4. Anything else                            → Active
//
// Rule 2 short-circuits rule 3: a resource carrying both timestamps is
// judged only by its explicit expiry.
//
// Day counts are floored toward negative infinity, so a resource whose
// expiry passed one hour ago is already one day expired.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::{ResourceRecord, TaggedResource};
use crate::tags::{LifecycleKind, LifecycleTags};

const SECONDS_PER_DAY: i64 = 86_400;

/// Day-count thresholds that drive classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Resources within this many days of their deadline are flagged.
    pub warning_days: i64,
    /// Temporary resources without `ExpiresAt` expire this many days after creation.
    pub termination_days: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning_days: 30,
            termination_days: 60,
        }
    }
}

/// Why a resource is expiring or expired, with the day-count that justified it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum ExpiryDetail {
    /// Judged by the `ExpiresAt` tag.
    Explicit {
        expires_at: DateTime<Utc>,
        /// Negative once the deadline has passed.
        days_until_expiry: i64,
    },
    /// Judged by `CreatedAt` plus the termination window.
    Age {
        created_at: DateTime<Utc>,
        days_old: i64,
        /// Days left until the termination window closes (<= 0 once expired).
        days_remaining: i64,
    },
}

impl ExpiryDetail {
    /// Days left before the deadline. Zero or negative once it has passed.
    pub fn days_remaining(&self) -> i64 {
        match self {
            ExpiryDetail::Explicit {
                days_until_expiry, ..
            } => *days_until_expiry,
            ExpiryDetail::Age { days_remaining, .. } => *days_remaining,
        }
    }

    /// Days past an explicit expiry. `None` for age-based deadlines, which
    /// report [`days_old`](Self::days_old) instead.
    pub fn days_expired(&self) -> Option<i64> {
        match self {
            ExpiryDetail::Explicit {
                days_until_expiry, ..
            } if *days_until_expiry < 0 => Some(days_until_expiry.abs()),
            _ => None,
        }
    }

    /// Age in days, for age-based deadlines.
    pub fn days_old(&self) -> Option<i64> {
        match self {
            ExpiryDetail::Age { days_old, .. } => Some(*days_old),
            ExpiryDetail::Explicit { .. } => None,
        }
    }
}

/// The lifecycle state of one resource at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum LifecycleState {
    /// Excluded from all further checks.
    Persistent,
    /// No deadline reached and none close.
    Active,
    /// Inside the warning window of its deadline.
    ExpiringSoon(ExpiryDetail),
    /// Deadline has passed.
    Expired(ExpiryDetail),
}

impl LifecycleState {
    pub fn detail(&self) -> Option<&ExpiryDetail> {
        match self {
            LifecycleState::ExpiringSoon(detail) | LifecycleState::Expired(detail) => Some(detail),
            LifecycleState::Persistent | LifecycleState::Active => None,
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, LifecycleState::Expired(_))
    }

    pub fn is_expiring_soon(&self) -> bool {
        matches!(self, LifecycleState::ExpiringSoon(_))
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Persistent => write!(f, "persistent"),
            LifecycleState::Active => write!(f, "active"),
            LifecycleState::ExpiringSoon(_) => write!(f, "expiring_soon"),
            LifecycleState::Expired(_) => write!(f, "expired"),
        }
    }
}

/// Classify a resource's lifecycle tags at `now`.
///
/// Pure and deterministic: no clock reads, no hidden state.
pub fn classify(now: DateTime<Utc>, tags: &LifecycleTags, thresholds: &Thresholds) -> LifecycleState {
    // Rule 1: persistent resources are never checked.
    if tags.lifecycle == LifecycleKind::Persistent {
        return LifecycleState::Persistent;
    }

    // Rule 2: an explicit expiry wins over any creation date.
    if let Some(expires_at) = tags.expires_at {
        let days_until_expiry = whole_days(expires_at - now);
        let detail = ExpiryDetail::Explicit {
            expires_at,
            days_until_expiry,
        };
        return if days_until_expiry < 0 {
            LifecycleState::Expired(detail)
        } else if days_until_expiry <= thresholds.warning_days {
            LifecycleState::ExpiringSoon(detail)
        } else {
            LifecycleState::Active
        };
    }

    // Rule 3: temporary resources age out from their creation date.
    if tags.lifecycle == LifecycleKind::Temporary {
        if let Some(created_at) = tags.created_at {
            let days_old = whole_days(now - created_at);
            let detail = ExpiryDetail::Age {
                created_at,
                days_old,
                days_remaining: thresholds.termination_days - days_old,
            };
            return if days_old >= thresholds.termination_days {
                LifecycleState::Expired(detail)
            } else if days_old >= thresholds.warning_days {
                LifecycleState::ExpiringSoon(detail)
            } else {
                LifecycleState::Active
            };
        }
    }

    // Rule 4: no usable dates, never silently expire.
    LifecycleState::Active
}

/// Whole days in `delta`, floored toward negative infinity.
fn whole_days(delta: Duration) -> i64 {
    let mut seconds = delta.num_seconds();
    if delta.subsec_nanos() < 0 {
        seconds -= 1;
    }
    seconds.div_euclid(SECONDS_PER_DAY)
}

/// A resource together with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classified {
    pub resource_id: String,
    /// Owner from the `Owner` tag, or the configured fallback.
    pub owner: Option<String>,
    pub state: LifecycleState,
}

impl Classified {
    /// The reporting record, for expiring and expired resources only.
    pub fn record(&self) -> Option<ResourceRecord> {
        self.state.detail().map(|detail| ResourceRecord {
            resource_id: self.resource_id.clone(),
            owner: self.owner.clone(),
            detail: detail.clone(),
        })
    }
}

/// Classifier bound to one run's thresholds and fallback owner.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    thresholds: Thresholds,
    fallback_owner: Option<String>,
}

impl Classifier {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            fallback_owner: None,
        }
    }

    /// Owner reported for resources that carry no `Owner` tag.
    pub fn with_fallback_owner(mut self, owner: Option<String>) -> Self {
        self.fallback_owner = owner;
        self
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Classify one enumerated resource at `now`.
    pub fn classify_resource(&self, now: DateTime<Utc>, resource: &TaggedResource) -> Classified {
        let tags = LifecycleTags::from_tags(&resource.tags);
        let state = classify(now, &tags, &self.thresholds);
        tracing::debug!(resource = %resource.resource_id, state = %state, "classified");
        Classified {
            resource_id: resource.resource_id.clone(),
            owner: tags.owner.or_else(|| self.fallback_owner.clone()),
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn thresholds() -> Thresholds {
        Thresholds {
            warning_days: 30,
            termination_days: 60,
        }
    }

    fn temporary() -> LifecycleTags {
        LifecycleTags::with_lifecycle(LifecycleKind::Temporary)
    }

    #[test]
    fn persistent_ignores_timestamps() {
        let tags = LifecycleTags::with_lifecycle(LifecycleKind::Persistent)
            .expires_at(now() - Duration::days(400))
            .created_at(now() - Duration::days(900));
        assert_eq!(classify(now(), &tags, &thresholds()), LifecycleState::Persistent);
    }

    #[test]
    fn absent_lifecycle_tag_is_persistent_even_when_expired() {
        let mut raw = HashMap::new();
        raw.insert("ExpiresAt".to_string(), "2000-01-01T00:00:00Z".to_string());
        let tags = LifecycleTags::from_tags(&raw);
        assert_eq!(classify(now(), &tags, &thresholds()), LifecycleState::Persistent);
    }

    #[test]
    fn expiry_five_days_ago_is_expired_by_five() {
        let tags = temporary().expires_at(now() - Duration::days(5));
        let state = classify(now(), &tags, &thresholds());
        assert!(state.is_expired());
        assert_eq!(state.detail().unwrap().days_expired(), Some(5));
    }

    #[test]
    fn expiry_an_hour_ago_is_one_day_expired() {
        let tags = temporary().expires_at(now() - Duration::hours(1));
        let state = classify(now(), &tags, &thresholds());
        assert_eq!(state.detail().unwrap().days_expired(), Some(1));
    }

    #[test]
    fn expiry_exactly_at_warning_boundary_warns() {
        let tags = temporary().expires_at(now() + Duration::days(30));
        let state = classify(now(), &tags, &thresholds());
        assert!(state.is_expiring_soon());
        assert_eq!(state.detail().unwrap().days_remaining(), 30);
    }

    #[test]
    fn expiry_one_past_warning_boundary_is_active() {
        let tags = temporary().expires_at(now() + Duration::days(31));
        assert_eq!(classify(now(), &tags, &thresholds()), LifecycleState::Active);
    }

    #[test]
    fn expiry_later_today_is_expiring_with_zero_days() {
        let tags = temporary().expires_at(now() + Duration::hours(3));
        let state = classify(now(), &tags, &thresholds());
        assert!(state.is_expiring_soon());
        assert_eq!(state.detail().unwrap().days_remaining(), 0);
    }

    #[test]
    fn age_at_termination_window_is_expired() {
        let tags = temporary().created_at(now() - Duration::days(60));
        let state = classify(now(), &tags, &thresholds());
        assert!(state.is_expired());
        assert_eq!(state.detail().unwrap().days_old(), Some(60));
    }

    #[test]
    fn age_one_below_termination_window_warns() {
        let tags = temporary().created_at(now() - Duration::days(59));
        let state = classify(now(), &tags, &thresholds());
        assert!(state.is_expiring_soon());
        assert_eq!(state.detail().unwrap().days_remaining(), 1);
    }

    #[test]
    fn age_forty_five_days_warns_with_fifteen_remaining() {
        let tags = temporary().created_at(now() - Duration::days(45));
        match classify(now(), &tags, &thresholds()) {
            LifecycleState::ExpiringSoon(ExpiryDetail::Age {
                days_old,
                days_remaining,
                ..
            }) => {
                assert_eq!(days_old, 45);
                assert_eq!(days_remaining, 15);
            }
            other => panic!("expected age-based warning, got {:?}", other),
        }
    }

    #[test]
    fn young_temporary_resource_is_active() {
        let tags = temporary().created_at(now() - Duration::days(3));
        assert_eq!(classify(now(), &tags, &thresholds()), LifecycleState::Active);
    }

    #[test]
    fn temporary_without_dates_is_active() {
        assert_eq!(classify(now(), &temporary(), &thresholds()), LifecycleState::Active);
    }

    #[test]
    fn expires_at_short_circuits_creation_age() {
        // Far past the termination window by age, but the explicit expiry is
        // a year out: the explicit expiry decides.
        let tags = temporary()
            .created_at(now() - Duration::days(500))
            .expires_at(now() + Duration::days(365));
        assert_eq!(classify(now(), &tags, &thresholds()), LifecycleState::Active);
    }

    #[test]
    fn unknown_lifecycle_only_expires_by_explicit_date() {
        let other = LifecycleTags::with_lifecycle(LifecycleKind::Other("scratch".into()));
        let aged = other.clone().created_at(now() - Duration::days(500));
        assert_eq!(classify(now(), &aged, &thresholds()), LifecycleState::Active);

        let dated = other.expires_at(now() - Duration::days(2));
        assert!(classify(now(), &dated, &thresholds()).is_expired());
    }

    #[test]
    fn classify_resource_falls_back_to_configured_owner() {
        let mut tags = HashMap::new();
        tags.insert("Lifecycle".to_string(), "temporary".to_string());
        tags.insert("ExpiresAt".to_string(), "2025-06-10T12:00:00Z".to_string());
        let resource = TaggedResource::new("arn:aws:ec2:us-east-1:123:instance/i-1", tags);

        let classifier =
            Classifier::new(thresholds()).with_fallback_owner(Some("ops@example.com".into()));
        let classified = classifier.classify_resource(now(), &resource);

        assert!(classified.state.is_expired());
        let record = classified.record().unwrap();
        assert_eq!(record.owner.as_deref(), Some("ops@example.com"));
        assert_eq!(record.detail.days_expired(), Some(5));
    }

    #[test]
    fn active_resources_have_no_record() {
        let classified = Classified {
            resource_id: "x".into(),
            owner: None,
            state: LifecycleState::Active,
        };
        assert!(classified.record().is_none());
    }

    #[test]
    fn state_display_format() {
        assert_eq!(LifecycleState::Persistent.to_string(), "persistent");
        assert_eq!(LifecycleState::Active.to_string(), "active");
        let detail = ExpiryDetail::Explicit {
            expires_at: now(),
            days_until_expiry: 0,
        };
        assert_eq!(
            LifecycleState::ExpiringSoon(detail.clone()).to_string(),
            "expiring_soon"
        );
        assert_eq!(LifecycleState::Expired(detail).to_string(), "expired");
    }
}
