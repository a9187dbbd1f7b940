//! # tw-lifecycle
//!
//! Lifecycle tag model and expiry classification for Tagwarden.
//!
//! Every governed resource carries a handful of tags that encode intent:
//! whether it is `persistent` or `temporary`, when it was created, and when
//! it should go away. This crate turns those tags into a [`LifecycleState`]
//! and parses the opaque resource identifier into a closed [`ServiceKind`]
//! so that downstream crates never re-parse strings.
//!
//! ## Key components
//!
//! - [`LifecycleTags`] — typed view over a resource's raw tag map
//! - [`classify`] / [`Classifier`] — the pure `(now, tags) → state` function
//! - [`ResourceId`] / [`ServiceKind`] — structured identifier parsing
//! - [`TagSource`] — paginated enumeration contract (external collaborator)
//!
//! ## Key invariants
//!
//! - **Pure classification**: the same `now` and tags always produce the
//!   same state. There is no clock read inside the classifier.
//! - **Safe defaults**: missing or unreadable tag data never classifies a
//!   resource as expired.

pub mod classifier;
pub mod error;
pub mod resource;
pub mod source;
pub mod tags;

pub use classifier::{classify, Classified, Classifier, ExpiryDetail, LifecycleState, Thresholds};
pub use error::{LifecycleError, SourceError};
pub use resource::{ResourceId, ResourceRecord, ServiceKind, TaggedResource};
pub use source::{pages, Pages, StaticTagSource, TagPage, TagScope, TagSource};
pub use tags::{parse_timestamp, LifecycleKind, LifecycleTags};
