//! # tw-disposition
//!
//! Termination dispatch for expired resources.
//!
//! The [`Dispatcher`] takes the identifier of an expired resource, parses it
//! once into a [`ServiceKind`](tw_lifecycle::ServiceKind), and issues the
//! kind-specific delete calls through a pluggable [`ResourceActions`]
//! backend. Every resource is handled in isolation: one failure never stops
//! the rest of the batch.
//!
//! ## Supported kinds
//!
//! | kind | calls |
//! |---|---|
//! | compute instance | terminate (no wait) |
//! | database | delete, skipping the final snapshot |
//! | container service | scale to zero, then delete |
//! | cache cluster | delete |
//!
//! Anything else is reported as unsupported and left untouched.

pub mod actions;
pub mod dispatcher;
pub mod error;
pub mod recording;

pub use actions::ResourceActions;
pub use dispatcher::{DispositionAttempt, DispositionOutcome, Disposed, Dispatcher};
pub use error::{ActionError, DispositionError};
pub use recording::{ActionCall, RecordingActions};
