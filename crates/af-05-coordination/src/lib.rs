//! # Coordination API (af-05)
//!
//! The operations agents invoke against a shared proof root. Every
//! operation is synchronous and follows the same discipline:
//!
//! 1. validate inputs and preconditions against the in-memory projection;
//! 2. rehearse the exact events on a copy of the projection, so nothing
//!    invalid is ever appended;
//! 3. append the events to the ledger (the only authority);
//! 4. post-verify where concurrent writers could interleave (claims);
//! 5. fold the events into the live projection.
//!
//! Failures are typed [`CoordError`]s carrying the exit class of the
//! innermost cause. The library never prints; tracing events are emitted
//! at debug level and no subscriber is installed here.

pub mod config;
pub mod errors;
pub mod service;

pub use config::{ConfigError, MetaConfig, META_VERSION};
pub use errors::CoordError;
pub use service::{ClaimSnapshot, Coordinator, NodeSnapshot, ProofStatus};
