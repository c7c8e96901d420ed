//! # Shared Types Crate
//!
//! This crate contains the cross-subsystem vocabulary of the axiom-forge
//! workspace: the hierarchical node identifier algebra, the nanosecond
//! UTC timestamp, and the exit-class taxonomy every structured error maps
//! into.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem primitives are defined
//!   here; no subsystem crate redefines identifiers or timestamps.
//! - **String wire form**: `NodeId` and `Timestamp` serialise as their
//!   canonical string renderings so every ledger event stays human-readable.
//! - **No I/O**: this crate is pure data; it never touches the filesystem
//!   or the clock except in `Timestamp::now()`.

pub mod errors;
pub mod node_id;
pub mod timestamp;

pub use errors::{ExitClass, NodeIdError, TimestampError};
pub use node_id::NodeId;
pub use timestamp::Timestamp;
