//! # Error Primitives
//!
//! Defines the exit-class taxonomy shared by every subsystem error enum,
//! plus the structured errors of the identifier and timestamp algebra.

use thiserror::Error;

/// Exit classes a hosting front-end maps structured errors onto.
///
/// Wrapping an error must preserve the innermost class; every subsystem
/// error enum exposes `exit_class()` returning one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ExitClass {
    /// Operation succeeded.
    Success = 0,
    /// Retriable failure: lost race, transient filesystem, invariant check
    /// that a fresh attempt may pass.
    Retriable = 1,
    /// Node is blocked (open blocking challenges or similar).
    Blocked = 2,
    /// Logic error: invalid input, not-found, scope violation, cycle.
    Logic = 3,
    /// Corruption: ledger inconsistent, content-hash mismatch.
    Corruption = 4,
}

impl ExitClass {
    /// Numeric process exit code for this class.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for ExitClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExitClass::Success => "success",
            ExitClass::Retriable => "retriable",
            ExitClass::Blocked => "blocked",
            ExitClass::Logic => "logic",
            ExitClass::Corruption => "corruption",
        };
        write!(f, "{}", name)
    }
}

/// Errors from parsing or constructing a [`crate::NodeId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeIdError {
    /// Input was empty; the empty identifier is not representable.
    #[error("node id is empty")]
    Empty,

    /// A dot-separated segment was empty (leading, trailing or doubled dot).
    #[error("empty segment at position {position} in '{input}'")]
    EmptySegment { input: String, position: usize },

    /// A segment was not a decimal number, or overflowed.
    #[error("invalid segment '{segment}' in '{input}': not a positive decimal")]
    InvalidSegment { input: String, segment: String },

    /// A segment was zero; segments are one-based.
    #[error("zero segment at position {position} in '{input}'")]
    ZeroSegment { input: String, position: usize },
}

impl NodeIdError {
    /// All identifier errors are logic errors.
    pub fn exit_class(&self) -> ExitClass {
        ExitClass::Logic
    }
}

/// Errors from parsing a [`crate::Timestamp`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    /// Input was not RFC3339 (nanosecond, UTC).
    #[error("invalid timestamp '{input}': {message}")]
    Parse { input: String, message: String },

    /// Adding a duration overflowed the representable range.
    #[error("timestamp arithmetic overflow")]
    Overflow,
}

impl TimestampError {
    pub fn exit_class(&self) -> ExitClass {
        ExitClass::Logic
    }
}
