//! # Ledger Errors
//!
//! Corruption errors carry a bounded listing of offending sequence numbers
//! so a message never grows with the ledger.

use shared_types::ExitClass;
use thiserror::Error;

/// Upper bound on sequence numbers shown in one error message.
const MAX_LISTED_SEQUENCES: usize = 16;

/// Render a bounded, comma-separated sequence listing. Shared by every
/// consumer that reports per-sequence corruption.
pub fn fmt_sequences(seqs: &[u64]) -> String {
    let shown: Vec<String> = seqs
        .iter()
        .take(MAX_LISTED_SEQUENCES)
        .map(|s| s.to_string())
        .collect();
    if seqs.len() > MAX_LISTED_SEQUENCES {
        format!(
            "{} (+{} more)",
            shown.join(", "),
            seqs.len() - MAX_LISTED_SEQUENCES
        )
    } else {
        shown.join(", ")
    }
}

/// Errors from ledger append and replay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Filesystem operation failed.
    #[error("ledger I/O error at {path}: {message}")]
    Io { path: String, message: String },

    /// Every append attempt lost the sequence race.
    #[error("ledger append contended {attempts} times; retry")]
    AppendContention { attempts: u32 },

    /// An event failed to serialise; the event was not persisted.
    #[error("event serialisation failed: {message}")]
    Serialize { message: String },

    /// The dense sequence 1..N has holes (INVARIANT-1 violation).
    #[error("ledger is missing sequences: {}", fmt_sequences(.missing))]
    MissingSequences { missing: Vec<u64> },

    /// A sequence file exists outside 1..N (zero or duplicate-after-parse).
    #[error("ledger contains invalid sequence number {seq}")]
    InvalidSequence { seq: u64 },

    /// An event file could not be read during replay.
    #[error("ledger event {seq} unreadable: {message}")]
    Unreadable { seq: u64, message: String },

    /// An event file is not a JSON object with `type` and `timestamp`.
    #[error("ledger event {seq} has a malformed envelope: {message}")]
    InvalidEnvelope { seq: u64, message: String },

    /// An event failed to decode into its typed payload.
    #[error("ledger event {seq} failed to decode: {message}")]
    DecodeFailed { seq: u64, message: String },
}

impl LedgerError {
    pub fn exit_class(&self) -> ExitClass {
        match self {
            LedgerError::Io { .. } | LedgerError::AppendContention { .. } => ExitClass::Retriable,
            LedgerError::Serialize { .. } => ExitClass::Logic,
            LedgerError::MissingSequences { .. }
            | LedgerError::InvalidSequence { .. }
            | LedgerError::Unreadable { .. }
            | LedgerError::InvalidEnvelope { .. }
            | LedgerError::DecodeFailed { .. } => ExitClass::Corruption,
        }
    }
}
