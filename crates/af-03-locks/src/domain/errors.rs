//! # Lock Errors

use af_02_ledger::LedgerError;
use shared_types::{ExitClass, NodeId};
use thiserror::Error;

/// Errors from lock acquisition, release, refresh and replay.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LockError {
    /// Owner was empty after trimming whitespace.
    #[error("owner must be non-empty")]
    EmptyOwner,

    /// Timeout was zero, negative-equivalent or unrepresentable.
    #[error("invalid lock timeout: {message}")]
    InvalidTimeout { message: String },

    /// Another agent holds a non-expired claim on the node.
    #[error("node {node_id} is already claimed by '{holder}'")]
    AlreadyClaimed { node_id: NodeId, holder: String },

    /// The caller does not hold the claim it tried to act on.
    #[error("node {node_id} is claimed by '{holder}', not '{owner}'")]
    NotClaimHolder {
        node_id: NodeId,
        owner: String,
        holder: String,
    },

    /// No claim exists on the node.
    #[error("node {node_id} is not locked")]
    NotLocked { node_id: NodeId },

    /// Post-write verification found this manager's own event torn down
    /// or superseded in a way replay cannot explain.
    #[error("lock acquisition invariant failed: {message}")]
    VerificationFailed { message: String },

    /// Lock-kind events failed to deserialise during replay.
    #[error("lock replay corrupt at sequences: {}", af_02_ledger::fmt_sequences(.sequences))]
    ReplayCorruption { sequences: Vec<u64> },

    /// Underlying ledger failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl LockError {
    pub fn exit_class(&self) -> ExitClass {
        match self {
            LockError::EmptyOwner | LockError::InvalidTimeout { .. } | LockError::NotLocked { .. } => {
                ExitClass::Logic
            }
            LockError::AlreadyClaimed { .. }
            | LockError::NotClaimHolder { .. }
            | LockError::VerificationFailed { .. } => ExitClass::Retriable,
            LockError::ReplayCorruption { .. } => ExitClass::Corruption,
            LockError::Ledger(inner) => inner.exit_class(),
        }
    }
}
