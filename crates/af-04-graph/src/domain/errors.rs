//! # Graph Errors
//!
//! Validation errors are logic-class and returned to the caller before
//! any mutation; the same checks failing during replay mean the ledger
//! itself is inconsistent, so replay wraps them into a corruption-class
//! error carrying the offending sequence number.

use af_01_schema::SchemaError;
use af_02_ledger::LedgerError;
use shared_types::{ExitClass, NodeId};
use thiserror::Error;

/// Render a cycle path as `1.1 -> 1.2 -> 1.1`.
pub(crate) fn fmt_cycle(path: &[NodeId]) -> String {
    path.iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors from graph validation, application and replay.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// No node with this id exists.
    #[error("node {node_id} not found")]
    NodeNotFound { node_id: NodeId },

    /// The id's parent does not exist.
    #[error("parent {parent} of node {node_id} not found")]
    ParentNotFound { node_id: NodeId, parent: NodeId },

    /// A node with this id already exists.
    #[error("node {node_id} already exists")]
    AlreadyExists { node_id: NodeId },

    /// The proof was already initialised.
    #[error("proof is already initialized")]
    AlreadyInitialized,

    /// Adding the edge would close a dependency cycle.
    #[error("dependency cycle: {}", fmt_cycle(.path))]
    DependencyCycle { path: Vec<NodeId> },

    /// The requested transition is outside the allowed tables.
    #[error(transparent)]
    InvalidTransition(#[from] SchemaError),

    /// The node's recorded state differs from the transition's `from`.
    #[error("node {node_id} is in state '{actual}', transition expected '{expected}'")]
    StateMismatch {
        node_id: NodeId,
        expected: String,
        actual: String,
    },

    /// The node is in a terminal state and emits no further transitions.
    #[error("node {node_id} is terminal ('{state}'); no further transitions")]
    TerminalState { node_id: NodeId, state: String },

    /// Open blocking challenges pin the node.
    #[error("node {node_id} has {open} open blocking challenge(s)")]
    NodeBlocked { node_id: NodeId, open: u32 },

    /// Scope discipline violated (non-LIFO close, reopen, bad kind).
    #[error("scope violation: {message}")]
    ScopeViolation { message: String },

    /// A scope was left open where it must be closed.
    #[error("scope opened by {assume_id} is still open")]
    ScopeUnclosed { assume_id: NodeId },

    /// No challenge with this id exists (or it is already closed).
    #[error("challenge '{challenge_id}' not found or already closed")]
    ChallengeNotFound { challenge_id: String },

    /// A challenge with this id already exists.
    #[error("challenge '{challenge_id}' already exists")]
    DuplicateChallenge { challenge_id: String },

    /// Too many challenges are open against the node.
    #[error("node {node_id} already has {limit} open challenges")]
    ChallengeLimitExceeded { node_id: NodeId, limit: u32 },

    /// The node has been through refinement too many times.
    #[error("node {node_id} exceeded {limit} refinement trips")]
    RefinementLimitExceeded { node_id: NodeId, limit: u32 },

    /// A stored content hash does not match the immutable fields.
    #[error("content hash mismatch for node {node_id}: stored {stored}, computed {computed}")]
    ContentHashMismatch {
        node_id: NodeId,
        stored: String,
        computed: String,
    },

    /// An event could not be applied during replay: the ledger is
    /// internally inconsistent.
    #[error("ledger inconsistent at sequence {seq}: {source}")]
    ReplayFailed {
        seq: u64,
        #[source]
        source: Box<GraphError>,
    },

    /// Underlying ledger failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl GraphError {
    pub fn exit_class(&self) -> ExitClass {
        match self {
            GraphError::NodeNotFound { .. }
            | GraphError::ParentNotFound { .. }
            | GraphError::AlreadyExists { .. }
            | GraphError::AlreadyInitialized
            | GraphError::DependencyCycle { .. }
            | GraphError::InvalidTransition(_)
            | GraphError::StateMismatch { .. }
            | GraphError::TerminalState { .. }
            | GraphError::ScopeViolation { .. }
            | GraphError::ScopeUnclosed { .. }
            | GraphError::ChallengeNotFound { .. }
            | GraphError::DuplicateChallenge { .. }
            | GraphError::ChallengeLimitExceeded { .. }
            | GraphError::RefinementLimitExceeded { .. } => ExitClass::Logic,
            GraphError::NodeBlocked { .. } => ExitClass::Blocked,
            GraphError::ContentHashMismatch { .. } | GraphError::ReplayFailed { .. } => {
                ExitClass::Corruption
            }
            GraphError::Ledger(inner) => inner.exit_class(),
        }
    }
}
