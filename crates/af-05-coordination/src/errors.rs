//! # Coordination Errors
//!
//! One wrapper over the subsystem errors. Wrapping is transparent: the
//! message and the exit class of the innermost kind survive unchanged.

use crate::config::ConfigError;
use af_01_schema::SchemaError;
use af_02_ledger::LedgerError;
use af_03_locks::LockError;
use af_04_graph::GraphError;
use shared_types::{ExitClass, NodeId};
use thiserror::Error;

/// Errors surfaced by [`crate::Coordinator`] operations.
#[derive(Debug, Error)]
pub enum CoordError {
    /// The agent name was empty after trimming.
    #[error("agent name must be non-empty")]
    EmptyAgent,

    /// A required text input was empty.
    #[error("{field} must be non-empty")]
    EmptyInput { field: &'static str },

    /// The new node would exceed the configured depth bound.
    #[error("node {node_id} would exceed maximum depth {max_depth}")]
    DepthExceeded { node_id: NodeId, max_depth: u32 },

    /// The parent already carries the configured number of children.
    #[error("node {parent} already has {max_children} children")]
    ChildLimitExceeded { parent: NodeId, max_children: u32 },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CoordError {
    /// The exit class of the innermost cause.
    pub fn exit_class(&self) -> ExitClass {
        match self {
            CoordError::EmptyAgent
            | CoordError::EmptyInput { .. }
            | CoordError::DepthExceeded { .. }
            | CoordError::ChildLimitExceeded { .. } => ExitClass::Logic,
            CoordError::Schema(inner) => inner.exit_class(),
            CoordError::Ledger(inner) => inner.exit_class(),
            CoordError::Lock(inner) => inner.exit_class(),
            CoordError::Graph(inner) => inner.exit_class(),
            CoordError::Config(inner) => inner.exit_class(),
        }
    }
}
