//! # Workflow States
//!
//! Coordination-level availability of a node:
//!
//! ```text
//! available → claimed → available
//!                 ↓
//!              blocked → available
//! ```
//!
//! Same-state transitions are forbidden. Only `available` permits a claim.

use crate::errors::SchemaError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordination-level availability of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// No agent holds a claim; the node may be claimed.
    Available,
    /// An agent holds an exclusive claim.
    Claimed,
    /// Open blocking challenges prevent progress.
    Blocked,
}

impl WorkflowState {
    /// Every registered state, in registry order.
    pub fn all() -> &'static [WorkflowState] {
        &[
            WorkflowState::Available,
            WorkflowState::Claimed,
            WorkflowState::Blocked,
        ]
    }

    /// The snake_case wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Available => "available",
            WorkflowState::Claimed => "claimed",
            WorkflowState::Blocked => "blocked",
        }
    }

    /// Parse the wire form; unknown values are rejected.
    pub fn parse_str(value: &str) -> Result<Self, SchemaError> {
        Self::all()
            .iter()
            .find(|s| s.as_str() == value)
            .copied()
            .ok_or_else(|| SchemaError::UnknownWorkflowState {
                value: value.to_string(),
            })
    }

    /// States reachable from this one.
    pub fn allowed_transitions(&self) -> &'static [WorkflowState] {
        match self {
            WorkflowState::Available => &[WorkflowState::Claimed],
            WorkflowState::Claimed => &[WorkflowState::Available, WorkflowState::Blocked],
            WorkflowState::Blocked => &[WorkflowState::Available],
        }
    }

    /// Only `available` nodes may be claimed.
    pub fn permits_claim(&self) -> bool {
        matches!(self, WorkflowState::Available)
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validate a transition against the allowed table.
pub fn validate_workflow_transition(
    from: WorkflowState,
    to: WorkflowState,
) -> Result<(), SchemaError> {
    if from.allowed_transitions().contains(&to) {
        Ok(())
    } else {
        Err(SchemaError::InvalidWorkflowTransition {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        })
    }
}
