//! # Epistemic States
//!
//! The bounded state machine a node's standing moves through:
//!
//! ```text
//!            ┌────────────→ validated ⇄ needs_refinement
//!            │                              │
//! pending ───┼────────────→ admitted ←──────┤
//!            ├────────────→ refuted  ←──────┤
//!            └────────────→ archived ←──────┘
//! ```
//!
//! `admitted`, `refuted` and `archived` are terminal. Only `admitted`
//! introduces taint: the node is accepted without full verification and
//! everything resting on it inherits that debt.

use crate::errors::SchemaError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Epistemic standing of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpistemicState {
    /// Not yet examined; the default for a freshly created node.
    Pending,
    /// Verified against its dependencies and inference.
    Validated,
    /// Accepted without full verification. Terminal; introduces taint.
    Admitted,
    /// Shown to be wrong. Terminal.
    Refuted,
    /// Withdrawn from consideration. Terminal.
    Archived,
    /// Previously validated, reopened by a challenge.
    NeedsRefinement,
}

/// Metadata record for an epistemic state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpistemicStateInfo {
    /// Human description.
    pub description: &'static str,
    /// No outgoing transitions exist.
    pub is_final: bool,
    /// Accepting this state taints dependents.
    pub introduces_taint: bool,
}

impl EpistemicState {
    /// Every registered state, in registry order.
    pub fn all() -> &'static [EpistemicState] {
        &[
            EpistemicState::Pending,
            EpistemicState::Validated,
            EpistemicState::Admitted,
            EpistemicState::Refuted,
            EpistemicState::Archived,
            EpistemicState::NeedsRefinement,
        ]
    }

    /// The snake_case wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            EpistemicState::Pending => "pending",
            EpistemicState::Validated => "validated",
            EpistemicState::Admitted => "admitted",
            EpistemicState::Refuted => "refuted",
            EpistemicState::Archived => "archived",
            EpistemicState::NeedsRefinement => "needs_refinement",
        }
    }

    /// Parse the wire form; unknown values are rejected.
    pub fn parse_str(value: &str) -> Result<Self, SchemaError> {
        Self::all()
            .iter()
            .find(|s| s.as_str() == value)
            .copied()
            .ok_or_else(|| SchemaError::UnknownEpistemicState {
                value: value.to_string(),
            })
    }

    /// Metadata for this state.
    pub fn info(&self) -> EpistemicStateInfo {
        match self {
            EpistemicState::Pending => EpistemicStateInfo {
                description: "awaiting examination",
                is_final: false,
                introduces_taint: false,
            },
            EpistemicState::Validated => EpistemicStateInfo {
                description: "verified against dependencies and inference",
                is_final: false,
                introduces_taint: false,
            },
            EpistemicState::Admitted => EpistemicStateInfo {
                description: "accepted without full verification",
                is_final: true,
                introduces_taint: true,
            },
            EpistemicState::Refuted => EpistemicStateInfo {
                description: "shown to be wrong",
                is_final: true,
                introduces_taint: false,
            },
            EpistemicState::Archived => EpistemicStateInfo {
                description: "withdrawn from consideration",
                is_final: true,
                introduces_taint: false,
            },
            EpistemicState::NeedsRefinement => EpistemicStateInfo {
                description: "validation reopened by a challenge",
                is_final: false,
                introduces_taint: false,
            },
        }
    }

    /// States reachable from this one. Empty for terminal states.
    pub fn allowed_transitions(&self) -> &'static [EpistemicState] {
        match self {
            EpistemicState::Pending => &[
                EpistemicState::Validated,
                EpistemicState::Admitted,
                EpistemicState::Refuted,
                EpistemicState::Archived,
            ],
            EpistemicState::Validated => &[EpistemicState::NeedsRefinement],
            EpistemicState::NeedsRefinement => &[
                EpistemicState::Validated,
                EpistemicState::Admitted,
                EpistemicState::Refuted,
                EpistemicState::Archived,
            ],
            EpistemicState::Admitted | EpistemicState::Refuted | EpistemicState::Archived => &[],
        }
    }

    pub fn is_final(&self) -> bool {
        self.info().is_final
    }

    pub fn introduces_taint(&self) -> bool {
        self.info().introduces_taint
    }
}

impl fmt::Display for EpistemicState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validate a transition against the allowed table.
pub fn validate_epistemic_transition(
    from: EpistemicState,
    to: EpistemicState,
) -> Result<(), SchemaError> {
    if from.allowed_transitions().contains(&to) {
        Ok(())
    } else {
        Err(SchemaError::InvalidEpistemicTransition {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        })
    }
}
