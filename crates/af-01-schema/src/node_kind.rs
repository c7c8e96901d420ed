//! # Node Kinds
//!
//! What a vertex of the proof tree is: an ordinary claim, a scope-opening
//! local assumption, the discharge that closes it, a case split, or the
//! closing `qed`. `opens_scope` and `closes_scope` are mutually exclusive.

use crate::errors::SchemaError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a proof-tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// An ordinary assertion to be established.
    Claim,
    /// Introduces a local assumption and opens a scope.
    LocalAssume,
    /// Discharges the innermost open assumption and closes its scope.
    LocalDischarge,
    /// One branch of a case split.
    Case,
    /// Closes out a subtree; the conjecture is established.
    Qed,
}

/// Metadata record for a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeKindInfo {
    pub description: &'static str,
    pub opens_scope: bool,
    pub closes_scope: bool,
}

impl NodeKind {
    /// Every registered kind, in registry order.
    pub fn all() -> &'static [NodeKind] {
        &[
            NodeKind::Claim,
            NodeKind::LocalAssume,
            NodeKind::LocalDischarge,
            NodeKind::Case,
            NodeKind::Qed,
        ]
    }

    /// The snake_case wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Claim => "claim",
            NodeKind::LocalAssume => "local_assume",
            NodeKind::LocalDischarge => "local_discharge",
            NodeKind::Case => "case",
            NodeKind::Qed => "qed",
        }
    }

    /// Parse the wire form; unknown values are rejected.
    pub fn parse_str(value: &str) -> Result<Self, SchemaError> {
        Self::all()
            .iter()
            .find(|k| k.as_str() == value)
            .copied()
            .ok_or_else(|| SchemaError::UnknownNodeKind {
                value: value.to_string(),
            })
    }

    /// Metadata for this kind.
    pub fn info(&self) -> NodeKindInfo {
        match self {
            NodeKind::Claim => NodeKindInfo {
                description: "an assertion to be established",
                opens_scope: false,
                closes_scope: false,
            },
            NodeKind::LocalAssume => NodeKindInfo {
                description: "introduces a local assumption",
                opens_scope: true,
                closes_scope: false,
            },
            NodeKind::LocalDischarge => NodeKindInfo {
                description: "discharges the innermost local assumption",
                opens_scope: false,
                closes_scope: true,
            },
            NodeKind::Case => NodeKindInfo {
                description: "one branch of a case split",
                opens_scope: false,
                closes_scope: false,
            },
            NodeKind::Qed => NodeKindInfo {
                description: "closes out a subtree",
                opens_scope: false,
                closes_scope: false,
            },
        }
    }

    pub fn opens_scope(&self) -> bool {
        self.info().opens_scope
    }

    pub fn closes_scope(&self) -> bool {
        self.info().closes_scope
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
