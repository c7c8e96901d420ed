//! # Challenge Targets and Severities
//!
//! A challenge addresses one aspect of a node and carries a severity.
//! `critical` and `major` challenges block acceptance: while one is open
//! the node cannot leave `pending`/`needs_refinement` except to `refuted`
//! or `archived`.

use crate::errors::SchemaError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aspect of a node a challenge addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeTarget {
    /// The conjecture text itself.
    Statement,
    /// The inference rule or its application.
    Inference,
    /// The surrounding context or assumptions in force.
    Context,
    /// The declared dependency list.
    Dependencies,
    /// Scope discipline (assumption used outside its scope).
    Scope,
    /// A missing step in the argument.
    Gap,
    /// A type or sort mismatch.
    TypeError,
    /// The domain over which a statement quantifies.
    Domain,
    /// The proof is incomplete as a whole.
    Completeness,
}

impl ChallengeTarget {
    /// Every registered target, in registry order.
    pub fn all() -> &'static [ChallengeTarget] {
        &[
            ChallengeTarget::Statement,
            ChallengeTarget::Inference,
            ChallengeTarget::Context,
            ChallengeTarget::Dependencies,
            ChallengeTarget::Scope,
            ChallengeTarget::Gap,
            ChallengeTarget::TypeError,
            ChallengeTarget::Domain,
            ChallengeTarget::Completeness,
        ]
    }

    /// The snake_case wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeTarget::Statement => "statement",
            ChallengeTarget::Inference => "inference",
            ChallengeTarget::Context => "context",
            ChallengeTarget::Dependencies => "dependencies",
            ChallengeTarget::Scope => "scope",
            ChallengeTarget::Gap => "gap",
            ChallengeTarget::TypeError => "type_error",
            ChallengeTarget::Domain => "domain",
            ChallengeTarget::Completeness => "completeness",
        }
    }

    /// Parse the wire form; unknown values are rejected.
    pub fn parse_str(value: &str) -> Result<Self, SchemaError> {
        Self::all()
            .iter()
            .find(|t| t.as_str() == value)
            .copied()
            .ok_or_else(|| SchemaError::UnknownTarget {
                value: value.to_string(),
            })
    }
}

impl fmt::Display for ChallengeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity of a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeSeverity {
    /// The node is wrong as stated.
    Critical,
    /// A substantial defect that must be addressed.
    Major,
    /// A flaw that should be addressed but does not block.
    Minor,
    /// An observation.
    Note,
}

/// Metadata record for a severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengeSeverityInfo {
    pub description: &'static str,
    /// Open challenges of this severity block acceptance.
    pub blocks_acceptance: bool,
}

impl ChallengeSeverity {
    /// Every registered severity, in registry order (most severe first).
    pub fn all() -> &'static [ChallengeSeverity] {
        &[
            ChallengeSeverity::Critical,
            ChallengeSeverity::Major,
            ChallengeSeverity::Minor,
            ChallengeSeverity::Note,
        ]
    }

    /// The snake_case wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeSeverity::Critical => "critical",
            ChallengeSeverity::Major => "major",
            ChallengeSeverity::Minor => "minor",
            ChallengeSeverity::Note => "note",
        }
    }

    /// Parse the wire form; unknown values are rejected.
    pub fn parse_str(value: &str) -> Result<Self, SchemaError> {
        Self::all()
            .iter()
            .find(|s| s.as_str() == value)
            .copied()
            .ok_or_else(|| SchemaError::UnknownSeverity {
                value: value.to_string(),
            })
    }

    /// Metadata for this severity.
    pub fn info(&self) -> ChallengeSeverityInfo {
        match self {
            ChallengeSeverity::Critical => ChallengeSeverityInfo {
                description: "the node is wrong as stated",
                blocks_acceptance: true,
            },
            ChallengeSeverity::Major => ChallengeSeverityInfo {
                description: "substantial defect that must be addressed",
                blocks_acceptance: true,
            },
            ChallengeSeverity::Minor => ChallengeSeverityInfo {
                description: "flaw that should be addressed",
                blocks_acceptance: false,
            },
            ChallengeSeverity::Note => ChallengeSeverityInfo {
                description: "observation",
                blocks_acceptance: false,
            },
        }
    }

    pub fn blocks_acceptance(&self) -> bool {
        self.info().blocks_acceptance
    }
}

impl fmt::Display for ChallengeSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
