//! # Node Identifier Algebra
//!
//! Hierarchical dotted-number identifiers addressing vertices of the proof
//! tree: `1`, `1.2`, `1.2.3`. The segment sequence is the identity; the
//! string form is the canonical rendering used everywhere on the wire.
//!
//! ## Algebra
//!
//! - `parent("1.2.3") = "1.2"`, undefined on single-segment ids
//! - `child("1.2", 3) = "1.2.3"`, segments are one-based
//! - ordering is lexicographic on segment sequences, so `"1.2" < "1.10"`
//! - `is_ancestor_of` is the strict-prefix relation

use crate::errors::NodeIdError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Identifier of a node in the hierarchical proof tree.
///
/// Invariants: at least one segment, every segment >= 1. The empty
/// identifier is not representable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(Vec<u64>);

impl NodeId {
    /// The root identifier `1`.
    pub fn root() -> Self {
        NodeId(vec![1])
    }

    /// Build from raw segments. Rejects empty input and zero segments.
    pub fn from_segments(segments: Vec<u64>) -> Result<Self, NodeIdError> {
        if segments.is_empty() {
            return Err(NodeIdError::Empty);
        }
        if let Some(position) = segments.iter().position(|&s| s == 0) {
            return Err(NodeIdError::ZeroSegment {
                input: format_segments(&segments),
                position,
            });
        }
        Ok(NodeId(segments))
    }

    /// The segment sequence.
    pub fn segments(&self) -> &[u64] {
        &self.0
    }

    /// Number of segments. Root-level ids have depth 1.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// The final segment. Never zero.
    pub fn last_segment(&self) -> u64 {
        *self.0.last().expect("NodeId is never empty")
    }

    /// The enclosing identifier, or `None` for single-segment ids.
    pub fn parent(&self) -> Option<NodeId> {
        if self.0.len() < 2 {
            return None;
        }
        Some(NodeId(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Append segment `k` (one-based).
    pub fn child(&self, k: u64) -> Result<NodeId, NodeIdError> {
        if k == 0 {
            return Err(NodeIdError::ZeroSegment {
                input: self.to_string(),
                position: self.0.len(),
            });
        }
        let mut segments = self.0.clone();
        segments.push(k);
        Ok(NodeId(segments))
    }

    /// Strict-prefix relation: `1.2` is an ancestor of `1.2.3` but not of
    /// itself and not of `1.20`.
    pub fn is_ancestor_of(&self, other: &NodeId) -> bool {
        self.0.len() < other.0.len() && other.0[..self.0.len()] == self.0[..]
    }
}

fn format_segments(segments: &[u64]) -> String {
    segments
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_segments(&self.0))
    }
}

impl FromStr for NodeId {
    type Err = NodeIdError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.is_empty() {
            return Err(NodeIdError::Empty);
        }
        let mut segments = Vec::new();
        for (position, raw) in input.split('.').enumerate() {
            if raw.is_empty() {
                return Err(NodeIdError::EmptySegment {
                    input: input.to_string(),
                    position,
                });
            }
            // Strict decimal: `u64::from_str` would accept a leading `+`.
            if !raw.bytes().all(|b| b.is_ascii_digit()) {
                return Err(NodeIdError::InvalidSegment {
                    input: input.to_string(),
                    segment: raw.to_string(),
                });
            }
            let value: u64 = raw.parse().map_err(|_| NodeIdError::InvalidSegment {
                input: input.to_string(),
                segment: raw.to_string(),
            })?;
            if value == 0 {
                return Err(NodeIdError::ZeroSegment {
                    input: input.to_string(),
                    position,
                });
            }
            segments.push(value);
        }
        Ok(NodeId(segments))
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}
