//! # Proof Nodes and Challenges
//!
//! A node's immutable identity (kind, conjecture, inference, dependency
//! list, scope stack at creation) is fixed by its `node_created` event and
//! covered by a content hash; everything else here is derived from later
//! events during the fold.

use af_01_schema::{
    ChallengeSeverity, ChallengeTarget, EpistemicState, InferenceKind, NodeKind,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::{NodeId, Timestamp};
use std::fmt;

/// Derived taint of a node: whether its validity rests on an `admitted`
/// ancestor somewhere in its dependency closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaintState {
    /// Fully resolved and resting only on verified work.
    Clean,
    /// This node itself is `admitted`.
    SelfAdmitted,
    /// A dependency (transitively) is admitted or tainted.
    Tainted,
    /// This node, or something it rests on, is still unresolved.
    Unresolved,
}

impl TaintState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaintState::Clean => "clean",
            TaintState::SelfAdmitted => "self_admitted",
            TaintState::Tainted => "tainted",
            TaintState::Unresolved => "unresolved",
        }
    }
}

impl fmt::Display for TaintState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A challenge raised against one aspect of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub challenge_id: String,
    pub node_id: NodeId,
    pub target: ChallengeTarget,
    pub severity: ChallengeSeverity,
    pub text: String,
    pub opened_by: String,
    pub opened_at: Timestamp,
    /// Set when the challenge is closed.
    pub resolution: Option<String>,
}

impl Challenge {
    pub fn is_open(&self) -> bool {
        self.resolution.is_none()
    }

    /// Open challenges of blocking severity pin the node (INVARIANT-5).
    pub fn blocks_acceptance(&self) -> bool {
        self.is_open() && self.severity.blocks_acceptance()
    }
}

/// A vertex of the proof graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ProofNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub conjecture: String,
    pub inference: Option<InferenceKind>,
    pub justification: Option<String>,
    /// Ordered dependency multiset recorded at creation plus later
    /// `dependency_added` events.
    pub deps: Vec<NodeId>,
    /// Enclosing `local_assume` ids open at creation, outermost first.
    pub scope_stack: Vec<NodeId>,
    /// SHA-256 over the immutable fields, lowercase hex.
    pub content_hash: String,
    pub epistemic: EpistemicState,
    pub taint: TaintState,
    /// Count of open challenges whose severity blocks acceptance.
    pub open_blocking_challenges: u32,
    /// Times this node has entered `needs_refinement`.
    pub refinement_trips: u32,
    pub created_at: Timestamp,
    pub created_by: String,
}

impl ProofNode {
    pub fn has_blocking_challenges(&self) -> bool {
        self.open_blocking_challenges > 0
    }
}

/// Deterministic content hash over a node's immutable fields.
///
/// Every field is length-prefixed before hashing so no concatenation of
/// values can collide with another field split.
pub fn content_hash(
    id: &NodeId,
    kind: NodeKind,
    conjecture: &str,
    inference: Option<InferenceKind>,
    justification: Option<&str>,
    deps: &[NodeId],
    scope_stack: &[NodeId],
) -> String {
    let mut hasher = Sha256::new();
    hash_field(&mut hasher, id.to_string().as_bytes());
    hash_field(&mut hasher, kind.as_str().as_bytes());
    hash_field(&mut hasher, conjecture.as_bytes());
    hash_field(
        &mut hasher,
        inference.map(|i| i.as_str()).unwrap_or("").as_bytes(),
    );
    hash_field(&mut hasher, justification.unwrap_or("").as_bytes());
    hash_field(&mut hasher, &(deps.len() as u64).to_be_bytes());
    for dep in deps {
        hash_field(&mut hasher, dep.to_string().as_bytes());
    }
    hash_field(&mut hasher, &(scope_stack.len() as u64).to_be_bytes());
    for scope in scope_stack {
        hash_field(&mut hasher, scope.to_string().as_bytes());
    }
    hex::encode(hasher.finalize())
}

fn hash_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}
