//! # Ledger Events
//!
//! Typed payloads for every event kind the ledger recognises. The wire
//! form is an internally tagged JSON object: the `type` key selects the
//! payload, `timestamp` records when the emitter produced it, and the
//! payload fields sit alongside both. Sequence numbers live in the file
//! name, never in the payload.
//!
//! Enum-typed fields (`kind`, `target`, `severity`, `from`, `to`) use the
//! af-01 registry types directly, so an unknown value fails to
//! deserialise instead of entering the projection.

use af_01_schema::{ChallengeSeverity, ChallengeTarget, EpistemicState, InferenceKind, NodeKind};
use serde::{Deserialize, Serialize};
use shared_types::{NodeId, Timestamp};

/// Proof root registered; the first event of every ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofInitializedPayload {
    /// The top-level conjecture under proof.
    pub conjecture: String,
    /// Agent that initialised the proof.
    pub agent: String,
}

/// A node was added to the proof tree. The fields here are the node's
/// immutable identity; later events only change derived state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeCreatedPayload {
    pub node_id: NodeId,
    pub kind: NodeKind,
    pub conjecture: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inference: Option<InferenceKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    /// Ordered dependency list at creation.
    pub deps: Vec<NodeId>,
    /// Enclosing `local_assume` ids open at creation, outermost first.
    pub scope_stack: Vec<NodeId>,
    /// SHA-256 over the immutable fields, lowercase hex.
    pub content_hash: String,
    pub agent: String,
}

/// An edge `from -> to` was added after node creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyAddedPayload {
    pub from: NodeId,
    pub to: NodeId,
    pub agent: String,
}

/// An agent claimed exclusive authority over a node.
/// `acquired_at` is the event timestamp; only the deadline is payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockAcquiredPayload {
    pub node_id: NodeId,
    pub owner: String,
    pub expires_at: Timestamp,
}

/// The claim holder released its lock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockReleasedPayload {
    pub node_id: NodeId,
    pub owner: String,
}

/// An expired lock was reaped on the owner's behalf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockReapedPayload {
    pub node_id: NodeId,
    pub owner: String,
    /// Deadline the lock had already passed when reaped.
    pub expires_at: Timestamp,
}

/// A challenge was opened against a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeOpenedPayload {
    pub challenge_id: String,
    pub node_id: NodeId,
    pub target: ChallengeTarget,
    pub severity: ChallengeSeverity,
    pub text: String,
    pub agent: String,
}

/// An open challenge was resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeClosedPayload {
    pub challenge_id: String,
    pub resolution: String,
    pub agent: String,
}

/// A node moved through the epistemic state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTransitionedPayload {
    pub node_id: NodeId,
    pub from: EpistemicState,
    pub to: EpistemicState,
    pub reason: String,
    pub agent: String,
}

/// A `local_assume` node opened its scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeOpenedPayload {
    pub node_id: NodeId,
}

/// A `local_discharge` node closed the innermost open scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeClosedPayload {
    /// The discharging node.
    pub node_id: NodeId,
    /// The `local_assume` being discharged; must be the stack top.
    pub assume_id: NodeId,
}

/// Every event kind the ledger recognises, tagged by the `type` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventBody {
    ProofInitialized(ProofInitializedPayload),
    NodeCreated(NodeCreatedPayload),
    DependencyAdded(DependencyAddedPayload),
    LockAcquired(LockAcquiredPayload),
    LockReleased(LockReleasedPayload),
    LockReaped(LockReapedPayload),
    ChallengeOpened(ChallengeOpenedPayload),
    ChallengeClosed(ChallengeClosedPayload),
    StateTransitioned(StateTransitionedPayload),
    ScopeOpened(ScopeOpenedPayload),
    ScopeClosed(ScopeClosedPayload),
}

impl EventBody {
    /// The wire value of the `type` key.
    pub fn kind(&self) -> &'static str {
        match self {
            EventBody::ProofInitialized(_) => "proof_initialized",
            EventBody::NodeCreated(_) => "node_created",
            EventBody::DependencyAdded(_) => "dependency_added",
            EventBody::LockAcquired(_) => "lock_acquired",
            EventBody::LockReleased(_) => "lock_released",
            EventBody::LockReaped(_) => "lock_reaped",
            EventBody::ChallengeOpened(_) => "challenge_opened",
            EventBody::ChallengeClosed(_) => "challenge_closed",
            EventBody::StateTransitioned(_) => "state_transitioned",
            EventBody::ScopeOpened(_) => "scope_opened",
            EventBody::ScopeClosed(_) => "scope_closed",
        }
    }

    /// Whether this kind is consumed by the lock manager.
    pub fn is_lock_event(&self) -> bool {
        matches!(
            self,
            EventBody::LockAcquired(_) | EventBody::LockReleased(_) | EventBody::LockReaped(_)
        )
    }

    /// The node a lock event refers to, if this is one.
    pub fn lock_node_id(&self) -> Option<&NodeId> {
        match self {
            EventBody::LockAcquired(p) => Some(&p.node_id),
            EventBody::LockReleased(p) => Some(&p.node_id),
            EventBody::LockReaped(p) => Some(&p.node_id),
            _ => None,
        }
    }
}

/// A complete ledger event: envelope timestamp plus tagged body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub body: EventBody,
}

impl LedgerEvent {
    /// Wrap a body with the current wall-clock timestamp.
    pub fn now(body: EventBody) -> Self {
        LedgerEvent {
            timestamp: Timestamp::now(),
            body,
        }
    }

    /// Wrap a body with an explicit timestamp.
    pub fn at(timestamp: Timestamp, body: EventBody) -> Self {
        LedgerEvent { timestamp, body }
    }

    /// The wire value of the `type` key.
    pub fn kind(&self) -> &'static str {
        self.body.kind()
    }
}
