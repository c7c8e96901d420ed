//! # Proof Graph Projection
//!
//! The deterministic fold of the ledger into nodes, dependencies, scopes,
//! challenges and claims. The same `apply` path serves two callers:
//!
//! - the coordination layer validates an operation by applying its event
//!   to the live projection right after the append (logic-class errors);
//! - `replay` folds a whole ledger at startup, wrapping any application
//!   failure into a corruption-class error carrying the sequence number,
//!   because an already-persisted event that fails validation means the
//!   ledger itself is inconsistent.
//!
//! Nothing in the fold reads the wall clock, so replay is deterministic;
//! lock expiry is evaluated at query time only.

use crate::domain::cycle::would_create_cycle;
use crate::domain::errors::GraphError;
use crate::domain::node::{content_hash, Challenge, ProofNode, TaintState};
use crate::domain::taint::{compute_taints, TaintInput};
use af_01_schema::{validate_epistemic_transition, EpistemicState, WorkflowState};
use af_02_ledger::{
    ChallengeClosedPayload, ChallengeOpenedPayload, DependencyAddedPayload, EventBody,
    EventLedger, LedgerEvent, LockAcquiredPayload, NodeCreatedPayload, ProofInitializedPayload,
    ScopeClosedPayload, ScopeOpenedPayload, StateTransitionedPayload,
};
use shared_types::{NodeId, Timestamp};
use std::collections::BTreeMap;

/// Most challenges that may be simultaneously open against one node.
pub const MAX_OPEN_CHALLENGES: u32 = 32;

/// Most trips through `needs_refinement` one node may take.
pub const MAX_REFINEMENT_TRIPS: u32 = 8;

/// A claim as recorded in the ledger. Expiry is evaluated lazily so the
/// fold itself stays clock-free.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedClaim {
    pub owner: String,
    pub acquired_at: Timestamp,
    pub expires_at: Timestamp,
}

impl RecordedClaim {
    pub fn is_expired(&self) -> bool {
        Timestamp::now() > self.expires_at
    }
}

/// The in-memory projection of one ledger.
#[derive(Debug, Clone, Default)]
pub struct ProofGraph {
    root_conjecture: Option<String>,
    initialized_by: Option<String>,
    nodes: BTreeMap<NodeId, ProofNode>,
    challenges: BTreeMap<String, Challenge>,
    /// Open `local_assume` ids, outermost first (LIFO).
    open_scopes: Vec<NodeId>,
    claims: BTreeMap<NodeId, RecordedClaim>,
}

impl ProofGraph {
    pub fn new() -> Self {
        ProofGraph::default()
    }

    /// Fold an entire ledger into a fresh projection.
    pub fn replay(ledger: &EventLedger) -> Result<Self, GraphError> {
        let mut graph = ProofGraph::new();
        for raw in ledger.read_all()? {
            let event = raw.decode()?;
            graph.apply(&event).map_err(|e| GraphError::ReplayFailed {
                seq: raw.seq,
                source: Box::new(e),
            })?;
        }
        tracing::debug!(nodes = graph.nodes.len(), "graph replay complete");
        Ok(graph)
    }

    /// Apply one event to the projection, validating every invariant.
    /// On error the projection is unchanged.
    pub fn apply(&mut self, event: &LedgerEvent) -> Result<(), GraphError> {
        match &event.body {
            EventBody::ProofInitialized(p) => self.apply_proof_initialized(p),
            EventBody::NodeCreated(p) => self.apply_node_created(event.timestamp, p),
            EventBody::DependencyAdded(p) => self.apply_dependency_added(p),
            EventBody::StateTransitioned(p) => self.apply_state_transitioned(p),
            EventBody::ChallengeOpened(p) => self.apply_challenge_opened(event.timestamp, p),
            EventBody::ChallengeClosed(p) => self.apply_challenge_closed(p),
            EventBody::LockAcquired(p) => self.apply_lock_acquired(event.timestamp, p),
            EventBody::LockReleased(p) => {
                self.claims.remove(&p.node_id);
                Ok(())
            }
            EventBody::LockReaped(p) => {
                self.claims.remove(&p.node_id);
                Ok(())
            }
            EventBody::ScopeOpened(p) => self.apply_scope_opened(p),
            EventBody::ScopeClosed(p) => self.apply_scope_closed(p),
        }
    }

    fn apply_proof_initialized(&mut self, p: &ProofInitializedPayload) -> Result<(), GraphError> {
        if self.root_conjecture.is_some() {
            return Err(GraphError::AlreadyInitialized);
        }
        self.root_conjecture = Some(p.conjecture.clone());
        self.initialized_by = Some(p.agent.clone());
        Ok(())
    }

    fn apply_node_created(
        &mut self,
        created_at: Timestamp,
        p: &NodeCreatedPayload,
    ) -> Result<(), GraphError> {
        if self.nodes.contains_key(&p.node_id) {
            return Err(GraphError::AlreadyExists {
                node_id: p.node_id.clone(),
            });
        }
        if let Some(parent) = p.node_id.parent() {
            if !self.nodes.contains_key(&parent) {
                return Err(GraphError::ParentNotFound {
                    node_id: p.node_id.clone(),
                    parent,
                });
            }
        }
        for dep in &p.deps {
            if !self.nodes.contains_key(dep) {
                return Err(GraphError::NodeNotFound {
                    node_id: dep.clone(),
                });
            }
        }
        // Each dependency edge of the new node gets the same cycle check
        // as a post-creation edge; edges accepted earlier in the list are
        // part of the view for the later ones.
        for (accepted, dep) in p.deps.iter().enumerate() {
            let view = |id: &NodeId| -> Vec<NodeId> {
                if id == &p.node_id {
                    p.deps[..accepted].to_vec()
                } else {
                    self.deps_of(id)
                }
            };
            if let Some(path) = would_create_cycle(&p.node_id, dep, view) {
                return Err(GraphError::DependencyCycle { path });
            }
        }
        if p.scope_stack != self.open_scopes {
            return Err(GraphError::ScopeViolation {
                message: format!(
                    "node {} recorded scopes [{}] but [{}] are open",
                    p.node_id,
                    join_ids(&p.scope_stack),
                    join_ids(&self.open_scopes)
                ),
            });
        }
        if p.kind.closes_scope() && self.open_scopes.is_empty() {
            return Err(GraphError::ScopeViolation {
                message: format!("discharge node {} has no open scope to close", p.node_id),
            });
        }
        let computed = content_hash(
            &p.node_id,
            p.kind,
            &p.conjecture,
            p.inference,
            p.justification.as_deref(),
            &p.deps,
            &p.scope_stack,
        );
        if computed != p.content_hash {
            return Err(GraphError::ContentHashMismatch {
                node_id: p.node_id.clone(),
                stored: p.content_hash.clone(),
                computed,
            });
        }

        self.nodes.insert(
            p.node_id.clone(),
            ProofNode {
                id: p.node_id.clone(),
                kind: p.kind,
                conjecture: p.conjecture.clone(),
                inference: p.inference,
                justification: p.justification.clone(),
                deps: p.deps.clone(),
                scope_stack: p.scope_stack.clone(),
                content_hash: p.content_hash.clone(),
                epistemic: EpistemicState::Pending,
                taint: TaintState::Unresolved,
                open_blocking_challenges: 0,
                refinement_trips: 0,
                created_at,
                created_by: p.agent.clone(),
            },
        );
        self.recompute_taints();
        Ok(())
    }

    fn apply_dependency_added(&mut self, p: &DependencyAddedPayload) -> Result<(), GraphError> {
        if !self.nodes.contains_key(&p.from) {
            return Err(GraphError::NodeNotFound {
                node_id: p.from.clone(),
            });
        }
        if !self.nodes.contains_key(&p.to) {
            return Err(GraphError::NodeNotFound {
                node_id: p.to.clone(),
            });
        }
        if let Some(path) = self.would_create_cycle(&p.from, &p.to) {
            return Err(GraphError::DependencyCycle { path });
        }
        if let Some(node) = self.nodes.get_mut(&p.from) {
            node.deps.push(p.to.clone());
        }
        self.recompute_taints();
        Ok(())
    }

    fn apply_state_transitioned(&mut self, p: &StateTransitionedPayload) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get(&p.node_id)
            .ok_or_else(|| GraphError::NodeNotFound {
                node_id: p.node_id.clone(),
            })?;

        if node.epistemic != p.from {
            return Err(GraphError::StateMismatch {
                node_id: p.node_id.clone(),
                expected: p.from.as_str().to_string(),
                actual: node.epistemic.as_str().to_string(),
            });
        }
        if node.epistemic.is_final() {
            return Err(GraphError::TerminalState {
                node_id: p.node_id.clone(),
                state: node.epistemic.as_str().to_string(),
            });
        }
        validate_epistemic_transition(p.from, p.to)?;

        // Open blocking challenges pin the node: the only way out of
        // pending/needs_refinement is refuted or archived (INVARIANT-5).
        let gated = matches!(
            p.from,
            EpistemicState::Pending | EpistemicState::NeedsRefinement
        );
        let escape = matches!(p.to, EpistemicState::Refuted | EpistemicState::Archived);
        if node.has_blocking_challenges() && gated && !escape {
            return Err(GraphError::NodeBlocked {
                node_id: p.node_id.clone(),
                open: node.open_blocking_challenges,
            });
        }
        if p.to == EpistemicState::NeedsRefinement
            && node.refinement_trips >= MAX_REFINEMENT_TRIPS
        {
            return Err(GraphError::RefinementLimitExceeded {
                node_id: p.node_id.clone(),
                limit: MAX_REFINEMENT_TRIPS,
            });
        }

        if let Some(node) = self.nodes.get_mut(&p.node_id) {
            node.epistemic = p.to;
            if p.to == EpistemicState::NeedsRefinement {
                node.refinement_trips += 1;
            }
        }
        self.recompute_taints();
        Ok(())
    }

    fn apply_challenge_opened(
        &mut self,
        opened_at: Timestamp,
        p: &ChallengeOpenedPayload,
    ) -> Result<(), GraphError> {
        if !self.nodes.contains_key(&p.node_id) {
            return Err(GraphError::NodeNotFound {
                node_id: p.node_id.clone(),
            });
        }
        if self.challenges.contains_key(&p.challenge_id) {
            return Err(GraphError::DuplicateChallenge {
                challenge_id: p.challenge_id.clone(),
            });
        }
        let open = self.open_challenges_for(&p.node_id).len() as u32;
        if open >= MAX_OPEN_CHALLENGES {
            return Err(GraphError::ChallengeLimitExceeded {
                node_id: p.node_id.clone(),
                limit: MAX_OPEN_CHALLENGES,
            });
        }

        self.challenges.insert(
            p.challenge_id.clone(),
            Challenge {
                challenge_id: p.challenge_id.clone(),
                node_id: p.node_id.clone(),
                target: p.target,
                severity: p.severity,
                text: p.text.clone(),
                opened_by: p.agent.clone(),
                opened_at,
                resolution: None,
            },
        );
        if p.severity.blocks_acceptance() {
            if let Some(node) = self.nodes.get_mut(&p.node_id) {
                node.open_blocking_challenges += 1;
            }
        }
        Ok(())
    }

    fn apply_challenge_closed(&mut self, p: &ChallengeClosedPayload) -> Result<(), GraphError> {
        let challenge = match self.challenges.get_mut(&p.challenge_id) {
            Some(challenge) if challenge.is_open() => challenge,
            _ => {
                return Err(GraphError::ChallengeNotFound {
                    challenge_id: p.challenge_id.clone(),
                })
            }
        };
        challenge.resolution = Some(p.resolution.clone());
        let was_blocking = challenge.severity.blocks_acceptance();
        let node_id = challenge.node_id.clone();
        if was_blocking {
            if let Some(node) = self.nodes.get_mut(&node_id) {
                node.open_blocking_challenges = node.open_blocking_challenges.saturating_sub(1);
            }
        }
        Ok(())
    }

    fn apply_lock_acquired(
        &mut self,
        acquired_at: Timestamp,
        p: &LockAcquiredPayload,
    ) -> Result<(), GraphError> {
        self.claims.insert(
            p.node_id.clone(),
            RecordedClaim {
                owner: p.owner.clone(),
                acquired_at,
                expires_at: p.expires_at,
            },
        );
        Ok(())
    }

    fn apply_scope_opened(&mut self, p: &ScopeOpenedPayload) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get(&p.node_id)
            .ok_or_else(|| GraphError::NodeNotFound {
                node_id: p.node_id.clone(),
            })?;
        if !node.kind.opens_scope() {
            return Err(GraphError::ScopeViolation {
                message: format!("node {} ({}) cannot open a scope", p.node_id, node.kind),
            });
        }
        if self.open_scopes.contains(&p.node_id) {
            return Err(GraphError::ScopeViolation {
                message: format!("scope of {} is already open", p.node_id),
            });
        }
        self.open_scopes.push(p.node_id.clone());
        Ok(())
    }

    fn apply_scope_closed(&mut self, p: &ScopeClosedPayload) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get(&p.node_id)
            .ok_or_else(|| GraphError::NodeNotFound {
                node_id: p.node_id.clone(),
            })?;
        if !node.kind.closes_scope() {
            return Err(GraphError::ScopeViolation {
                message: format!("node {} ({}) cannot close a scope", p.node_id, node.kind),
            });
        }
        match self.open_scopes.last() {
            Some(top) if top == &p.assume_id => {
                self.open_scopes.pop();
                Ok(())
            }
            Some(top) => Err(GraphError::ScopeViolation {
                message: format!(
                    "scope close of {} does not match innermost open scope {}",
                    p.assume_id, top
                ),
            }),
            None => Err(GraphError::ScopeViolation {
                message: format!("scope close of {} with no scope open", p.assume_id),
            }),
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn root_conjecture(&self) -> Option<&str> {
        self.root_conjecture.as_deref()
    }

    pub fn is_initialized(&self) -> bool {
        self.root_conjecture.is_some()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &NodeId) -> Option<&ProofNode> {
        self.nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All nodes in identifier order.
    pub fn nodes(&self) -> impl Iterator<Item = &ProofNode> {
        self.nodes.values()
    }

    /// Children of `parent` in sibling order.
    pub fn children_of(&self, parent: &NodeId) -> Vec<&ProofNode> {
        self.nodes
            .values()
            .filter(|node| node.id.parent().as_ref() == Some(parent))
            .collect()
    }

    /// The next fresh child id under `parent`: one past the highest
    /// existing sibling, starting at 1.
    pub fn next_child_id(&self, parent: &NodeId) -> NodeId {
        let next = self
            .children_of(parent)
            .iter()
            .map(|node| node.id.last_segment())
            .max()
            .unwrap_or(0)
            + 1;
        parent.child(next).expect("sibling segments start at 1")
    }

    /// The recorded dependency list of `id`, empty for unknown ids.
    pub fn deps_of(&self, id: &NodeId) -> Vec<NodeId> {
        self.nodes
            .get(id)
            .map(|node| node.deps.clone())
            .unwrap_or_default()
    }

    /// Would adding `from -> to` close a cycle? Returns the closed path.
    pub fn would_create_cycle(&self, from: &NodeId, to: &NodeId) -> Option<Vec<NodeId>> {
        would_create_cycle(from, to, |id| self.deps_of(id))
    }

    /// The open `local_assume` scopes, outermost first.
    pub fn open_scopes(&self) -> &[NodeId] {
        &self.open_scopes
    }

    pub fn challenge(&self, challenge_id: &str) -> Option<&Challenge> {
        self.challenges.get(challenge_id)
    }

    /// Open challenges against `id`, in challenge-id order.
    pub fn open_challenges_for(&self, id: &NodeId) -> Vec<&Challenge> {
        self.challenges
            .values()
            .filter(|c| c.is_open() && &c.node_id == id)
            .collect()
    }

    /// The claim recorded for `id`, expired or not.
    pub fn recorded_claim(&self, id: &NodeId) -> Option<&RecordedClaim> {
        self.claims.get(id)
    }

    /// Workflow status derived live: blocked beats claimed beats
    /// available. Claim expiry is evaluated against the wall clock here,
    /// at query time, never during the fold.
    pub fn workflow_of(&self, id: &NodeId) -> Option<WorkflowState> {
        let node = self.nodes.get(id)?;
        if node.has_blocking_challenges() {
            return Some(WorkflowState::Blocked);
        }
        match self.claims.get(id) {
            Some(claim) if !claim.is_expired() => Some(WorkflowState::Claimed),
            _ => Some(WorkflowState::Available),
        }
    }

    /// Node ids whose derived workflow is `available`, in id order.
    pub fn list_available(&self) -> Vec<NodeId> {
        self.nodes
            .keys()
            .filter(|id| self.workflow_of(id) == Some(WorkflowState::Available))
            .cloned()
            .collect()
    }

    /// Node ids whose derived workflow is `blocked`, in id order.
    pub fn list_blocked(&self) -> Vec<NodeId> {
        self.nodes
            .keys()
            .filter(|id| self.workflow_of(id) == Some(WorkflowState::Blocked))
            .cloned()
            .collect()
    }

    fn recompute_taints(&mut self) {
        let inputs: std::collections::HashMap<NodeId, TaintInput> = self
            .nodes
            .iter()
            .map(|(id, node)| {
                (
                    id.clone(),
                    TaintInput {
                        epistemic: node.epistemic,
                        deps: node.deps.clone(),
                    },
                )
            })
            .collect();
        let taints = compute_taints(&inputs);
        for (id, node) in self.nodes.iter_mut() {
            if let Some(taint) = taints.get(id) {
                node.taint = *taint;
            }
        }
    }
}

fn join_ids(ids: &[NodeId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
