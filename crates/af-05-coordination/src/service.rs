//! # Coordinator
//!
//! One `Coordinator` per agent per proof root. Mutating operations
//! rehearse their events on a copy of the projection before anything is
//! appended, so an invalid event can never reach the ledger from here;
//! what another process appends is its own responsibility and is caught
//! by replay.

use crate::config::MetaConfig;
use crate::errors::CoordError;
use af_01_schema::{
    ChallengeSeverity, ChallengeTarget, EpistemicState, InferenceKind, NodeKind, WorkflowState,
};
use af_02_ledger::{
    ChallengeClosedPayload, ChallengeOpenedPayload, DependencyAddedPayload, EventBody,
    EventLedger, LedgerEvent, NodeCreatedPayload, ProofInitializedPayload, ScopeClosedPayload,
    ScopeOpenedPayload, StateTransitionedPayload,
};
use af_03_locks::{ClaimLock, LockError, PersistentLockManager};
use af_04_graph::{content_hash, Challenge, GraphError, ProofGraph, TaintState};
use shared_types::{NodeId, Timestamp};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

/// The claim visible on a node, by value.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimSnapshot {
    pub owner: String,
    pub acquired_at: Timestamp,
    pub expires_at: Timestamp,
}

/// Everything an agent can see about one node, by value.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub kind: NodeKind,
    pub conjecture: String,
    pub inference: Option<InferenceKind>,
    pub justification: Option<String>,
    pub deps: Vec<NodeId>,
    pub scope_stack: Vec<NodeId>,
    pub content_hash: String,
    pub epistemic: EpistemicState,
    pub workflow: WorkflowState,
    pub taint: TaintState,
    pub open_challenges: Vec<Challenge>,
    pub claim: Option<ClaimSnapshot>,
    pub created_at: Timestamp,
    pub created_by: String,
}

/// Proof-wide summary counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofStatus {
    pub conjecture: Option<String>,
    pub nodes: u64,
    /// Node counts per epistemic state, in state-name order.
    pub by_epistemic: BTreeMap<String, u64>,
    /// Node counts per taint state, in state-name order.
    pub by_taint: BTreeMap<String, u64>,
    pub open_challenges: u64,
    pub active_claims: u64,
    pub available: u64,
    pub blocked: u64,
}

/// The agent-facing coordination surface over one shared proof root.
pub struct Coordinator {
    agent: String,
    config: MetaConfig,
    ledger: EventLedger,
    locks: PersistentLockManager,
    graph: Mutex<ProofGraph>,
}

impl Coordinator {
    /// Open a proof root; the ledger lives in `<root>/ledger`.
    pub fn open<P: AsRef<Path>>(
        root: P,
        agent: &str,
        config: MetaConfig,
    ) -> Result<Self, CoordError> {
        let ledger = EventLedger::open(root.as_ref().join("ledger"))?;
        Self::with_ledger(ledger, agent, config)
    }

    /// Open over an existing ledger handle.
    pub fn with_ledger(
        ledger: EventLedger,
        agent: &str,
        config: MetaConfig,
    ) -> Result<Self, CoordError> {
        let agent = agent.trim();
        if agent.is_empty() {
            return Err(CoordError::EmptyAgent);
        }
        config.validate()?;
        let locks = PersistentLockManager::open(ledger.clone())?;
        let graph = ProofGraph::replay(&ledger)?;
        Ok(Coordinator {
            agent: agent.to_string(),
            config,
            ledger,
            locks,
            graph: Mutex::new(graph),
        })
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn config(&self) -> &MetaConfig {
        &self.config
    }

    pub fn ledger(&self) -> &EventLedger {
        &self.ledger
    }

    fn graph(&self) -> MutexGuard<'_, ProofGraph> {
        self.graph.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Rebuild the projection from the ledger.
    pub fn refresh(&self) -> Result<(), CoordError> {
        let rebuilt = ProofGraph::replay(&self.ledger)?;
        *self.graph() = rebuilt;
        Ok(())
    }

    fn require_claim(&self, node_id: &NodeId) -> Result<ClaimLock, CoordError> {
        match self.locks.info(node_id) {
            Some(lock) if lock.is_owned_by(&self.agent) => Ok(lock),
            Some(lock) => Err(LockError::NotClaimHolder {
                node_id: node_id.clone(),
                owner: self.agent.clone(),
                holder: lock.owner(),
            }
            .into()),
            None => Err(LockError::NotLocked {
                node_id: node_id.clone(),
            }
            .into()),
        }
    }

    /// Rehearse `events` on a copy of the projection, append them, then
    /// fold them into the live projection.
    fn commit(&self, events: &[LedgerEvent]) -> Result<(), CoordError> {
        let mut guard = self.graph();
        let mut preview = guard.clone();
        for event in events {
            preview.apply(event)?;
        }
        for event in events {
            self.ledger.append(event)?;
        }
        for event in events {
            // The preview already accepted these exact events.
            guard.apply(event)?;
        }
        Ok(())
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Initialise a fresh proof root; returns the root node id `1`.
    pub fn init(&self, conjecture: &str) -> Result<NodeId, CoordError> {
        let conjecture = conjecture.trim();
        if conjecture.is_empty() {
            return Err(CoordError::EmptyInput { field: "conjecture" });
        }
        self.refresh()?;
        if self.graph().is_initialized() || self.ledger.count()? > 0 {
            return Err(GraphError::AlreadyInitialized.into());
        }

        let root = NodeId::root();
        let hash = content_hash(&root, NodeKind::Claim, conjecture, None, None, &[], &[]);
        let events = vec![
            LedgerEvent::now(EventBody::ProofInitialized(ProofInitializedPayload {
                conjecture: conjecture.to_string(),
                agent: self.agent.clone(),
            })),
            LedgerEvent::now(EventBody::NodeCreated(NodeCreatedPayload {
                node_id: root.clone(),
                kind: NodeKind::Claim,
                conjecture: conjecture.to_string(),
                inference: None,
                justification: None,
                deps: Vec::new(),
                scope_stack: Vec::new(),
                content_hash: hash,
                agent: self.agent.clone(),
            })),
        ];
        self.commit(&events)?;
        tracing::debug!(agent = %self.agent, "proof initialized");
        Ok(root)
    }

    /// Claim exclusive authority over a node. `timeout` defaults to the
    /// configured `lock_timeout`.
    pub fn claim(
        &self,
        node_id: &NodeId,
        timeout: Option<Duration>,
    ) -> Result<ClaimLock, CoordError> {
        let timeout = timeout.unwrap_or_else(|| self.config.lock_timeout());
        self.refresh()?;
        {
            let graph = self.graph();
            let Some(node) = graph.node(node_id) else {
                return Err(GraphError::NodeNotFound {
                    node_id: node_id.clone(),
                }
                .into());
            };
            if node.has_blocking_challenges() {
                return Err(GraphError::NodeBlocked {
                    node_id: node_id.clone(),
                    open: node.open_blocking_challenges,
                }
                .into());
            }
        }
        let lock = self.locks.acquire(node_id, &self.agent, timeout)?;
        // The acquire appended an event; fold it (and anything else that
        // landed meanwhile) into the projection.
        self.refresh()?;
        Ok(lock)
    }

    /// Release the caller's claim.
    pub fn release(&self, node_id: &NodeId) -> Result<(), CoordError> {
        self.locks.release(node_id, &self.agent)?;
        self.refresh()?;
        Ok(())
    }

    /// Extend the caller's claim to `now() + timeout` without touching
    /// the ledger.
    pub fn refresh_claim(
        &self,
        node_id: &NodeId,
        timeout: Option<Duration>,
    ) -> Result<ClaimLock, CoordError> {
        let timeout = timeout.unwrap_or_else(|| self.config.lock_timeout());
        let lock = self.require_claim(node_id)?;
        lock.refresh(timeout)?;
        Ok(lock)
    }

    /// Add a child under `parent`; the caller must hold the claim on
    /// `parent` for the duration. Returns the new id.
    #[allow(clippy::too_many_arguments)]
    pub fn add_child(
        &self,
        parent: &NodeId,
        kind: NodeKind,
        conjecture: &str,
        inference: Option<InferenceKind>,
        justification: Option<&str>,
        deps: Vec<NodeId>,
    ) -> Result<NodeId, CoordError> {
        let conjecture = conjecture.trim();
        if conjecture.is_empty() {
            return Err(CoordError::EmptyInput { field: "conjecture" });
        }
        self.refresh()?;
        if !self.graph().contains(parent) {
            return Err(GraphError::NodeNotFound {
                node_id: parent.clone(),
            }
            .into());
        }
        self.require_claim(parent)?;

        let (new_id, scope_stack, assume_to_close) = {
            let graph = self.graph();
            let new_id = graph.next_child_id(parent);
            if new_id.depth() as u32 > self.config.max_depth {
                return Err(CoordError::DepthExceeded {
                    node_id: new_id,
                    max_depth: self.config.max_depth,
                });
            }
            if graph.children_of(parent).len() as u32 >= self.config.max_children {
                return Err(CoordError::ChildLimitExceeded {
                    parent: parent.clone(),
                    max_children: self.config.max_children,
                });
            }
            if new_id.depth() as u32 >= self.config.warn_depth {
                tracing::warn!(node_id = %new_id, depth = new_id.depth(), "node depth at or past warn_depth");
            }
            let scope_stack = graph.open_scopes().to_vec();
            let assume_to_close = scope_stack.last().cloned();
            (new_id, scope_stack, assume_to_close)
        };

        let hash = content_hash(
            &new_id,
            kind,
            conjecture,
            inference,
            justification,
            &deps,
            &scope_stack,
        );
        let mut events = vec![LedgerEvent::now(EventBody::NodeCreated(NodeCreatedPayload {
            node_id: new_id.clone(),
            kind,
            conjecture: conjecture.to_string(),
            inference,
            justification: justification.map(str::to_string),
            deps,
            scope_stack,
            content_hash: hash,
            agent: self.agent.clone(),
        }))];
        if kind.opens_scope() {
            events.push(LedgerEvent::now(EventBody::ScopeOpened(ScopeOpenedPayload {
                node_id: new_id.clone(),
            })));
        }
        if kind.closes_scope() {
            let assume_id = assume_to_close.ok_or_else(|| GraphError::ScopeViolation {
                message: format!("discharge node {} has no open scope to close", new_id),
            })?;
            events.push(LedgerEvent::now(EventBody::ScopeClosed(ScopeClosedPayload {
                node_id: new_id.clone(),
                assume_id,
            })));
        }

        self.commit(&events)?;
        tracing::debug!(node_id = %new_id, kind = %kind, "child added");
        Ok(new_id)
    }

    /// Record that `from` additionally depends on `to`. The caller must
    /// hold the claim on `from`.
    pub fn add_dependency(&self, from: &NodeId, to: &NodeId) -> Result<(), CoordError> {
        self.refresh()?;
        self.require_claim(from)?;
        let event = LedgerEvent::now(EventBody::DependencyAdded(DependencyAddedPayload {
            from: from.clone(),
            to: to.clone(),
            agent: self.agent.clone(),
        }));
        self.commit(&[event])?;
        Ok(())
    }

    /// Open a challenge against a node; returns the challenge id.
    pub fn open_challenge(
        &self,
        node_id: &NodeId,
        target: ChallengeTarget,
        severity: ChallengeSeverity,
        text: &str,
    ) -> Result<String, CoordError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CoordError::EmptyInput { field: "challenge text" });
        }
        self.refresh()?;
        let challenge_id = Uuid::new_v4().to_string();
        let event = LedgerEvent::now(EventBody::ChallengeOpened(ChallengeOpenedPayload {
            challenge_id: challenge_id.clone(),
            node_id: node_id.clone(),
            target,
            severity,
            text: text.to_string(),
            agent: self.agent.clone(),
        }));
        self.commit(&[event])?;
        tracing::debug!(%node_id, challenge_id, severity = %severity, "challenge opened");
        Ok(challenge_id)
    }

    /// Close an open challenge. Only the opening agent or the current
    /// claim holder of the challenged node may close it.
    pub fn close_challenge(
        &self,
        challenge_id: &str,
        resolution: &str,
    ) -> Result<(), CoordError> {
        let resolution = resolution.trim();
        if resolution.is_empty() {
            return Err(CoordError::EmptyInput { field: "resolution" });
        }
        self.refresh()?;
        let (node_id, opened_by) = {
            let graph = self.graph();
            match graph.challenge(challenge_id) {
                Some(challenge) if challenge.is_open() => {
                    (challenge.node_id.clone(), challenge.opened_by.clone())
                }
                _ => {
                    return Err(GraphError::ChallengeNotFound {
                        challenge_id: challenge_id.to_string(),
                    }
                    .into())
                }
            }
        };
        if opened_by != self.agent {
            // Not the opener: closing requires authority over the node.
            self.require_claim(&node_id)?;
        }
        let event = LedgerEvent::now(EventBody::ChallengeClosed(ChallengeClosedPayload {
            challenge_id: challenge_id.to_string(),
            resolution: resolution.to_string(),
            agent: self.agent.clone(),
        }));
        self.commit(&[event])?;
        Ok(())
    }

    /// Move a node through the epistemic state machine. The caller must
    /// hold the claim on the node.
    pub fn transition(
        &self,
        node_id: &NodeId,
        to: EpistemicState,
        reason: &str,
    ) -> Result<(), CoordError> {
        self.refresh()?;
        self.require_claim(node_id)?;
        let from = {
            let graph = self.graph();
            graph
                .node(node_id)
                .map(|node| node.epistemic)
                .ok_or_else(|| GraphError::NodeNotFound {
                    node_id: node_id.clone(),
                })?
        };
        let event = LedgerEvent::now(EventBody::StateTransitioned(StateTransitionedPayload {
            node_id: node_id.clone(),
            from,
            to,
            reason: reason.to_string(),
            agent: self.agent.clone(),
        }));
        self.commit(&[event])?;
        tracing::debug!(%node_id, from = %from, to = %to, "state transitioned");
        Ok(())
    }

    /// Reap every expired claim into the ledger.
    pub fn reap_expired(&self) -> Result<Vec<ClaimLock>, CoordError> {
        let reaped = self.locks.reap_expired();
        if !reaped.is_empty() {
            self.refresh()?;
        }
        Ok(reaped)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Every node id in the projection, in id order.
    pub fn list_nodes(&self) -> Vec<NodeId> {
        self.graph().nodes().map(|node| node.id.clone()).collect()
    }

    /// Node ids an agent could claim right now, in id order.
    pub fn list_available(&self) -> Vec<NodeId> {
        self.graph().list_available()
    }

    /// Node ids pinned by open blocking challenges, in id order.
    pub fn list_blocked(&self) -> Vec<NodeId> {
        self.graph().list_blocked()
    }

    /// Proof-wide summary for dashboards and agent scheduling.
    pub fn status(&self) -> ProofStatus {
        let graph = self.graph();
        let mut by_epistemic: BTreeMap<String, u64> = BTreeMap::new();
        let mut by_taint: BTreeMap<String, u64> = BTreeMap::new();
        let mut open_challenges = 0u64;
        for node in graph.nodes() {
            *by_epistemic
                .entry(node.epistemic.as_str().to_string())
                .or_insert(0) += 1;
            *by_taint.entry(node.taint.as_str().to_string()).or_insert(0) += 1;
            open_challenges += graph.open_challenges_for(&node.id).len() as u64;
        }
        ProofStatus {
            conjecture: graph.root_conjecture().map(str::to_string),
            nodes: graph.node_count() as u64,
            by_epistemic,
            by_taint,
            open_challenges,
            active_claims: self.locks.list_all().len() as u64,
            available: graph.list_available().len() as u64,
            blocked: graph.list_blocked().len() as u64,
        }
    }

    /// Full by-value view of one node.
    pub fn info(&self, node_id: &NodeId) -> Result<NodeSnapshot, CoordError> {
        let graph = self.graph();
        let node = graph.node(node_id).ok_or_else(|| GraphError::NodeNotFound {
            node_id: node_id.clone(),
        })?;
        let workflow = graph
            .workflow_of(node_id)
            .unwrap_or(WorkflowState::Available);
        let open_challenges = graph
            .open_challenges_for(node_id)
            .into_iter()
            .cloned()
            .collect();
        let claim = self.locks.info(node_id).map(|lock| ClaimSnapshot {
            owner: lock.owner(),
            acquired_at: lock.acquired_at(),
            expires_at: lock.expires_at(),
        });
        Ok(NodeSnapshot {
            id: node.id.clone(),
            kind: node.kind,
            conjecture: node.conjecture.clone(),
            inference: node.inference,
            justification: node.justification.clone(),
            deps: node.deps.clone(),
            scope_stack: node.scope_stack.clone(),
            content_hash: node.content_hash.clone(),
            epistemic: node.epistemic,
            workflow,
            taint: node.taint,
            open_challenges,
            claim,
            created_at: node.created_at,
            created_by: node.created_by.clone(),
        })
    }
}
