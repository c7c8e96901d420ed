//! # Projection Audit
//!
//! Whole-graph invariant checks, written as plain predicate functions so
//! they can gate tests, health checks and post-incident inspection of a
//! replayed projection. The fold in `service.rs` prevents these from ever
//! failing on a ledger it accepted; the audit exists to prove that on
//! demand, and to catch drift when projections are mutated by future
//! code paths.

use crate::domain::cycle::find_cycle;
use crate::domain::taint::{compute_taints, TaintInput};
use crate::service::ProofGraph;
use std::collections::HashMap;
use shared_types::NodeId;

/// INVARIANT-1: every event-referenced entity resolves. All dependency
/// ids and recorded scope ids refer to existing nodes.
pub fn invariant_references_resolve(graph: &ProofGraph) -> bool {
    graph.nodes().all(|node| {
        node.deps.iter().all(|dep| graph.contains(dep))
            && node.scope_stack.iter().all(|scope| graph.contains(scope))
    })
}

/// INVARIANT-2: the dependency graph is acyclic.
pub fn invariant_acyclic(graph: &ProofGraph) -> bool {
    graph
        .nodes()
        .all(|node| find_cycle(&node.id, |id| graph.deps_of(id)).is_none())
}

/// INVARIANT-3: scope discipline. Open scopes name existing
/// scope-opening nodes, and every recorded stack is made of
/// scope-opening nodes.
pub fn invariant_scopes_well_formed(graph: &ProofGraph) -> bool {
    let opens = |id: &NodeId| {
        graph
            .node(id)
            .map(|node| node.kind.opens_scope())
            .unwrap_or(false)
    };
    graph.open_scopes().iter().all(opens)
        && graph
            .nodes()
            .all(|node| node.scope_stack.iter().all(opens))
}

/// INVARIANT-4: stored content hashes match the immutable fields.
pub fn invariant_hashes_match(graph: &ProofGraph) -> bool {
    graph.nodes().all(|node| {
        crate::domain::node::content_hash(
            &node.id,
            node.kind,
            &node.conjecture,
            node.inference,
            node.justification.as_deref(),
            &node.deps,
            &node.scope_stack,
        ) == node.content_hash
    })
}

/// INVARIANT-5: blocking counters equal the open blocking challenges
/// registered against each node.
pub fn invariant_challenge_counters_match(graph: &ProofGraph) -> bool {
    graph.nodes().all(|node| {
        let open_blocking = graph
            .open_challenges_for(&node.id)
            .iter()
            .filter(|c| c.severity.blocks_acceptance())
            .count() as u32;
        node.open_blocking_challenges == open_blocking
    })
}

/// INVARIANT-6: stored taint equals a fresh recomputation.
pub fn invariant_taint_consistent(graph: &ProofGraph) -> bool {
    let inputs: HashMap<NodeId, TaintInput> = graph
        .nodes()
        .map(|node| {
            (
                node.id.clone(),
                TaintInput {
                    epistemic: node.epistemic,
                    deps: node.deps.clone(),
                },
            )
        })
        .collect();
    let fresh = compute_taints(&inputs);
    graph
        .nodes()
        .all(|node| fresh.get(&node.id) == Some(&node.taint))
}

/// Run every invariant; returns the names of the violated ones.
pub fn audit(graph: &ProofGraph) -> Vec<&'static str> {
    let checks: [(&'static str, fn(&ProofGraph) -> bool); 6] = [
        ("references_resolve", invariant_references_resolve),
        ("acyclic", invariant_acyclic),
        ("scopes_well_formed", invariant_scopes_well_formed),
        ("hashes_match", invariant_hashes_match),
        (
            "challenge_counters_match",
            invariant_challenge_counters_match,
        ),
        ("taint_consistent", invariant_taint_consistent),
    ];
    checks
        .iter()
        .filter(|(_, check)| !check(graph))
        .map(|(name, _)| *name)
        .collect()
}
