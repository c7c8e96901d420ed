//! # Taint Propagation
//!
//! Recomputes the derived taint of every node from epistemic states and
//! the dependency closure. The rules, applied in order:
//!
//! 1. `pending` / `needs_refinement`            -> `unresolved`
//! 2. any dependency-ancestor `unresolved`      -> `unresolved`
//! 3. own state introduces taint (`admitted`)   -> `self_admitted`
//! 4. any ancestor `tainted` / `self_admitted`  -> `tainted`
//! 5. otherwise                                 -> `clean`
//!
//! Ancestors are the transitive dependency closure: the nodes a
//! conjecture's validity actually rests on. The computation memoises per
//! node and visits dependencies in their recorded order, so it is
//! deterministic for any valid replay order of the same ledger.

use crate::domain::node::TaintState;
use af_01_schema::EpistemicState;
use shared_types::NodeId;
use std::collections::HashMap;

/// Inputs the taint rules need per node.
#[derive(Debug, Clone)]
pub struct TaintInput {
    pub epistemic: EpistemicState,
    pub deps: Vec<NodeId>,
}

/// Compute taint for every node in `inputs`.
pub fn compute_taints(inputs: &HashMap<NodeId, TaintInput>) -> HashMap<NodeId, TaintState> {
    let mut memo: HashMap<NodeId, TaintState> = HashMap::new();
    // Deterministic outer order; inner recursion follows recorded dep
    // order. The dependency graph is a DAG (cycles are rejected at add
    // time), so the recursion terminates.
    let mut ids: Vec<&NodeId> = inputs.keys().collect();
    ids.sort();
    for id in ids {
        taint_of(id, inputs, &mut memo);
    }
    memo
}

fn taint_of(
    id: &NodeId,
    inputs: &HashMap<NodeId, TaintInput>,
    memo: &mut HashMap<NodeId, TaintState>,
) -> TaintState {
    if let Some(taint) = memo.get(id) {
        return *taint;
    }
    let Some(input) = inputs.get(id) else {
        // Dangling dependency ids are leaves and contribute nothing.
        return TaintState::Clean;
    };

    let taint = if matches!(
        input.epistemic,
        EpistemicState::Pending | EpistemicState::NeedsRefinement
    ) {
        TaintState::Unresolved
    } else {
        let mut any_unresolved = false;
        let mut any_tainted = false;
        for dep in &input.deps {
            match taint_of(dep, inputs, memo) {
                TaintState::Unresolved => any_unresolved = true,
                TaintState::Tainted | TaintState::SelfAdmitted => any_tainted = true,
                TaintState::Clean => {}
            }
        }
        if any_unresolved {
            TaintState::Unresolved
        } else if input.epistemic.introduces_taint() {
            TaintState::SelfAdmitted
        } else if any_tainted {
            TaintState::Tainted
        } else {
            TaintState::Clean
        }
    };

    memo.insert(id.clone(), taint);
    taint
}
