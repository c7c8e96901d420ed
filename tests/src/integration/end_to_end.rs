//! # End-to-End Choreography
//!
//! One full proof lifecycle with three agents over a shared root:
//! construction under claims, a scoped conditional argument, review with
//! blocking challenges, a refinement round, an admitted shortcut with its
//! taint, and a final audit of both the ledger and the projection.

#[cfg(test)]
mod tests {
    use af_01_schema::{
        ChallengeSeverity, ChallengeTarget, EpistemicState, InferenceKind, NodeKind,
    };
    use af_02_ledger::{verify_ledger, EventLedger};
    use af_04_graph::{audit, ProofGraph, TaintState};
    use af_05_coordination::{Coordinator, MetaConfig};
    use shared_types::NodeId;
    use std::path::Path;

    fn node(id: &str) -> NodeId {
        id.parse().unwrap()
    }

    fn agent(root: &Path, name: &str) -> Coordinator {
        Coordinator::open(root, name, MetaConfig::default()).unwrap()
    }

    #[test]
    fn test_full_proof_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        // -- Construction ----------------------------------------------------
        let alice = agent(root, "alice");
        alice.init("every widget admits a frobnication").unwrap();
        alice.claim(&node("1"), None).unwrap();

        // A scoped conditional argument: assume, derive, discharge.
        let assume = alice
            .add_child(&node("1"), NodeKind::LocalAssume, "assume w is a widget", None, None, vec![])
            .unwrap();
        let derive = alice
            .add_child(
                &node("1"),
                NodeKind::Claim,
                "w admits a frobnication",
                Some(InferenceKind::ForallElim),
                Some("by the structure lemma"),
                vec![],
            )
            .unwrap();
        let discharge = alice
            .add_child(
                &node("1"),
                NodeKind::LocalDischarge,
                "widgethood implies frobnication",
                Some(InferenceKind::ImpliesIntro),
                None,
                vec![derive.clone()],
            )
            .unwrap();
        // A flat supporting lemma, plus the closing step.
        let lemma = alice
            .add_child(&node("1"), NodeKind::Claim, "structure lemma", None, None, vec![])
            .unwrap();
        let qed = alice
            .add_child(
                &node("1"),
                NodeKind::Qed,
                "conclude",
                Some(InferenceKind::ForallIntro),
                None,
                vec![discharge.clone(), lemma.clone()],
            )
            .unwrap();
        alice.release(&node("1")).unwrap();

        assert_eq!(
            vec![assume.clone(), derive.clone(), discharge.clone(), lemma.clone(), qed.clone()],
            vec![node("1.1"), node("1.2"), node("1.3"), node("1.4"), node("1.5")]
        );

        // -- Review ----------------------------------------------------------
        let bob = agent(root, "bob");
        let complaint = bob
            .open_challenge(
                &derive,
                ChallengeTarget::Inference,
                ChallengeSeverity::Major,
                "the structure lemma is not yet established at this point",
            )
            .unwrap();

        // The challenged node is pinned: alice cannot validate it.
        alice.refresh().unwrap();
        assert_eq!(alice.list_blocked(), vec![derive.clone()]);

        // Alice establishes the lemma first, then bob withdraws.
        alice.claim(&lemma, None).unwrap();
        alice
            .transition(&lemma, EpistemicState::Validated, "proved separately")
            .unwrap();
        alice.release(&lemma).unwrap();
        bob.close_challenge(&complaint, "ordering concern resolved")
            .unwrap();

        // -- Refinement round ------------------------------------------------
        let carol = agent(root, "carol");
        carol.claim(&derive, None).unwrap();
        carol
            .transition(&derive, EpistemicState::Validated, "checked")
            .unwrap();
        // A later look reopens it, then settles it again.
        carol
            .transition(&derive, EpistemicState::NeedsRefinement, "edge case w = 0")
            .unwrap();
        carol
            .transition(&derive, EpistemicState::Validated, "edge case handled")
            .unwrap();
        carol.release(&derive).unwrap();

        // -- An admitted shortcut and its taint ------------------------------
        carol.claim(&discharge, None).unwrap();
        carol
            .transition(&discharge, EpistemicState::Admitted, "discharge rule taken on faith")
            .unwrap();
        carol.release(&discharge).unwrap();
        carol.claim(&qed, None).unwrap();
        carol
            .transition(&qed, EpistemicState::Validated, "follows from 1.3 and 1.4")
            .unwrap();
        carol.release(&qed).unwrap();

        alice.refresh().unwrap();
        assert_eq!(alice.info(&discharge).unwrap().taint, TaintState::SelfAdmitted);
        // The qed rests on the admitted discharge.
        assert_eq!(alice.info(&qed).unwrap().taint, TaintState::Tainted);
        // The lemma is untouched by the shortcut.
        assert_eq!(alice.info(&lemma).unwrap().taint, TaintState::Clean);

        // -- Summary ---------------------------------------------------------
        let status = alice.status();
        assert_eq!(status.nodes, 6);
        assert_eq!(status.open_challenges, 0);
        assert_eq!(status.active_claims, 0);
        assert_eq!(status.by_epistemic["validated"], 3);
        assert_eq!(status.by_epistemic["admitted"], 1);
        assert_eq!(status.by_epistemic["pending"], 2); // root and assume

        // -- Final audits ----------------------------------------------------
        let ledger = EventLedger::open(root.join("ledger")).unwrap();
        let report = verify_ledger(&ledger).unwrap();
        assert_eq!(report.events, ledger.count().unwrap());
        assert_eq!(report.kinds["node_created"], 6);
        assert_eq!(report.kinds["lock_acquired"], 5);
        assert_eq!(report.kinds["lock_released"], 5);
        assert_eq!(report.kinds["scope_opened"], 1);
        assert_eq!(report.kinds["scope_closed"], 1);
        assert_eq!(report.kinds["challenge_opened"], 1);
        assert_eq!(report.kinds["challenge_closed"], 1);

        let graph = ProofGraph::replay(&ledger).unwrap();
        assert!(audit(&graph).is_empty(), "violations: {:?}", audit(&graph));

        // A fourth agent joining late sees the same world.
        let dave = agent(root, "dave");
        assert_eq!(dave.list_nodes(), alice.list_nodes());
        assert_eq!(dave.status(), alice.status());
    }
}
