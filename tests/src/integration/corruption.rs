//! # Corruption Detection Flows
//!
//! Damaged ledger directories must fail loudly with corruption-class
//! errors that identify the offending sequence numbers, never limp along
//! with partial state.

#[cfg(test)]
mod tests {
    use af_02_ledger::{EventLedger, LedgerError};
    use af_03_locks::{LockError, PersistentLockManager};
    use af_04_graph::{GraphError, ProofGraph};
    use af_05_coordination::{Coordinator, MetaConfig};
    use shared_types::{ExitClass, NodeId};
    use std::fs;
    use std::time::Duration;

    fn node(id: &str) -> NodeId {
        id.parse().unwrap()
    }

    fn seeded_lock_ledger(dir: &std::path::Path) {
        let manager = PersistentLockManager::open(EventLedger::open(dir).unwrap()).unwrap();
        for id in ["1", "2", "3"] {
            manager
                .acquire(&node(id), "A", Duration::from_secs(300))
                .unwrap();
        }
    }

    /// Scenario: sequences 1,2,4 present, 3 missing. The manager must
    /// refuse to start and the message must identify sequence 3.
    #[test]
    fn test_missing_sequence_identified() {
        let dir = tempfile::tempdir().unwrap();
        seeded_lock_ledger(dir.path());
        let manager = PersistentLockManager::open(EventLedger::open(dir.path()).unwrap()).unwrap();
        manager
            .acquire(&node("4"), "A", Duration::from_secs(300))
            .unwrap();
        fs::remove_file(dir.path().join("000003.json")).unwrap();

        let err = PersistentLockManager::open(EventLedger::open(dir.path()).unwrap())
            .err()
            .expect("corrupt ledger must not open");
        assert_eq!(err.exit_class(), ExitClass::Corruption);
        assert!(err.to_string().contains('3'), "message: {}", err);
        assert!(matches!(
            err,
            LockError::Ledger(LedgerError::MissingSequences { .. })
        ));
    }

    /// Scenario: a `lock_acquired` payload with `node_id` as a JSON
    /// number. Corruption, enumerating the event index.
    #[test]
    fn test_mistyped_lock_payload_identified() {
        let dir = tempfile::tempdir().unwrap();
        seeded_lock_ledger(dir.path());
        fs::write(
            dir.path().join("000004.json"),
            br#"{"type":"lock_acquired","timestamp":"2024-05-01T12:00:00Z","node_id":1,"owner":"A","expires_at":"2024-05-01T12:05:00Z"}"#,
        )
        .unwrap();

        let err = PersistentLockManager::open(EventLedger::open(dir.path()).unwrap())
            .err()
            .expect("corrupt payload must not open");
        assert_eq!(err.exit_class(), ExitClass::Corruption);
        match err {
            LockError::ReplayCorruption { sequences } => assert_eq!(sequences, vec![4]),
            other => panic!("expected ReplayCorruption, got {:?}", other),
        }
    }

    /// An event file that is not JSON at all fails the graph replay with
    /// its sequence number.
    #[test]
    fn test_unparseable_event_fails_graph_replay() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let coordinator = Coordinator::open(root, "prover", MetaConfig::default()).unwrap();
        coordinator.init("c").unwrap();
        fs::write(root.join("ledger").join("000003.json"), b"this is { not json").unwrap();

        let ledger = EventLedger::open(root.join("ledger")).unwrap();
        match ProofGraph::replay(&ledger) {
            Err(GraphError::Ledger(LedgerError::DecodeFailed { seq, .. })) => assert_eq!(seq, 3),
            other => panic!("expected DecodeFailed, got {:?}", other.map(|_| ())),
        }
    }

    /// A ledger whose events violate graph invariants (a reference to a
    /// node never created) is corruption for replayers, with the
    /// sequence number attached.
    #[test]
    fn test_invariant_violation_in_ledger_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let coordinator = Coordinator::open(root, "prover", MetaConfig::default()).unwrap();
        coordinator.init("c").unwrap();
        // Handcrafted event referencing a phantom node.
        fs::write(
            root.join("ledger").join("000003.json"),
            br#"{"type":"state_transitioned","timestamp":"2024-05-01T12:00:00Z","node_id":"7.7","from":"pending","to":"validated","reason":"","agent":"x"}"#,
        )
        .unwrap();

        let ledger = EventLedger::open(root.join("ledger")).unwrap();
        let err = ProofGraph::replay(&ledger).err().expect("must fail");
        assert_eq!(err.exit_class(), ExitClass::Corruption);
        match err {
            GraphError::ReplayFailed { seq, source } => {
                assert_eq!(seq, 3);
                assert!(matches!(*source, GraphError::NodeNotFound { .. }));
            }
            other => panic!("expected ReplayFailed, got {:?}", other),
        }
    }

    /// A tampered `node_created` payload no longer matches its stored
    /// content hash.
    #[test]
    fn test_tampered_node_fails_hash_check() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let coordinator = Coordinator::open(root, "prover", MetaConfig::default()).unwrap();
        coordinator.init("the original conjecture").unwrap();

        // Rewrite the conjecture in place, keeping the stored hash.
        let path = root.join("ledger").join("000002.json");
        let raw = fs::read_to_string(&path).unwrap();
        let tampered = raw.replace("the original conjecture", "a different claim");
        assert_ne!(raw, tampered);
        fs::write(&path, tampered).unwrap();

        let ledger = EventLedger::open(root.join("ledger")).unwrap();
        let err = ProofGraph::replay(&ledger).err().expect("must fail");
        assert_eq!(err.exit_class(), ExitClass::Corruption);
        match err {
            GraphError::ReplayFailed { seq, source } => {
                assert_eq!(seq, 2);
                assert!(matches!(*source, GraphError::ContentHashMismatch { .. }));
            }
            other => panic!("expected ReplayFailed, got {:?}", other),
        }
    }

    /// Corruption-class failures surface through the coordinator
    /// constructor too.
    #[test]
    fn test_coordinator_refuses_corrupt_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let coordinator = Coordinator::open(root, "prover", MetaConfig::default()).unwrap();
        coordinator.init("c").unwrap();
        fs::remove_file(root.join("ledger").join("000001.json")).unwrap();

        let err = Coordinator::open(root, "prover", MetaConfig::default())
            .err()
            .expect("corrupt root must not open");
        assert_eq!(err.exit_class(), ExitClass::Corruption);
    }
}
