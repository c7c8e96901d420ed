//! # Lock Exclusivity Properties
//!
//! At most one non-expired lock per node at all times, across any number
//! of racing managers and any interleaving of acquire, release and reap.

#[cfg(test)]
mod tests {
    use af_02_ledger::EventLedger;
    use af_03_locks::PersistentLockManager;
    use proptest::prelude::*;
    use shared_types::NodeId;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    fn node(id: &str) -> NodeId {
        id.parse().unwrap()
    }

    /// Across R rounds of racing threads, every round has exactly one
    /// winner, and the ledger's acquire history never shows two live
    /// claims on the node at once.
    #[test]
    fn test_rounds_of_races_keep_exclusivity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_path_buf();

        for round in 0..4 {
            let contenders = 4;
            let barrier = Arc::new(Barrier::new(contenders));
            let mut handles = Vec::new();
            for c in 0..contenders {
                let path = path.clone();
                let barrier = Arc::clone(&barrier);
                handles.push(thread::spawn(move || {
                    let manager =
                        PersistentLockManager::open(EventLedger::open(&path).unwrap()).unwrap();
                    barrier.wait();
                    manager
                        .acquire(
                            &"7".parse().unwrap(),
                            &format!("r{}c{}", round, c),
                            Duration::from_secs(60),
                        )
                        .is_ok()
                }));
            }
            let wins = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|won| *won)
                .count();
            assert_eq!(wins, 1, "round {} must have one winner", round);

            // Winner hands the node back for the next round.
            let manager =
                PersistentLockManager::open(EventLedger::open(&path).unwrap()).unwrap();
            let holder = manager.info(&node("7")).unwrap();
            manager.release(&node("7"), &holder.owner()).unwrap();
        }

        // Replay the full history: claims alternate acquire/release.
        let ledger = EventLedger::open(&path).unwrap();
        let kinds: Vec<&'static str> = ledger
            .read_typed()
            .unwrap()
            .into_iter()
            .map(|(_, e)| e.kind())
            .collect();
        assert_eq!(kinds.len(), 8);
        for pair in kinds.chunks(2) {
            assert_eq!(pair, ["lock_acquired", "lock_released"]);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Any interleaving of acquires and releases over a handful of
        /// nodes keeps per-node exclusivity in the projection.
        #[test]
        fn prop_interleavings_keep_exclusivity(
            script in proptest::collection::vec((0u8..4, 0u8..3, any::<bool>()), 1..24)
        ) {
            let dir = tempfile::tempdir().unwrap();
            let manager =
                PersistentLockManager::open(EventLedger::open(dir.path()).unwrap()).unwrap();

            for (node_pick, owner_pick, release) in script {
                let id: NodeId = format!("{}", node_pick + 1).parse().unwrap();
                let owner = format!("agent-{}", owner_pick);
                if release {
                    let _ = manager.release(&id, &owner);
                } else {
                    let _ = manager.acquire(&id, &owner, Duration::from_secs(60));
                }

                // Exclusivity: list_all never shows two locks on one id.
                let locks = manager.list_all();
                let mut ids: Vec<String> =
                    locks.iter().map(|l| l.node_id().to_string()).collect();
                let before = ids.len();
                ids.dedup();
                prop_assert_eq!(ids.len(), before, "duplicate live locks");
            }

            // A fresh replay agrees with the live manager exactly.
            let replayed =
                PersistentLockManager::open(EventLedger::open(dir.path()).unwrap()).unwrap();
            let live: Vec<(String, String)> = manager
                .list_all()
                .iter()
                .map(|l| (l.node_id().to_string(), l.owner()))
                .collect();
            let fresh: Vec<(String, String)> = replayed
                .list_all()
                .iter()
                .map(|l| (l.node_id().to_string(), l.owner()))
                .collect();
            prop_assert_eq!(live, fresh);
        }
    }
}
