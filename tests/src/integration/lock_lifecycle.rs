//! # Lock Lifecycle Flows
//!
//! The claim lifecycle as separate agent processes see it: managers in
//! this file never share in-memory state, only the ledger directory.

#[cfg(test)]
mod tests {
    use af_02_ledger::EventLedger;
    use af_03_locks::{LockError, PersistentLockManager};
    use shared_types::NodeId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    fn node(id: &str) -> NodeId {
        id.parse().unwrap()
    }

    /// A fresh manager over the shared directory, as a new process would
    /// build one.
    fn spawn_manager(dir: &std::path::Path) -> PersistentLockManager {
        PersistentLockManager::open(EventLedger::open(dir).unwrap()).unwrap()
    }

    /// Scenario: single-process acquire/release round trip.
    #[test]
    fn test_acquire_release_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let manager = spawn_manager(dir.path());

        let lock = manager
            .acquire(&node("1"), "A", Duration::from_secs(300))
            .unwrap();
        assert_eq!(lock.node_id(), node("1"));
        assert_eq!(lock.owner(), "A");

        // Exactly one event, sequence 1, with the expected payload.
        let ledger = EventLedger::open(dir.path()).unwrap();
        let events = ledger.read_typed().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, 1);
        assert_eq!(events[0].1.kind(), "lock_acquired");
        let value: serde_json::Value =
            serde_json::from_slice(&ledger.read_all().unwrap()[0].bytes).unwrap();
        assert_eq!(value["node_id"], "1");
        assert_eq!(value["owner"], "A");

        manager.release(&node("1"), "A").unwrap();
        assert_eq!(ledger.count().unwrap(), 2);
        assert!(!manager.is_locked(&node("1")));
    }

    /// Scenario: ten concurrent acquires on the same node, each through
    /// its own manager (own process), exactly one winner.
    #[test]
    fn test_ten_racing_agents_one_winner() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_path_buf();
        let barrier = Arc::new(Barrier::new(10));
        let wins = Arc::new(AtomicUsize::new(0));
        let already = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for i in 0..10 {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            let wins = Arc::clone(&wins);
            let already = Arc::clone(&already);
            handles.push(thread::spawn(move || {
                let manager = spawn_manager(&path);
                barrier.wait();
                match manager.acquire(&node("1"), &format!("A_{}", i), Duration::from_secs(5)) {
                    Ok(_) => {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(LockError::AlreadyClaimed { .. }) => {
                        already.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(other) => panic!("unexpected failure: {:?}", other),
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(wins.load(Ordering::SeqCst), 1, "exactly one winner");
        assert_eq!(already.load(Ordering::SeqCst), 9);

        // Exactly one lock_acquired event for "1" survived in the ledger.
        let ledger = EventLedger::open(dir.path()).unwrap();
        let acquired = ledger
            .read_typed()
            .unwrap()
            .into_iter()
            .filter(|(_, e)| e.kind() == "lock_acquired")
            .count();
        assert_eq!(acquired, 1);
    }

    /// Scenario: expired-lock replacement without a release in between.
    #[test]
    fn test_expired_lock_replacement() {
        let dir = tempfile::tempdir().unwrap();
        let manager = spawn_manager(dir.path());

        manager
            .acquire(&node("1"), "A", Duration::from_millis(10))
            .unwrap();
        thread::sleep(Duration::from_millis(20));
        manager
            .acquire(&node("1"), "B", Duration::from_secs(300))
            .unwrap();

        let kinds: Vec<&'static str> = EventLedger::open(dir.path())
            .unwrap()
            .read_typed()
            .unwrap()
            .into_iter()
            .map(|(_, e)| e.kind())
            .collect();
        assert_eq!(kinds, vec!["lock_acquired", "lock_acquired"]);
    }

    /// Scenario: restart persistence. P1 claims and dies; P2 sees the
    /// claim and cannot steal it.
    #[test]
    fn test_claims_survive_process_restart() {
        let dir = tempfile::tempdir().unwrap();
        {
            let p1 = spawn_manager(dir.path());
            p1.acquire(&node("1.1"), "A", Duration::from_secs(300))
                .unwrap();
            // P1 exits without release.
        }

        let p2 = spawn_manager(dir.path());
        assert!(p2.is_locked(&node("1.1")));
        let info = p2.info(&node("1.1")).unwrap();
        assert_eq!(info.owner(), "A");
        assert!(matches!(
            p2.acquire(&node("1.1"), "B", Duration::from_secs(300)),
            Err(LockError::AlreadyClaimed { .. })
        ));
    }

    /// Refreshing through the handle shifts the deadline every manager
    /// sees through that handle, without a ledger write.
    #[test]
    fn test_refresh_extends_without_events() {
        let dir = tempfile::tempdir().unwrap();
        let manager = spawn_manager(dir.path());
        let lock = manager
            .acquire(&node("1"), "A", Duration::from_millis(30))
            .unwrap();

        for _ in 0..3 {
            thread::sleep(Duration::from_millis(10));
            lock.refresh(Duration::from_millis(50)).unwrap();
        }
        assert!(!lock.is_expired());
        assert_eq!(EventLedger::open(dir.path()).unwrap().count().unwrap(), 1);
    }

    /// A reaped claim is gone for every later process.
    #[test]
    fn test_reap_is_visible_across_processes() {
        let dir = tempfile::tempdir().unwrap();
        let p1 = spawn_manager(dir.path());
        p1.acquire(&node("1"), "A", Duration::from_millis(5)).unwrap();
        thread::sleep(Duration::from_millis(15));
        assert_eq!(p1.reap_expired().len(), 1);

        let p2 = spawn_manager(dir.path());
        assert!(!p2.is_locked(&node("1")));
        p2.acquire(&node("1"), "B", Duration::from_secs(60)).unwrap();
    }
}
