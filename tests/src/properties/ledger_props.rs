//! # Ledger Sequence Properties
//!
//! After K successful appends from any mix of writers, the sequence
//! numbers are exactly 1..K, and replay returns them in order.

#[cfg(test)]
mod tests {
    use af_02_ledger::{EventBody, EventLedger, LedgerEvent, LockReleasedPayload};
    use shared_types::NodeId;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn node(id: &str) -> NodeId {
        id.parse().unwrap()
    }

    fn marker(i: usize) -> LedgerEvent {
        LedgerEvent::now(EventBody::LockReleased(LockReleasedPayload {
            node_id: node(&format!("{}", i + 1)),
            owner: format!("w{}", i),
        }))
    }

    #[test]
    fn test_sequences_dense_after_mixed_writers() {
        for writers in [1usize, 2, 5] {
            let per_writer = 6usize;
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().to_path_buf();
            let barrier = Arc::new(Barrier::new(writers));

            let mut handles = Vec::new();
            for w in 0..writers {
                let path = path.clone();
                let barrier = Arc::clone(&barrier);
                handles.push(thread::spawn(move || {
                    // Each writer opens its own handle, as a separate
                    // process would.
                    let ledger = EventLedger::open(&path).unwrap();
                    barrier.wait();
                    let mut seqs = Vec::new();
                    for i in 0..per_writer {
                        seqs.push(ledger.append(&marker(w * per_writer + i)).unwrap());
                    }
                    seqs
                }));
            }

            let mut all: Vec<u64> = handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect();
            all.sort_unstable();
            let expected: Vec<u64> = (1..=(writers * per_writer) as u64).collect();
            assert_eq!(all, expected, "{} writers must fill 1..K densely", writers);

            let ledger = EventLedger::open(&path).unwrap();
            let replayed: Vec<u64> = ledger.read_all().unwrap().iter().map(|e| e.seq).collect();
            assert_eq!(replayed, expected);
        }
    }

    #[test]
    fn test_every_appended_event_reads_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = EventLedger::open(dir.path()).unwrap();
        let mut written = Vec::new();
        for i in 0..20 {
            let event = marker(i);
            ledger.append(&event).unwrap();
            written.push(event);
        }

        let read: Vec<LedgerEvent> = ledger
            .read_typed()
            .unwrap()
            .into_iter()
            .map(|(_, e)| e)
            .collect();
        assert_eq!(read, written);
    }
}
