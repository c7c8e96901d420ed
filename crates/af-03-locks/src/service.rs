//! # Persistent Lock Manager
//!
//! In-memory `node_id -> ClaimLock` map behind a mutex, rebuilt from the
//! ledger on startup. The ledger is the only authority (INVARIANT-2): an
//! acquire is a candidate until the post-append replay confirms it won
//! the sequence race (INVARIANT-3).

use crate::domain::claim_lock::ClaimLock;
use crate::domain::errors::LockError;
use af_02_ledger::{
    EventBody, EventLedger, LedgerEvent, LockAcquiredPayload, LockReapedPayload,
    LockReleasedPayload, RawEvent,
};
use shared_types::{NodeId, Timestamp};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Lock-event kinds; everything else is ignored by replay here.
const LOCK_EVENT_KINDS: [&str; 3] = ["lock_acquired", "lock_released", "lock_reaped"];

/// Node-level mutual exclusion, persisted through the ledger.
pub struct PersistentLockManager {
    ledger: EventLedger,
    locks: Mutex<HashMap<NodeId, ClaimLock>>,
}

impl PersistentLockManager {
    /// Replay the entire ledger and build the lock map.
    ///
    /// Lock-kind events that fail to deserialise make replay fail with a
    /// corruption error enumerating the offending sequence numbers;
    /// events of other kinds are ignored silently.
    pub fn open(ledger: EventLedger) -> Result<Self, LockError> {
        let events = ledger.read_all()?;
        let locks = Self::fold_locks(&events)?;
        tracing::debug!(locks = locks.len(), "lock manager replay complete");
        Ok(PersistentLockManager {
            ledger,
            locks: Mutex::new(locks),
        })
    }

    /// The ledger this manager persists through.
    pub fn ledger(&self) -> &EventLedger {
        &self.ledger
    }

    fn fold_locks(events: &[RawEvent]) -> Result<HashMap<NodeId, ClaimLock>, LockError> {
        let mut locks: HashMap<NodeId, ClaimLock> = HashMap::new();
        let mut corrupt: Vec<u64> = Vec::new();

        for raw in events {
            let Ok((kind, _)) = raw.envelope() else {
                corrupt.push(raw.seq);
                continue;
            };
            if !LOCK_EVENT_KINDS.contains(&kind.as_str()) {
                continue;
            }
            let event = match raw.decode() {
                Ok(event) => event,
                Err(_) => {
                    corrupt.push(raw.seq);
                    continue;
                }
            };
            match event.body {
                EventBody::LockAcquired(payload) => {
                    locks.insert(
                        payload.node_id.clone(),
                        ClaimLock::new(
                            payload.node_id,
                            payload.owner,
                            event.timestamp,
                            payload.expires_at,
                        ),
                    );
                }
                EventBody::LockReleased(payload) => {
                    locks.remove(&payload.node_id);
                }
                EventBody::LockReaped(payload) => {
                    locks.remove(&payload.node_id);
                }
                _ => {}
            }
        }

        if !corrupt.is_empty() {
            return Err(LockError::ReplayCorruption { sequences: corrupt });
        }
        Ok(locks)
    }

    fn map(&self) -> MutexGuard<'_, HashMap<NodeId, ClaimLock>> {
        self.locks.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Claim exclusive authority over `node_id` for `owner`.
    ///
    /// No wait, no retry: either the node is free-or-expired and the
    /// caller wins, or it fails immediately with `AlreadyClaimed`.
    pub fn acquire(
        &self,
        node_id: &NodeId,
        owner: &str,
        timeout: Duration,
    ) -> Result<ClaimLock, LockError> {
        let owner = validated_owner(owner)?;
        let (now, expires_at) = deadline(timeout)?;

        let mut map = self.map();
        if let Some(existing) = map.get(node_id) {
            if !existing.is_expired() {
                return Err(LockError::AlreadyClaimed {
                    node_id: node_id.clone(),
                    holder: existing.owner(),
                });
            }
        }

        let event = LedgerEvent::at(
            now,
            EventBody::LockAcquired(LockAcquiredPayload {
                node_id: node_id.clone(),
                owner: owner.clone(),
                expires_at,
            }),
        );
        let seq = self.ledger.append(&event)?;

        // TOCTOU: the in-memory map cannot see concurrent writers, so the
        // ledger is re-read and the node's lock timeline reconstructed.
        self.verify_acquire(node_id, &owner, seq)?;

        let lock = ClaimLock::new(node_id.clone(), owner.clone(), now, expires_at);
        map.insert(node_id.clone(), lock.clone());
        tracing::debug!(%node_id, owner, seq, "lock acquired");
        Ok(lock)
    }

    /// Replay the node's lock timeline and require that the event at
    /// `seq` is still the authoritative acquire.
    fn verify_acquire(&self, node_id: &NodeId, owner: &str, seq: u64) -> Result<(), LockError> {
        let events = self.ledger.read_all()?;
        let mut corrupt: Vec<u64> = Vec::new();
        let mut last_acquire: Option<(u64, String)> = None;
        let mut torn_down_after = false;

        for raw in &events {
            let Ok((kind, _)) = raw.envelope() else {
                corrupt.push(raw.seq);
                continue;
            };
            if !LOCK_EVENT_KINDS.contains(&kind.as_str()) {
                continue;
            }
            let event = match raw.decode() {
                Ok(event) => event,
                Err(_) => {
                    corrupt.push(raw.seq);
                    continue;
                }
            };
            match &event.body {
                EventBody::LockAcquired(p) if &p.node_id == node_id => {
                    last_acquire = Some((raw.seq, p.owner.clone()));
                }
                EventBody::LockReleased(p) if &p.node_id == node_id => {
                    if raw.seq > seq {
                        torn_down_after = true;
                    }
                }
                EventBody::LockReaped(p) if &p.node_id == node_id => {
                    if raw.seq > seq {
                        torn_down_after = true;
                    }
                }
                _ => {}
            }
        }

        if !corrupt.is_empty() {
            return Err(LockError::ReplayCorruption { sequences: corrupt });
        }
        match last_acquire {
            Some((last_seq, ref last_owner)) if last_seq == seq && last_owner == owner => {
                if torn_down_after {
                    Err(LockError::VerificationFailed {
                        message: format!(
                            "acquire at sequence {} was torn down by a later release/reap",
                            seq
                        ),
                    })
                } else {
                    Ok(())
                }
            }
            Some((_, last_owner)) => Err(LockError::AlreadyClaimed {
                node_id: node_id.clone(),
                holder: last_owner,
            }),
            None => Err(LockError::VerificationFailed {
                message: format!("acquire at sequence {} is missing from replay", seq),
            }),
        }
    }

    /// Release the claim `owner` holds on `node_id`.
    ///
    /// Expiry is not checked: releasing an expired lock you still own is
    /// permitted so long as no replacement has been installed (if one
    /// has, the map entry belongs to the replacement and `owner` fails
    /// the holder check).
    pub fn release(&self, node_id: &NodeId, owner: &str) -> Result<(), LockError> {
        let owner = validated_owner(owner)?;

        let mut map = self.map();
        let holder = match map.get(node_id) {
            None => {
                return Err(LockError::NotLocked {
                    node_id: node_id.clone(),
                })
            }
            Some(existing) => existing.owner(),
        };
        if holder != owner {
            return Err(LockError::NotClaimHolder {
                node_id: node_id.clone(),
                owner,
                holder,
            });
        }

        let event = LedgerEvent::now(EventBody::LockReleased(LockReleasedPayload {
            node_id: node_id.clone(),
            owner: owner.clone(),
        }));
        self.ledger.append(&event)?;
        map.remove(node_id);
        tracing::debug!(%node_id, owner, "lock released");
        Ok(())
    }

    /// The non-expired lock on `node_id`, if any. Expired entries are
    /// hidden but not removed; removal is the reaper's job.
    pub fn info(&self, node_id: &NodeId) -> Option<ClaimLock> {
        self.map()
            .get(node_id)
            .filter(|lock| !lock.is_expired())
            .cloned()
    }

    /// Whether a non-expired lock exists on `node_id`.
    pub fn is_locked(&self, node_id: &NodeId) -> bool {
        self.info(node_id).is_some()
    }

    /// Reap every expired entry: append `lock_reaped`, then remove.
    ///
    /// A per-entry append failure aborts that entry's removal but never
    /// fails the batch; the entry stays for the next sweep.
    pub fn reap_expired(&self) -> Vec<ClaimLock> {
        let mut map = self.map();
        let expired: Vec<NodeId> = map
            .iter()
            .filter(|(_, lock)| lock.is_expired())
            .map(|(id, _)| id.clone())
            .collect();

        let mut reaped = Vec::new();
        for node_id in expired {
            let Some(lock) = map.get(&node_id) else {
                continue;
            };
            let event = LedgerEvent::now(EventBody::LockReaped(LockReapedPayload {
                node_id: node_id.clone(),
                owner: lock.owner(),
                expires_at: lock.expires_at(),
            }));
            match self.ledger.append(&event) {
                Ok(seq) => {
                    tracing::debug!(%node_id, seq, "expired lock reaped");
                    if let Some(lock) = map.remove(&node_id) {
                        reaped.push(lock);
                    }
                }
                Err(e) => {
                    tracing::warn!(%node_id, error = %e, "reap append failed; keeping entry");
                }
            }
        }
        reaped
    }

    /// Snapshot of all non-expired locks, ordered by node id.
    pub fn list_all(&self) -> Vec<ClaimLock> {
        let map = self.map();
        let mut locks: Vec<ClaimLock> = map
            .values()
            .filter(|lock| !lock.is_expired())
            .cloned()
            .collect();
        locks.sort_by_key(|lock| lock.node_id());
        locks
    }
}

fn validated_owner(owner: &str) -> Result<String, LockError> {
    let trimmed = owner.trim();
    if trimmed.is_empty() {
        return Err(LockError::EmptyOwner);
    }
    Ok(trimmed.to_string())
}

fn deadline(timeout: Duration) -> Result<(Timestamp, Timestamp), LockError> {
    if timeout.is_zero() {
        return Err(LockError::InvalidTimeout {
            message: "timeout must be strictly positive".to_string(),
        });
    }
    let now = Timestamp::now();
    let expires_at = now
        .checked_add(timeout)
        .map_err(|_| LockError::InvalidTimeout {
            message: "timeout overflows the representable range".to_string(),
        })?;
    Ok((now, expires_at))
}
