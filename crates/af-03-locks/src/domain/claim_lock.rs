//! # Claim Lock Handle
//!
//! The handle an agent holds while it owns a node. The same handle is
//! shared (via `Clone`) between the manager's map and the acquiring
//! caller, so `refresh` and concurrent reads of `expires_at` synchronise
//! through an interior mutex; read operations return by value.

use crate::domain::errors::LockError;
use shared_types::{NodeId, Timestamp};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug)]
struct LockFields {
    node_id: NodeId,
    owner: String,
    acquired_at: Timestamp,
    expires_at: Timestamp,
}

/// An exclusive claim on a node.
///
/// Cloning shares the underlying state: a refresh through one handle is
/// visible through every other.
#[derive(Debug, Clone)]
pub struct ClaimLock {
    inner: Arc<Mutex<LockFields>>,
}

impl ClaimLock {
    /// Construct a handle from its persisted fields.
    pub fn new(
        node_id: NodeId,
        owner: String,
        acquired_at: Timestamp,
        expires_at: Timestamp,
    ) -> Self {
        ClaimLock {
            inner: Arc::new(Mutex::new(LockFields {
                node_id,
                owner,
                acquired_at,
                expires_at,
            })),
        }
    }

    fn fields(&self) -> MutexGuard<'_, LockFields> {
        // A poisoned mutex only means a peer thread panicked mid-read;
        // the fields themselves are always consistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The locked node.
    pub fn node_id(&self) -> NodeId {
        self.fields().node_id.clone()
    }

    /// The owning agent.
    pub fn owner(&self) -> String {
        self.fields().owner.clone()
    }

    /// When the claim was acquired.
    pub fn acquired_at(&self) -> Timestamp {
        self.fields().acquired_at
    }

    /// Current expiry deadline.
    pub fn expires_at(&self) -> Timestamp {
        self.fields().expires_at
    }

    /// Whether the deadline has passed on the wall clock.
    pub fn is_expired(&self) -> bool {
        Timestamp::now() > self.fields().expires_at
    }

    /// Alias for [`ClaimLock::is_expired`]; a stale lock is an expired one.
    pub fn is_stale(&self) -> bool {
        self.is_expired()
    }

    /// Whether `agent` holds this claim.
    pub fn is_owned_by(&self, agent: &str) -> bool {
        self.fields().owner == agent
    }

    /// Extend the deadline to `now() + timeout`.
    ///
    /// Refreshing an expired lock is permitted: it lets a holder recover
    /// from a brief clock jump without re-acquisition, provided no
    /// replacement claim has been installed meanwhile. Refresh never
    /// touches the ledger.
    pub fn refresh(&self, timeout: Duration) -> Result<(), LockError> {
        if timeout.is_zero() {
            return Err(LockError::InvalidTimeout {
                message: "timeout must be strictly positive".to_string(),
            });
        }
        let deadline = Timestamp::now()
            .checked_add(timeout)
            .map_err(|_| LockError::InvalidTimeout {
                message: "timeout overflows the representable range".to_string(),
            })?;
        self.fields().expires_at = deadline;
        Ok(())
    }
}
