//! # Persistent Lock Manager (af-03)
//!
//! Node-keyed exclusive claims with wall-clock expiration, persisted as
//! ledger events. The ledger is the only authority: the in-memory map is a
//! projection, cross-process knowledge travels through `lock_acquired` /
//! `lock_released` / `lock_reaped` events, and acquisition is verified
//! against concurrent writers by re-reading the ledger after the write.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Exclusive Claims | At most one non-expired, non-released lock per node |
//! | 2 | Ledger Authority | Every lock state change is a ledger event first |
//! | 3 | Post-Write Verify | An acquire is only reported won after replay confirms it |
//! | 4 | Expiry Is Wall-Clock | `expires_at` comparisons use UTC now, jumps included |
//!
//! ## Crate Structure
//!
//! - `domain/` - The `ClaimLock` handle and error taxonomy
//! - `service.rs` - `PersistentLockManager`
//! - `adapters/` - Filesystem-only stale-lock reaper

pub mod adapters;
pub mod domain;
pub mod service;

pub use adapters::reaper::{LockFileRecord, StaleLockReaper};
pub use domain::claim_lock::ClaimLock;
pub use domain::errors::LockError;
pub use service::PersistentLockManager;
