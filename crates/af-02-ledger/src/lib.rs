//! # Event Ledger (af-02)
//!
//! The append-only event log that is the single source of truth for all
//! coordination state. Every durable fact (node creation, lock acquisition,
//! challenge, state transition) is one JSON file in a shared directory; the
//! in-memory projections of every cooperating process are folds of this
//! log and nothing else.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Dense Sequences | Sequence numbers are exactly 1..N, no gaps |
//! | 2 | Atomic Commit | A reader sees a whole event file or none |
//! | 3 | Single Winner | Exactly one writer commits each sequence number |
//! | 4 | Envelope Shape | Every event carries `type` and `timestamp` |
//! | 5 | Replay Fidelity | `read_all` returns events in commit order |
//!
//! ## Crate Structure
//!
//! - `domain/` - Event envelope, typed payloads, errors
//! - `service.rs` - The `EventLedger` directory handle
//!
//! The ledger interprets only the sequence topology and the envelope;
//! payload-level corruption is classified by consumers (the lock manager
//! and the graph projection), which report offending sequence numbers.

pub mod domain;
pub mod service;

pub use domain::errors::{fmt_sequences, LedgerError};
pub use domain::integrity::{verify_ledger, IntegrityReport};
pub use domain::events::{
    ChallengeClosedPayload, ChallengeOpenedPayload, DependencyAddedPayload, EventBody,
    LedgerEvent, LockAcquiredPayload, LockReapedPayload, LockReleasedPayload,
    NodeCreatedPayload, ProofInitializedPayload, ScopeClosedPayload, ScopeOpenedPayload,
    StateTransitionedPayload,
};
pub use service::{EventLedger, RawEvent, MAX_APPEND_ATTEMPTS, SEQUENCE_WIDTH};
