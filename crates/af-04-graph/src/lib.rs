//! # Graph & State Reconstruction (af-04)
//!
//! Folds the event ledger into the in-memory proof graph and keeps that
//! projection consistent as new events are applied. The fold is pure of
//! wall-clock dependence: every timestamp that matters is read from the
//! event itself, so any process replaying the same ledger builds the same
//! projection.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Creation First | A node exists before any event references it |
//! | 2 | Acyclic Deps | Every dependency edge keeps the graph a DAG |
//! | 3 | LIFO Scopes | A scope close matches the innermost open assume |
//! | 4 | Terminal Closure | Terminal epistemic states emit no transitions |
//! | 5 | Blocking Gate | Open blocking challenges pin a node in place |
//! | 6 | Hash Fidelity | Stored content hashes match the immutable fields |
//!
//! ## Crate Structure
//!
//! - `domain/` - Node/challenge entities, taint, cycle detection, errors
//! - `service.rs` - The `ProofGraph` projection

pub mod domain;
pub mod service;

pub use domain::audit::audit;
pub use domain::cycle::{find_cycle, would_create_cycle};
pub use domain::errors::GraphError;
pub use domain::node::{content_hash, Challenge, ProofNode, TaintState};
pub use service::{ProofGraph, RecordedClaim, MAX_OPEN_CHALLENGES, MAX_REFINEMENT_TRIPS};
