//! # Schema Registry (af-01)
//!
//! Static, in-process registries for every closed enumeration that may
//! appear in a ledger event, together with the metadata and the
//! allowed-transition tables the coordination layer enforces.
//!
//! ## Registries
//!
//! | registry | values | metadata |
//! |----------|--------|----------|
//! | [`EpistemicState`] | 6 | description, `is_final`, `introduces_taint` |
//! | [`WorkflowState`] | 3 | description, `permits_claim` |
//! | [`NodeKind`] | 5 | description, `opens_scope`, `closes_scope` |
//! | [`InferenceKind`] | 11 | display name, logical form |
//! | [`ChallengeTarget`] | 9 | description |
//! | [`ChallengeSeverity`] | 4 | description, `blocks_acceptance` |
//!
//! All registries expose `all()` in a deterministic order, `as_str()` /
//! `parse_str()` for the snake_case wire form, and serde derives matching
//! that wire form exactly. Unknown values fail to deserialise, which is how
//! the ledger's enum-typed payload fields stay constrained.
//!
//! The composite [`Schema`] document lists the values permitted in a given
//! ledger and round-trips through JSON. [`suggest`] provides the
//! edit-distance suggestion used by interactive front-ends; the core never
//! calls it.

pub mod challenge;
pub mod epistemic;
pub mod errors;
pub mod inference;
pub mod node_kind;
pub mod schema_doc;
pub mod suggest;
pub mod workflow;

pub use challenge::{ChallengeSeverity, ChallengeSeverityInfo, ChallengeTarget};
pub use epistemic::{validate_epistemic_transition, EpistemicState, EpistemicStateInfo};
pub use errors::SchemaError;
pub use inference::{InferenceKind, InferenceKindInfo};
pub use node_kind::{NodeKind, NodeKindInfo};
pub use schema_doc::{Schema, SCHEMA_VERSION};
pub use suggest::{suggest, suggest_with_threshold};
pub use workflow::{validate_workflow_transition, WorkflowState};
