//! Domain model of the ledger: the event envelope, the typed payloads,
//! the error taxonomy and the integrity scan.

pub mod errors;
pub mod events;
pub mod integrity;
