//! # Axiom-Forge Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── integration/      # Cross-subsystem flows over real ledger dirs
//! │   ├── lock_lifecycle.rs   # claim/release, races, restarts
//! │   ├── graph_flows.rs      # trees, scopes, challenges, cycles
//! │   ├── reaper_flows.rs     # stale lock-file sweeps
//! │   ├── schema_config.rs    # schema docs, meta.json, suggestions
//! │   ├── end_to_end.rs       # one full multi-agent proof lifecycle
//! │   └── corruption.rs       # damaged ledgers fail loudly
//! │
//! └── properties/       # Property-based invariants
//!     ├── identifier_props.rs # the id algebra laws
//!     ├── transition_props.rs # state-machine tables
//!     ├── ledger_props.rs     # sequence density under writers
//!     ├── lock_props.rs       # exclusivity under interleavings
//!     ├── taint_props.rs      # taint over random DAG shapes
//!     └── replay_props.rs     # replay == incremental projection
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p af-tests
//!
//! # By category
//! cargo test -p af-tests integration::
//! cargo test -p af-tests properties::
//! ```

#![allow(dead_code)]

pub mod properties;
