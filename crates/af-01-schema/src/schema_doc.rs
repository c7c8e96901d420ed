//! # Composite Schema Document
//!
//! A serialisable listing of the enum values permitted in a ledger. The
//! document is strict on load: any value outside the registries fails
//! deserialisation, so a ledger written by a newer registry cannot be
//! silently misread by an older one.

use crate::challenge::{ChallengeSeverity, ChallengeTarget};
use crate::epistemic::EpistemicState;
use crate::errors::SchemaError;
use crate::inference::InferenceKind;
use crate::node_kind::NodeKind;
use crate::workflow::WorkflowState;
use serde::{Deserialize, Serialize};

/// Schema document version understood by this registry.
pub const SCHEMA_VERSION: &str = "1.0";

/// Enum values permitted in the current ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Schema {
    /// Document version; must equal [`SCHEMA_VERSION`].
    pub version: String,
    pub epistemic_states: Vec<EpistemicState>,
    pub workflow_states: Vec<WorkflowState>,
    pub node_kinds: Vec<NodeKind>,
    pub inference_kinds: Vec<InferenceKind>,
    pub challenge_targets: Vec<ChallengeTarget>,
    pub challenge_severities: Vec<ChallengeSeverity>,
}

impl Schema {
    /// The schema mirroring the compiled-in registries.
    pub fn current() -> Self {
        Schema {
            version: SCHEMA_VERSION.to_string(),
            epistemic_states: EpistemicState::all().to_vec(),
            workflow_states: WorkflowState::all().to_vec(),
            node_kinds: NodeKind::all().to_vec(),
            inference_kinds: InferenceKind::all().to_vec(),
            challenge_targets: ChallengeTarget::all().to_vec(),
            challenge_severities: ChallengeSeverity::all().to_vec(),
        }
    }

    /// Serialise to pretty JSON.
    pub fn to_json(&self) -> Result<String, SchemaError> {
        serde_json::to_string_pretty(self).map_err(|e| SchemaError::Document {
            message: e.to_string(),
        })
    }

    /// Load from JSON. Unknown enum values and unknown keys fail.
    pub fn from_json(raw: &str) -> Result<Self, SchemaError> {
        let schema: Schema = serde_json::from_str(raw).map_err(|e| SchemaError::Document {
            message: e.to_string(),
        })?;
        if schema.version != SCHEMA_VERSION {
            return Err(SchemaError::Document {
                message: format!(
                    "unsupported schema version '{}', expected '{}'",
                    schema.version, SCHEMA_VERSION
                ),
            });
        }
        Ok(schema)
    }

    /// Whether `state` is permitted by this document.
    pub fn permits_epistemic_state(&self, state: EpistemicState) -> bool {
        self.epistemic_states.contains(&state)
    }

    /// Whether `kind` is permitted by this document.
    pub fn permits_inference(&self, kind: InferenceKind) -> bool {
        self.inference_kinds.contains(&kind)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Schema::current()
    }
}
