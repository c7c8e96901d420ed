//! # Registry Errors
//!
//! Every registry failure is a logic error: the caller supplied a value or
//! a transition outside the closed tables.

use shared_types::ExitClass;
use thiserror::Error;

/// Errors from registry lookups, transition validation and schema loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Value is not a registered epistemic state.
    #[error("unknown epistemic state '{value}'")]
    UnknownEpistemicState { value: String },

    /// Value is not a registered workflow state.
    #[error("unknown workflow state '{value}'")]
    UnknownWorkflowState { value: String },

    /// Value is not a registered node kind.
    #[error("unknown node kind '{value}'")]
    UnknownNodeKind { value: String },

    /// Value is not a registered inference kind.
    #[error("unknown inference kind '{value}'")]
    UnknownInference { value: String },

    /// Value is not a registered challenge target.
    #[error("unknown challenge target '{value}'")]
    UnknownTarget { value: String },

    /// Value is not a registered challenge severity.
    #[error("unknown challenge severity '{value}'")]
    UnknownSeverity { value: String },

    /// The epistemic transition is not in the allowed table.
    #[error("epistemic transition {from} -> {to} is not allowed")]
    InvalidEpistemicTransition { from: String, to: String },

    /// The workflow transition is not in the allowed table.
    #[error("workflow transition {from} -> {to} is not allowed")]
    InvalidWorkflowTransition { from: String, to: String },

    /// A schema document failed to load or serialise.
    #[error("schema document invalid: {message}")]
    Document { message: String },
}

impl SchemaError {
    pub fn exit_class(&self) -> ExitClass {
        ExitClass::Logic
    }
}
