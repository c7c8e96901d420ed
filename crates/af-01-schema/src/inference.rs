//! # Inference Kinds
//!
//! The closed set of inference rules a node may justify itself with. Each
//! carries a display name and the logical form of the rule. Unknown rule
//! names are invalid everywhere: in the API, in ledger payloads, and in
//! schema documents.

use crate::errors::SchemaError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inference rule justifying a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceKind {
    ModusPonens,
    ModusTollens,
    AndIntro,
    AndElim,
    OrIntro,
    OrElim,
    ImpliesIntro,
    ForallIntro,
    ForallElim,
    ExistsIntro,
    ExistsElim,
}

/// Metadata record for an inference rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferenceKindInfo {
    /// Human display name.
    pub display_name: &'static str,
    /// Logical form of the rule.
    pub logical_form: &'static str,
}

impl InferenceKind {
    /// Every registered rule, in registry order.
    pub fn all() -> &'static [InferenceKind] {
        &[
            InferenceKind::ModusPonens,
            InferenceKind::ModusTollens,
            InferenceKind::AndIntro,
            InferenceKind::AndElim,
            InferenceKind::OrIntro,
            InferenceKind::OrElim,
            InferenceKind::ImpliesIntro,
            InferenceKind::ForallIntro,
            InferenceKind::ForallElim,
            InferenceKind::ExistsIntro,
            InferenceKind::ExistsElim,
        ]
    }

    /// The snake_case wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            InferenceKind::ModusPonens => "modus_ponens",
            InferenceKind::ModusTollens => "modus_tollens",
            InferenceKind::AndIntro => "and_intro",
            InferenceKind::AndElim => "and_elim",
            InferenceKind::OrIntro => "or_intro",
            InferenceKind::OrElim => "or_elim",
            InferenceKind::ImpliesIntro => "implies_intro",
            InferenceKind::ForallIntro => "forall_intro",
            InferenceKind::ForallElim => "forall_elim",
            InferenceKind::ExistsIntro => "exists_intro",
            InferenceKind::ExistsElim => "exists_elim",
        }
    }

    /// Parse the wire form; unknown values are rejected.
    pub fn parse_str(value: &str) -> Result<Self, SchemaError> {
        Self::all()
            .iter()
            .find(|k| k.as_str() == value)
            .copied()
            .ok_or_else(|| SchemaError::UnknownInference {
                value: value.to_string(),
            })
    }

    /// Metadata for this rule.
    pub fn info(&self) -> InferenceKindInfo {
        match self {
            InferenceKind::ModusPonens => InferenceKindInfo {
                display_name: "Modus Ponens",
                logical_form: "P → Q, P ⊢ Q",
            },
            InferenceKind::ModusTollens => InferenceKindInfo {
                display_name: "Modus Tollens",
                logical_form: "P → Q, ¬Q ⊢ ¬P",
            },
            InferenceKind::AndIntro => InferenceKindInfo {
                display_name: "Conjunction Introduction",
                logical_form: "P, Q ⊢ P ∧ Q",
            },
            InferenceKind::AndElim => InferenceKindInfo {
                display_name: "Conjunction Elimination",
                logical_form: "P ∧ Q ⊢ P",
            },
            InferenceKind::OrIntro => InferenceKindInfo {
                display_name: "Disjunction Introduction",
                logical_form: "P ⊢ P ∨ Q",
            },
            InferenceKind::OrElim => InferenceKindInfo {
                display_name: "Disjunction Elimination",
                logical_form: "P ∨ Q, P ⊢ R, Q ⊢ R ⊢ R",
            },
            InferenceKind::ImpliesIntro => InferenceKindInfo {
                display_name: "Conditional Proof",
                logical_form: "[P] … Q ⊢ P → Q",
            },
            InferenceKind::ForallIntro => InferenceKindInfo {
                display_name: "Universal Generalisation",
                logical_form: "P(a) for arbitrary a ⊢ ∀x P(x)",
            },
            InferenceKind::ForallElim => InferenceKindInfo {
                display_name: "Universal Instantiation",
                logical_form: "∀x P(x) ⊢ P(a)",
            },
            InferenceKind::ExistsIntro => InferenceKindInfo {
                display_name: "Existential Generalisation",
                logical_form: "P(a) ⊢ ∃x P(x)",
            },
            InferenceKind::ExistsElim => InferenceKindInfo {
                display_name: "Existential Instantiation",
                logical_form: "∃x P(x), [P(a)] … Q ⊢ Q",
            },
        }
    }
}

impl fmt::Display for InferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
