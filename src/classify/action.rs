//! Action classification: operation name → (action key, action label).
//!
//! Taxonomy phrases are tried first in index order (longest first). When no
//! phrase matches, [`FALLBACK_RULES`] is evaluated top to bottom and the
//! first rule whose predicate holds decides the action. A name no rule
//! covers becomes `other`, labelled with its capitalized first token.

use serde::Serialize;

use crate::normalize::OperationText;
use crate::taxonomy::ActionIndex;

pub const OTHER_KEY: &str = "other";
/// Label for `other` when the operation name has no first token.
pub const OTHER_LABEL: &str = "Other";

/// Result of action classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionMatch {
    pub key: String,
    pub label: String,
    pub source: ActionSource,
}

/// Which stage decided the action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionSource {
    /// A taxonomy phrase was contained in the operation name
    Taxonomy { phrase: String },
    /// A named fallback rule fired
    Rule { rule: &'static str },
    /// Nothing matched
    Unmatched,
}

/// One fallback heuristic.
pub struct ActionRule {
    pub name: &'static str,
    pub applies: fn(&str) -> bool,
    pub key: &'static str,
    pub label: &'static str,
}

/// Fallback heuristics in priority order (first match wins).
pub static FALLBACK_RULES: &[ActionRule] = &[
    ActionRule {
        name: "read_prefix",
        applies: |op| {
            op.starts_with("get")
                || op.starts_with("read")
                || op.starts_with("list")
                || op.contains(" list")
        },
        key: "retrieved",
        label: "Retrieved",
    },
    ActionRule {
        name: "create_prefix",
        applies: |op| op.starts_with("create"),
        key: "created",
        label: "Created",
    },
    ActionRule {
        name: "update_prefix",
        applies: |op| op.starts_with("update"),
        key: "updated",
        label: "Updated",
    },
    ActionRule {
        name: "delete_prefix",
        applies: |op| op.starts_with("delete"),
        key: "deleted",
        label: "Deleted",
    },
];

/// Classify an operation name. Never fails.
pub fn classify_action(operation: &OperationText, index: &ActionIndex) -> ActionMatch {
    if let Some(variant) = index
        .variants()
        .iter()
        .find(|v| operation.contains_phrase(&v.phrase))
    {
        return ActionMatch {
            key: variant.key.clone(),
            label: variant.label.clone(),
            source: ActionSource::Taxonomy {
                phrase: variant.phrase.clone(),
            },
        };
    }

    let normalized = operation.normalized();
    if let Some(rule) = FALLBACK_RULES.iter().find(|r| (r.applies)(normalized)) {
        return ActionMatch {
            key: rule.key.to_string(),
            label: rule.label.to_string(),
            source: ActionSource::Rule { rule: rule.name },
        };
    }

    ActionMatch {
        key: OTHER_KEY.to_string(),
        label: first_token_label(normalized),
        source: ActionSource::Unmatched,
    }
}

/// Capitalized first space-delimited token.
fn first_token_label(normalized: &str) -> String {
    let token = normalized.split(' ').next().unwrap_or_default();
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => OTHER_LABEL.to_string(),
    }
}
