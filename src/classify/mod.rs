//! Classification engine
//!
//! Pure functions from one record's text fields to its canonical labels:
//!
//! ```text
//! (resource type, operation name) ──► object label ─┐
//! operation name ──► action key/label ──► qualifiers ├─► common name ──► aggregation key
//! data-action flag ─────────────────────┘            │
//! ```
//!
//! Nothing here fails: unknown input always resolves to a fallback label.

pub mod action;
pub mod label;
pub mod object;
pub mod qualifier;

use serde::Serialize;

pub use action::{classify_action, ActionMatch, ActionSource};
pub use label::{aggregation_key, build_common_name};
pub use object::classify_object;
pub use qualifier::{derive_qualifiers, Qualifier, QualifierContext, QualifierSet};

use crate::normalize::OperationText;
use crate::taxonomy::ActivityTaxonomy;

/// Text fields of one record the engine looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordFields<'a> {
    pub operation: &'a str,
    pub resource_type: &'a str,
    pub data_flag: Option<&'a str>,
}

/// Canonical labels for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub object_label: String,
    pub action_key: String,
    pub action_label: String,
    pub qualifiers: QualifierSet,
    pub common_name: String,
    pub aggregation_key: String,
}

impl ClassificationResult {
    /// Qualifiers joined with `;` (empty when none)
    pub fn qualifier_string(&self) -> String {
        self.qualifiers.joined()
    }
}

/// Run the whole engine for one record.
pub fn classify_record(fields: &RecordFields<'_>, taxonomy: &ActivityTaxonomy) -> ClassificationResult {
    let operation = OperationText::new(fields.operation);

    let object_label = classify_object(fields.resource_type, fields.operation, &taxonomy.objects);
    let action = classify_action(&operation, &taxonomy.actions);
    let qualifiers = derive_qualifiers(&QualifierContext {
        data_flag: fields.data_flag,
        action_key: &action.key,
        operation: &operation,
    });

    let common_name = build_common_name(&object_label, &action.label, &qualifiers);
    let aggregation_key = aggregation_key(&common_name);

    ClassificationResult {
        object_label,
        action_key: action.key,
        action_label: action.label,
        qualifiers,
        common_name,
        aggregation_key,
    }
}
