//! Lookup indexes built once from the taxonomy definitions.
//!
//! ## Performance Requirements
//!
//! - Built once per run, read-only afterwards (`Send + Sync`, shareable
//!   across table workers without locking)
//! - Lookups are in-memory scans bounded by the taxonomy size

use std::cmp::Reverse;
use std::collections::HashMap;

use super::types::*;
use crate::error::ConfigError;
use crate::normalize::normalize;

/// One indexed object alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectAlias {
    pub alias: String,
    pub label: ObjectLabel,
}

/// Normalized alias → canonical object label.
#[derive(Debug, Clone, Default)]
pub struct ObjectIndex {
    by_alias: HashMap<String, ObjectLabel>,
    /// Same content, longest alias first, ties by alias text
    scan_order: Vec<ObjectAlias>,
}

impl ObjectIndex {
    /// Exact lookup of an already-normalized alias.
    pub fn get(&self, alias: &str) -> Option<&str> {
        self.by_alias.get(alias).map(|s| s.as_str())
    }

    /// Aliases in scan order (longest first).
    pub fn aliases(&self) -> impl Iterator<Item = &ObjectAlias> {
        self.scan_order.iter()
    }

    pub fn len(&self) -> usize {
        self.by_alias.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_alias.is_empty()
    }
}

/// One (phrase, key, label) tuple of the action index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionVariant {
    pub phrase: String,
    pub key: ActionKey,
    pub label: String,
}

/// Action phrases ordered by descending phrase length.
///
/// The order implements longest-match-wins: a scan stops at the first
/// contained phrase, so "stop instance" must come before "stop".
#[derive(Debug, Clone, Default)]
pub struct ActionIndex {
    variants: Vec<ActionVariant>,
}

impl ActionIndex {
    pub fn variants(&self) -> &[ActionVariant] {
        &self.variants
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// Build the object index. Later entries win when an alias repeats.
pub fn build_object_index(objects: &[ObjectEntry]) -> Result<ObjectIndex, ConfigError> {
    let mut by_alias: HashMap<String, ObjectLabel> = HashMap::new();

    for entry in objects {
        if entry.canonical_label.trim().is_empty() {
            return Err(ConfigError::MissingField {
                entry: entry.id.clone(),
                field: "canonical_label".to_string(),
            });
        }
        for provider in &entry.provider_aliases {
            for alias in &provider.aliases {
                let alias_norm = normalize(alias);
                // An empty alias would be contained in every row
                if alias_norm.is_empty() {
                    continue;
                }
                if let Some(previous) = by_alias.insert(alias_norm, entry.canonical_label.clone())
                {
                    if previous != entry.canonical_label {
                        tracing::debug!(
                            alias = %alias,
                            previous = %previous,
                            label = %entry.canonical_label,
                            "object alias reassigned"
                        );
                    }
                }
            }
        }
    }

    let mut scan_order: Vec<ObjectAlias> = by_alias
        .iter()
        .map(|(alias, label)| ObjectAlias {
            alias: alias.clone(),
            label: label.clone(),
        })
        .collect();
    scan_order.sort_by(|a, b| {
        Reverse(a.alias.chars().count())
            .cmp(&Reverse(b.alias.chars().count()))
            .then_with(|| a.alias.cmp(&b.alias))
    });

    Ok(ObjectIndex {
        by_alias,
        scan_order,
    })
}

/// Build the action index, longest phrase first, stable otherwise.
pub fn build_action_index(actions: &[ActionEntry]) -> Result<ActionIndex, ConfigError> {
    let mut variants = Vec::new();

    for entry in actions {
        if entry.key.trim().is_empty() {
            return Err(ConfigError::MissingField {
                entry: entry.label.clone(),
                field: "key".to_string(),
            });
        }
        if entry.label.trim().is_empty() {
            return Err(ConfigError::MissingField {
                entry: entry.key.clone(),
                field: "label".to_string(),
            });
        }
        for variant in &entry.provider_variants {
            let phrase = normalize(variant);
            if phrase.is_empty() {
                continue;
            }
            variants.push(ActionVariant {
                phrase,
                key: entry.key.clone(),
                label: entry.label.clone(),
            });
        }
    }

    // sort_by_key is stable: equal lengths keep document order
    variants.sort_by_key(|v| Reverse(v.phrase.chars().count()));

    Ok(ActionIndex { variants })
}

/// Both indexes plus the fingerprint of the definitions they came from.
#[derive(Debug, Clone, Default)]
pub struct ActivityTaxonomy {
    pub objects: ObjectIndex,
    pub actions: ActionIndex,
    pub fingerprint: String,
}

impl ActivityTaxonomy {
    pub fn from_definitions(definitions: &TaxonomyDefinitions) -> Result<Self, ConfigError> {
        let objects = build_object_index(&definitions.objects)?;
        let actions = build_action_index(&definitions.actions)?;

        tracing::debug!(
            aliases = objects.len(),
            phrases = actions.len(),
            fingerprint = %definitions.fingerprint,
            "built taxonomy indexes"
        );

        Ok(Self {
            objects,
            actions,
            fingerprint: definitions.fingerprint.clone(),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
