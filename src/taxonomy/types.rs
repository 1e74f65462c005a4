//! Taxonomy definition types.
//!
//! Entries keep the order they had in their source document. That order
//! decides last-write-wins for colliding aliases and the stable order of
//! equal-length action phrases.

use serde::{Deserialize, Serialize};

/// Canonical object label (e.g., "Virtual Machine")
pub type ObjectLabel = String;

/// Stable action identifier (e.g., "stopped")
pub type ActionKey = String;

/// Aliases one provider uses for a canonical object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderAliases {
    /// Provider name as written in the taxonomy (e.g., "azure", "aws")
    pub provider: String,
    pub aliases: Vec<String>,
}

/// A canonical object and the provider phrases that refer to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ObjectEntry {
    /// Internal identifier (mapping key in the source)
    pub id: String,
    /// Display label written to output rows
    pub canonical_label: ObjectLabel,
    pub provider_aliases: Vec<ProviderAliases>,
}

/// A canonical action and the phrases that indicate it in an operation name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ActionEntry {
    pub key: ActionKey,
    /// Display label written to output rows
    pub label: String,
    pub provider_variants: Vec<String>,
}

/// Both taxonomy definitions, as parsed from their sources.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaxonomyDefinitions {
    pub objects: Vec<ObjectEntry>,
    pub actions: Vec<ActionEntry>,
    /// SHA-256 over the source documents; empty for in-memory taxonomies
    pub fingerprint: String,
}

impl ObjectEntry {
    pub fn new(id: &str, canonical_label: &str) -> Self {
        Self {
            id: id.to_string(),
            canonical_label: canonical_label.to_string(),
            provider_aliases: Vec::new(),
        }
    }

    /// Builder-style helper for tests and embedded taxonomies.
    pub fn with_aliases(mut self, provider: &str, aliases: &[&str]) -> Self {
        self.provider_aliases.push(ProviderAliases {
            provider: provider.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        });
        self
    }
}

impl ActionEntry {
    pub fn new(key: &str, label: &str, variants: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            provider_variants: variants.iter().map(|v| v.to_string()).collect(),
        }
    }
}
