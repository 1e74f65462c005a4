//! Taxonomy loader - parse object/action definitions from YAML.
//!
//! ## Formats
//!
//! ```yaml
//! # common_objects.yaml
//! virtual_machine:
//!   canonical_label: "Virtual Machine"
//!   provider_aliases:
//!     azure: ["virtual machines", "virtualmachines"]
//!     aws: ["ec2 instance"]
//!
//! # common_actions.yaml
//! stopped:
//!   label: "Stopped"
//!   provider_variants: ["deallocate", "stop instance", "power off"]
//! ```
//!
//! Both documents may also be wrapped under a top-level `objects:` /
//! `actions:` key.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use super::types::*;
use crate::error::ConfigError;

pub const OBJECTS_FILE: &str = "common_objects.yaml";
pub const ACTIONS_FILE: &str = "common_actions.yaml";

/// Loads taxonomy definitions from a directory holding the two YAML files.
pub struct TaxonomyLoader {
    taxonomy_dir: PathBuf,
}

impl TaxonomyLoader {
    pub fn new(taxonomy_dir: &Path) -> Self {
        Self {
            taxonomy_dir: taxonomy_dir.to_path_buf(),
        }
    }

    pub fn taxonomy_dir(&self) -> &Path {
        &self.taxonomy_dir
    }

    /// Read and parse both taxonomy files.
    ///
    /// Unlike optional config, a missing file is an error: nothing can be
    /// classified safely without the taxonomy.
    pub fn load(&self) -> Result<TaxonomyDefinitions, ConfigError> {
        let objects_src = self.read(OBJECTS_FILE)?;
        let actions_src = self.read(ACTIONS_FILE)?;

        let definitions = parse_definitions(&objects_src, &actions_src)?;

        tracing::info!(
            dir = %self.taxonomy_dir.display(),
            objects = definitions.objects.len(),
            actions = definitions.actions.len(),
            fingerprint = %definitions.fingerprint,
            "loaded taxonomy"
        );

        Ok(definitions)
    }

    fn read(&self, file: &str) -> Result<String, ConfigError> {
        let path = self.taxonomy_dir.join(file);
        if !path.exists() {
            return Err(ConfigError::NotFound { path });
        }
        std::fs::read_to_string(&path).map_err(|source| ConfigError::Io { path, source })
    }
}

/// Parse both definitions from YAML text.
pub fn parse_definitions(
    objects_yaml: &str,
    actions_yaml: &str,
) -> Result<TaxonomyDefinitions, ConfigError> {
    Ok(TaxonomyDefinitions {
        objects: parse_objects(objects_yaml)?,
        actions: parse_actions(actions_yaml)?,
        fingerprint: fingerprint(objects_yaml, actions_yaml),
    })
}

/// Parse object entries, preserving document order.
pub fn parse_objects(yaml: &str) -> Result<Vec<ObjectEntry>, ConfigError> {
    let doc: serde_yaml::Value = serde_yaml::from_str(yaml)?;
    let entries = root_mapping(&doc, "objects", "canonical_label", OBJECTS_FILE)?;

    let mut objects = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let id = entry_id(key, OBJECTS_FILE)?;
        let canonical_label = required_str(value, &id, "canonical_label")?;

        let mut provider_aliases = Vec::new();
        if let Some(providers) = value.get("provider_aliases") {
            let providers =
                providers
                    .as_mapping()
                    .ok_or_else(|| ConfigError::InvalidShape {
                        source_name: format!("{}.provider_aliases", id),
                        expected: "a mapping of provider to alias list".to_string(),
                    })?;
            for (provider, aliases) in providers {
                provider_aliases.push(ProviderAliases {
                    provider: provider.as_str().unwrap_or_default().to_string(),
                    aliases: string_list(aliases),
                });
            }
        }

        objects.push(ObjectEntry {
            id,
            canonical_label,
            provider_aliases,
        });
    }

    Ok(objects)
}

/// Parse action entries, preserving document order.
pub fn parse_actions(yaml: &str) -> Result<Vec<ActionEntry>, ConfigError> {
    let doc: serde_yaml::Value = serde_yaml::from_str(yaml)?;
    let entries = root_mapping(&doc, "actions", "label", ACTIONS_FILE)?;

    let mut actions = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let key = entry_id(key, ACTIONS_FILE)?;
        let label = required_str(value, &key, "label")?;
        let provider_variants = value
            .get("provider_variants")
            .map(string_list)
            .unwrap_or_default();

        actions.push(ActionEntry {
            key,
            label,
            provider_variants,
        });
    }

    Ok(actions)
}

/// SHA-256 over both documents, in a fixed order.
pub fn fingerprint(objects_yaml: &str, actions_yaml: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"activity_taxonomy_v1");
    hasher.update(objects_yaml.as_bytes());
    hasher.update(b"\0");
    hasher.update(actions_yaml.as_bytes());
    hex::encode(hasher.finalize())
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Accept both `objects: {..}` and a top-level mapping.
///
/// The wrapper key only counts as a wrapper when its value is not itself an
/// entry (an object with id `objects` carries a `canonical_label`).
fn root_mapping<'a>(
    doc: &'a serde_yaml::Value,
    wrapper: &str,
    entry_field: &str,
    source_name: &str,
) -> Result<&'a serde_yaml::Mapping, ConfigError> {
    if doc.is_null() {
        return Err(ConfigError::InvalidShape {
            source_name: source_name.to_string(),
            expected: "a non-empty mapping".to_string(),
        });
    }
    doc.get(wrapper)
        .and_then(|v| v.as_mapping())
        .filter(|inner| !inner.contains_key(entry_field))
        .or_else(|| doc.as_mapping())
        .ok_or_else(|| ConfigError::InvalidShape {
            source_name: source_name.to_string(),
            expected: "a mapping of identifiers to entries".to_string(),
        })
}

fn entry_id(key: &serde_yaml::Value, source_name: &str) -> Result<String, ConfigError> {
    match key {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        _ => Err(ConfigError::InvalidShape {
            source_name: source_name.to_string(),
            expected: "scalar entry identifiers".to_string(),
        }),
    }
}

fn required_str(value: &serde_yaml::Value, entry: &str, field: &str) -> Result<String, ConfigError> {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| ConfigError::MissingField {
            entry: entry.to_string(),
            field: field.to_string(),
        })
}

/// A YAML list of scalars as strings; a lone scalar counts as a one-item list.
fn string_list(value: &serde_yaml::Value) -> Vec<String> {
    match value {
        serde_yaml::Value::Sequence(seq) => seq.iter().filter_map(scalar_string).collect(),
        other => scalar_string(other).into_iter().collect(),
    }
}

fn scalar_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const OBJECTS: &str = r#"
virtual_machine:
  canonical_label: "Virtual Machine"
  provider_aliases:
    azure: ["virtual machines", "virtualmachines"]
    aws: ["ec2 instance"]
storage_bucket:
  canonical_label: "Storage Bucket"
  provider_aliases:
    aws: "s3 bucket"
"#;

    const ACTIONS: &str = r#"
actions:
  stopped:
    label: "Stopped"
    provider_variants:
      - "deallocate"
      - "stop instance"
  created:
    label: "Created"
"#;

    #[test]
    fn test_parse_objects_preserves_order() {
        let objects = parse_objects(OBJECTS).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].id, "virtual_machine");
        assert_eq!(objects[0].canonical_label, "Virtual Machine");
        assert_eq!(objects[0].provider_aliases[0].provider, "azure");
        assert_eq!(objects[0].provider_aliases[1].aliases, vec!["ec2 instance"]);
        // Lone scalar alias is accepted
        assert_eq!(objects[1].provider_aliases[0].aliases, vec!["s3 bucket"]);
    }

    #[test]
    fn test_parse_wrapped_actions() {
        let actions = parse_actions(ACTIONS).unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].key, "stopped");
        assert_eq!(actions[0].provider_variants.len(), 2);
        assert!(actions[1].provider_variants.is_empty());
    }

    #[test]
    fn test_missing_label_is_config_error() {
        let err = parse_actions("stopped:\n  provider_variants: [stop]\n").unwrap_err();
        match err {
            ConfigError::MissingField { entry, field } => {
                assert_eq!(entry, "stopped");
                assert_eq!(field, "label");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_canonical_label_is_config_error() {
        let err = parse_objects("vm:\n  provider_aliases: {azure: [vm]}\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { .. }));
    }

    #[test]
    fn test_non_mapping_document_rejected() {
        assert!(matches!(
            parse_objects("- a\n- b\n").unwrap_err(),
            ConfigError::InvalidShape { .. }
        ));
        assert!(matches!(
            parse_actions("").unwrap_err(),
            ConfigError::InvalidShape { .. }
        ));
    }

    #[test]
    fn test_loader_reads_directory() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(OBJECTS_FILE), OBJECTS).unwrap();
        std::fs::write(dir.path().join(ACTIONS_FILE), ACTIONS).unwrap();

        let defs = TaxonomyLoader::new(dir.path()).load().unwrap();
        assert_eq!(defs.objects.len(), 2);
        assert_eq!(defs.actions.len(), 2);
        assert_eq!(defs.fingerprint, fingerprint(OBJECTS, ACTIONS));
    }

    #[test]
    fn test_loader_missing_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(OBJECTS_FILE), OBJECTS).unwrap();

        let err = TaxonomyLoader::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_entry_named_like_wrapper_is_an_entry() {
        let yaml = r#"
objects:
  canonical_label: "Storage Object"
  provider_aliases:
    gcp: ["storage.objects"]
user:
  canonical_label: User
"#;
        let objects = parse_objects(yaml).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].id, "objects");
        assert_eq!(objects[0].canonical_label, "Storage Object");
        assert_eq!(objects[1].id, "user");

        let actions = parse_actions("actions:\n  label: Acted\n  provider_variants: [act]\n").unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].key, "actions");
        assert_eq!(actions[0].label, "Acted");
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        assert_eq!(fingerprint(OBJECTS, ACTIONS), fingerprint(OBJECTS, ACTIONS));
        assert_ne!(fingerprint(OBJECTS, ACTIONS), fingerprint(ACTIONS, OBJECTS));
        assert_eq!(fingerprint("", "").len(), 64);
    }
}
