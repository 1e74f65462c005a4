//! Taxonomy location
//!
//! Resolves the directory holding `common_objects.yaml` and
//! `common_actions.yaml`.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::taxonomy::{ActivityTaxonomy, TaxonomyLoader, OBJECTS_FILE};

/// Environment variable overriding the taxonomy directory.
pub const TAXONOMY_DIR_ENV: &str = "CANON_TAXONOMY_DIR";

pub struct TaxonomyLocator {
    taxonomy_dir: PathBuf,
}

impl TaxonomyLocator {
    pub fn new(taxonomy_dir: impl Into<PathBuf>) -> Self {
        Self {
            taxonomy_dir: taxonomy_dir.into(),
        }
    }

    /// Locate the taxonomy from CANON_TAXONOMY_DIR or well-known paths.
    ///
    /// Path resolution order:
    /// 1. CANON_TAXONOMY_DIR environment variable (explicit override)
    /// 2. Relative "taxonomy" (layout of an exported working directory)
    /// 3. Relative "config/taxonomy" (running from the repository root)
    /// 4. CARGO_MANIFEST_DIR/config/taxonomy (tests and `cargo run`)
    pub fn from_env() -> Self {
        if let Ok(dir) = std::env::var(TAXONOMY_DIR_ENV) {
            return Self::new(dir);
        }

        for candidate in ["taxonomy", "config/taxonomy"] {
            if Path::new(candidate).join(OBJECTS_FILE).exists() {
                return Self::new(candidate);
            }
        }

        // Last resort - compile-time crate path, fails with a clear error if absent
        Self::new(concat!(env!("CARGO_MANIFEST_DIR"), "/config/taxonomy"))
    }

    pub fn taxonomy_dir(&self) -> &Path {
        &self.taxonomy_dir
    }

    /// Load definitions and build the indexes.
    pub fn load(&self) -> Result<ActivityTaxonomy, ConfigError> {
        let definitions = TaxonomyLoader::new(&self.taxonomy_dir).load()?;
        ActivityTaxonomy::from_definitions(&definitions)
    }
}
