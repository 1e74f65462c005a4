//! Canonical activity taxonomy
//!
//! Object and action definitions, their YAML loader, and the lookup
//! indexes the classifiers scan.

pub mod index;
pub mod loader;
pub mod types;

pub use index::{
    build_action_index, build_object_index, ActionIndex, ActionVariant, ActivityTaxonomy,
    ObjectAlias, ObjectIndex,
};
pub use loader::{parse_definitions, TaxonomyLoader, ACTIONS_FILE, OBJECTS_FILE};
pub use types::*;
