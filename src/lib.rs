//! Cloud Activity Canon - canonical taxonomy for cloud audit logs
//!
//! Rewrites audit-log exports from different providers onto one vocabulary
//! of objects and actions, so that "Azure VM deallocate" and "AWS
//! StopInstances" land on the same aggregation key.
//!
//! ## Call Chain
//! Taxonomy YAML -> indexes (once) -> per table: column mapping ->
//! per row: object + action -> qualifiers -> common name -> aggregation key
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cloud_activity_canon::classify::{classify_record, RecordFields};
//! use cloud_activity_canon::config::TaxonomyLocator;
//!
//! let taxonomy = TaxonomyLocator::from_env().load()?;
//! let result = classify_record(
//!     &RecordFields {
//!         operation: "Microsoft.Compute/virtualMachines/deallocate/action",
//!         resource_type: "Virtual Machines",
//!         data_flag: None,
//!     },
//!     &taxonomy,
//! );
//! assert_eq!(result.aggregation_key, "VIRTUAL_MACHINE_STOPPED");
//! # Ok::<(), cloud_activity_canon::error::ConfigError>(())
//! ```

// Core error handling
pub mod error;

// Taxonomy definitions, loader and indexes
pub mod taxonomy;

// Classification engine
pub mod classify;
pub mod columns;
pub mod normalize;

// Tables and the row pipeline
pub mod pipeline;
pub mod table;

// Batch processing over export directories
pub mod batch;
pub mod config;
pub mod provider;

pub use classify::{classify_record, ClassificationResult, RecordFields};
pub use error::{ConfigError, NormalizeError, SchemaError, TableError};
pub use pipeline::{classify_rows, normalize_table, NormalizedTable};
pub use taxonomy::ActivityTaxonomy;
