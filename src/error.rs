//! Error types for the canonicalizer
//!
//! Classification itself never fails. The errors here cover the two places
//! where input can be unusable: the taxonomy (fatal for a run) and a table's
//! schema or encoding (fatal for that table only).

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type
#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NormalizeError {
    /// True when the error only invalidates one table, not the whole run.
    pub fn is_table_scoped(&self) -> bool {
        matches!(self, Self::Schema(_) | Self::Table(_))
    }
}

/// No usable operation-name column could be identified in a table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("could not identify operation column in '{table}' (columns: {})", columns.join(", "))]
pub struct SchemaError {
    pub table: String,
    pub columns: Vec<String>,
}

/// Taxonomy source errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("taxonomy entry '{entry}' is missing required field '{field}'")]
    MissingField { entry: String, field: String },

    #[error("taxonomy source '{source_name}' must be {expected}")]
    InvalidShape {
        source_name: String,
        expected: String,
    },

    #[error("taxonomy file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read taxonomy file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid taxonomy YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Table read/write errors
#[derive(Error, Debug)]
pub enum TableError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("row {row} of '{table}' has {cells} cells but only {columns} columns")]
    RowWidth {
        table: String,
        row: usize,
        cells: usize,
        columns: usize,
    },
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
