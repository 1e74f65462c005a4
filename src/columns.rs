//! Column resolution - map a provider schema onto canonical roles.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::SchemaError;

/// Semantic role a column can play, in resolution priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Operation,
    ResourceType,
    Service,
    Description,
    IsData,
    Origin,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 6] = [
        ColumnRole::Operation,
        ColumnRole::ResourceType,
        ColumnRole::Service,
        ColumnRole::Description,
        ColumnRole::IsData,
        ColumnRole::Origin,
    ];

    /// Accepted header names (lowercase), most preferred first.
    pub fn hints(self) -> &'static [&'static str] {
        match self {
            Self::Operation => &[
                "operation name",
                "operation",
                "action performed",
                "event",
                "action",
            ],
            Self::ResourceType => &[
                "resource type",
                "resource",
                "resource_name",
                "resource category",
            ],
            Self::Service => &["service", "provider", "namespace"],
            Self::Description => &["description", "details", "detail"],
            Self::IsData => &[
                "isdataaction",
                "is_data_action",
                "is_data",
                "data action",
                "data_action",
            ],
            Self::Origin => &["origin", "source"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Operation => "operation",
            Self::ResourceType => "resource_type",
            Self::Service => "service",
            Self::Description => "description",
            Self::IsData => "is_data",
            Self::Origin => "origin",
        }
    }
}

/// Canonical role → actual column name for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    operation: String,
    resource_type: String,
    /// True when `resource_type` fell back to the operation column
    resource_type_aliased: bool,
    optional: HashMap<ColumnRole, String>,
}

impl ColumnMapping {
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Always mapped: defaults to the operation column.
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn resource_type_aliased(&self) -> bool {
        self.resource_type_aliased
    }

    /// Column for a role, `None` when the table has no such column.
    pub fn column(&self, role: ColumnRole) -> Option<&str> {
        match role {
            ColumnRole::Operation => Some(&self.operation),
            ColumnRole::ResourceType => Some(&self.resource_type),
            other => self.optional.get(&other).map(|s| s.as_str()),
        }
    }
}

/// Resolve a table's columns against the role hints.
///
/// Header comparison is case-insensitive; when two headers differ only in
/// case the later one is used.
pub fn resolve_columns(table: &str, columns: &[String]) -> Result<ColumnMapping, SchemaError> {
    let lower_map: HashMap<String, &str> = columns
        .iter()
        .map(|c| (header_key(c), c.as_str()))
        .collect();

    let mut found: HashMap<ColumnRole, String> = HashMap::new();
    for role in ColumnRole::ALL {
        if let Some(column) = role.hints().iter().find_map(|h| lower_map.get(*h)) {
            found.insert(role, column.to_string());
        }
    }

    let Some(operation) = found.remove(&ColumnRole::Operation) else {
        return Err(SchemaError {
            table: table.to_string(),
            columns: columns.to_vec(),
        });
    };

    let (resource_type, resource_type_aliased) = match found.remove(&ColumnRole::ResourceType) {
        Some(column) => (column, false),
        None => (operation.clone(), true),
    };

    tracing::debug!(
        table,
        operation = %operation,
        resource_type = %resource_type,
        optional = found.len(),
        "resolved columns"
    );

    Ok(ColumnMapping {
        operation,
        resource_type,
        resource_type_aliased,
        optional: found,
    })
}

/// Lowercased header with surrounding whitespace and a UTF-8 BOM removed.
fn header_key(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase()
}
