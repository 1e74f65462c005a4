//! Object classification: resource type + operation name → canonical object.

use crate::taxonomy::ObjectIndex;

/// Label used when neither the index nor the resource type yields anything.
pub const FALLBACK_OBJECT: &str = "Resource";

/// Classify the object a row acts on.
///
/// Aliases are tested for containment in `"{resource_type} {operation}"`
/// (lowercased). When several aliases match, the longest alias wins and
/// equal lengths are decided by alias text, so overlapping taxonomies still
/// classify deterministically.
pub fn classify_object(resource_type: &str, operation: &str, index: &ObjectIndex) -> String {
    let combined = format!("{} {}", resource_type, operation).to_lowercase();

    if let Some(hit) = index.aliases().find(|a| combined.contains(a.alias.as_str())) {
        return hit.label.clone();
    }

    singularize_fallback(resource_type)
}

/// Naive singular form of the raw resource type.
///
/// One trailing `s` is dropped when the trimmed text is longer than three
/// characters ("Disks" → "Disk", "Bus" unchanged).
pub fn singularize_fallback(resource_type: &str) -> String {
    let trimmed = resource_type.trim();
    let singular = match trimmed.strip_suffix('s') {
        Some(stem) if trimmed.chars().count() > 3 => stem,
        _ => trimmed,
    };
    if singular.is_empty() {
        FALLBACK_OBJECT.to_string()
    } else {
        singular.to_string()
    }
}
