//! Common name and aggregation key composition.

use regex::Regex;
use std::sync::LazyLock;

use super::qualifier::QualifierSet;

/// Trailing " (...)" qualifier suffix
static QUALIFIER_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+\(.*\)$").unwrap());

/// "{object} {action}" plus " (q1;q2)" when qualifiers exist.
pub fn build_common_name(object_label: &str, action_label: &str, qualifiers: &QualifierSet) -> String {
    let base = format!("{} {}", object_label, action_label);
    if qualifiers.is_empty() {
        base
    } else {
        format!("{} ({})", base, qualifiers.joined())
    }
}

/// Qualifier-independent grouping key derived from a common name.
///
/// `"Virtual Machine Stopped (Billing Freed)"` → `VIRTUAL_MACHINE_STOPPED`.
pub fn aggregation_key(common_name: &str) -> String {
    let base = QUALIFIER_SUFFIX_RE.replace(common_name, "");
    let base = base.replace(" or ", " OR ");
    base.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .map(|c| if c == ' ' { '_' } else { c.to_ascii_uppercase() })
        .collect()
}
