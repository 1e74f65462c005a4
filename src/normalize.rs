//! Text normalization shared by the index builder and the classifiers.

/// Normalize a string for lookup: lowercase, collapse whitespace.
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove every space from an already-normalized string.
pub fn compact(normalized: &str) -> String {
    normalized.chars().filter(|c| *c != ' ').collect()
}

/// A normalized operation name together with its space-free form.
///
/// Built once per row so every phrase test reuses the same two strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationText {
    normalized: String,
    compact: String,
}

impl OperationText {
    pub fn new(raw: &str) -> Self {
        let normalized = normalize(raw);
        let compact = compact(&normalized);
        Self {
            normalized,
            compact,
        }
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.normalized.contains(needle)
    }

    /// Phrase containment: a literal substring hit, or for multi-word
    /// phrases a hit on the space-free forms ("stop instance" in "stopinstances").
    pub fn contains_phrase(&self, phrase: &str) -> bool {
        if phrase.is_empty() {
            return false;
        }
        if self.normalized.contains(phrase) {
            return true;
        }
        phrase.contains(' ') && self.compact.contains(&compact(phrase))
    }
}
