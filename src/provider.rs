//! Provider discovery from export file names.

use std::fmt;

use serde::Serialize;

/// Cloud provider an export came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Provider {
    Azure,
    Aws,
    Gcp,
    Generic,
}

impl Provider {
    /// Guess the provider from a file name prefix (case-insensitive).
    pub fn from_file_name(file_name: &str) -> Self {
        let lower = file_name.to_lowercase();
        if lower.starts_with("azure") {
            Self::Azure
        } else if lower.starts_with("aws") {
            Self::Aws
        } else if lower.starts_with("gcp") {
            Self::Gcp
        } else {
            Self::Generic
        }
    }

    /// Tag written to every output row.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Azure => "Azure",
            Self::Aws => "Aws",
            Self::Gcp => "Gcp",
            Self::Generic => "Generic",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
