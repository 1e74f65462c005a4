//! Qualifier derivation.
//!
//! Qualifiers are appended in the order of [`QUALIFIER_RULES`]; the billing
//! qualifier for stopped resources is decided by [`STOP_BILLING_RULES`],
//! where the freed set is checked before the continues set.

use std::fmt;

use serde::Serialize;
use smallvec::SmallVec;

use crate::normalize::OperationText;

pub const STOPPED_KEY: &str = "stopped";

/// Phrases meaning the stopped resource no longer accrues compute charges.
pub const STOP_FREED_PHRASES: &[&str] = &["deallocate", "stop instance", "stop instances", "stopped"];

/// Phrases meaning the resource is off but still billed.
pub const STOP_CONTINUES_PHRASES: &[&str] = &["power off", "poweroff"];

/// A supplementary tag on a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Qualifier {
    Data,
    Admin,
    #[serde(rename = "All Disks")]
    AllDisks,
    #[serde(rename = "Billing Freed")]
    BillingFreed,
    #[serde(rename = "Billing Continues")]
    BillingContinues,
}

impl Qualifier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Data => "Data",
            Self::Admin => "Admin",
            Self::AllDisks => "All Disks",
            Self::BillingFreed => "Billing Freed",
            Self::BillingContinues => "Billing Continues",
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered qualifier list (at most one of each, rarely more than two).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QualifierSet(SmallVec<[Qualifier; 4]>);

impl QualifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, qualifier: Qualifier) {
        if !self.0.contains(&qualifier) {
            self.0.push(qualifier);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Qualifier> + '_ {
        self.0.iter().copied()
    }

    /// Display form: qualifiers joined with `;`.
    pub fn joined(&self) -> String {
        self.iter()
            .map(Qualifier::as_str)
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl FromIterator<Qualifier> for QualifierSet {
    fn from_iter<I: IntoIterator<Item = Qualifier>>(iter: I) -> Self {
        let mut set = Self::new();
        for q in iter {
            set.push(q);
        }
        set
    }
}

/// Inputs the qualifier rules look at.
pub struct QualifierContext<'a> {
    /// Raw value of the row's data-action flag, if the row has one
    pub data_flag: Option<&'a str>,
    pub action_key: &'a str,
    pub operation: &'a OperationText,
}

/// One qualifier rule: append `qualifier` when `applies` holds.
pub struct QualifierRule {
    pub qualifier: Qualifier,
    pub applies: fn(&QualifierContext<'_>) -> bool,
}

/// Row-level qualifier rules in output order.
pub static QUALIFIER_RULES: &[QualifierRule] = &[
    QualifierRule {
        qualifier: Qualifier::Data,
        applies: |ctx| {
            ctx.data_flag
                .is_some_and(|flag| flag.trim().eq_ignore_ascii_case("true"))
        },
    },
    QualifierRule {
        qualifier: Qualifier::Admin,
        applies: |ctx| ctx.operation.contains("admin") && ctx.operation.contains("login"),
    },
    QualifierRule {
        qualifier: Qualifier::AllDisks,
        applies: |ctx| ctx.operation.contains("all disks"),
    },
];

/// Billing rule for `stopped` actions: first phrase set that matches wins.
pub struct StopBillingRule {
    pub phrases: &'static [&'static str],
    pub qualifier: Qualifier,
}

pub static STOP_BILLING_RULES: &[StopBillingRule] = &[
    StopBillingRule {
        phrases: STOP_FREED_PHRASES,
        qualifier: Qualifier::BillingFreed,
    },
    StopBillingRule {
        phrases: STOP_CONTINUES_PHRASES,
        qualifier: Qualifier::BillingContinues,
    },
];

/// Billing qualifier for a stopped resource, if the name says which kind.
pub fn stop_billing_qualifier(operation: &OperationText) -> Option<Qualifier> {
    STOP_BILLING_RULES
        .iter()
        .find(|rule| rule.phrases.iter().any(|p| operation.contains_phrase(p)))
        .map(|rule| rule.qualifier)
}

/// Derive the ordered qualifier list for one row.
pub fn derive_qualifiers(ctx: &QualifierContext<'_>) -> QualifierSet {
    let mut set: QualifierSet = QUALIFIER_RULES
        .iter()
        .filter(|rule| (rule.applies)(ctx))
        .map(|rule| rule.qualifier)
        .collect();

    if ctx.action_key == STOPPED_KEY {
        if let Some(billing) = stop_billing_qualifier(ctx.operation) {
            set.push(billing);
        }
    }

    set
}
