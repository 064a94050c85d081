//! Versioned field values and field-level diffing
//!
//! Entities do not expose an open-ended object shape. Each one lists its
//! versioned fields explicitly through [`Versioned`], and every value is a
//! [`FieldValue`], so change detection is a structural comparison of two
//! tagged unions.

use crate::stake::OwnershipStake;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Value held by a versioned field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Flag(bool),
    Timestamp(DateTime<Utc>),
    TextList(Vec<String>),
    Stakes(Vec<OwnershipStake>),
    /// Structured nested record (e.g. an involvement record)
    Record(serde_json::Value),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Decimal(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::TextList(value)
    }
}

impl From<Vec<OwnershipStake>> for FieldValue {
    fn from(value: Vec<OwnershipStake>) -> Self {
        FieldValue::Stakes(value)
    }
}

/// A single field's transition inside a change record
///
/// `previous == None` means the field was absent before (added);
/// `new == None` means it is absent afterwards (removed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub previous: Option<FieldValue>,
    pub new: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl FieldChange {
    pub fn new(
        field: impl Into<String>,
        previous: Option<FieldValue>,
        new: Option<FieldValue>,
    ) -> Self {
        Self {
            field: field.into(),
            previous,
            new,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn is_addition(&self) -> bool {
        self.previous.is_none()
    }

    pub fn is_removal(&self) -> bool {
        self.new.is_none()
    }
}

/// An entity with an explicit list of versioned fields
///
/// Implementations must return the same field names in the same order
/// for every instance. Identity fields (`id`) and bookkeeping
/// (`version`, audit metadata) are not versioned fields.
pub trait Versioned {
    fn versioned_fields(&self) -> Vec<(&'static str, Option<FieldValue>)>;
}

/// Field changes between two snapshots of the same entity
pub fn diff_fields<T: Versioned>(before: &T, after: &T) -> Vec<FieldChange> {
    before
        .versioned_fields()
        .into_iter()
        .zip(after.versioned_fields())
        .filter(|((_, old), (_, new))| old != new)
        .map(|((field, old), (_, new))| FieldChange::new(field, old, new))
        .collect()
}

/// Field changes describing the creation of an entity (absent -> value)
pub fn creation_changes<T: Versioned>(created: &T) -> Vec<FieldChange> {
    created
        .versioned_fields()
        .into_iter()
        .filter(|(_, value)| value.is_some())
        .map(|(field, value)| FieldChange::new(field, None, value))
        .collect()
}
