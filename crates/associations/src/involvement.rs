//! Involvement records - discrete real-world actions under an association

use chrono::{DateTime, Utc};
use civic_core::{canonical_digest, ChangeAuthor, CoreError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// "received", "testified", "voted", ... recorded against an association
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvolvementRecord {
    pub id: String,
    pub association_id: String,
    pub action: String,
    pub details: String,
    pub occurred_at: DateTime<Utc>,
    pub recorded_by: ChangeAuthor,
    pub amount: Option<Decimal>,
    pub supporting_documents: Vec<String>,
    /// Placeholder proof over the record content
    pub signature: String,
    /// Change ids of the parent association's records that touched this entry
    pub change_history: Vec<String>,
}

/// Optional extras for `record_involvement`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvolvementExtra {
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub supporting_documents: Vec<String>,
}

#[derive(Serialize)]
struct SignedContent<'a> {
    id: &'a str,
    association_id: &'a str,
    action: &'a str,
    details: &'a str,
    occurred_at: &'a DateTime<Utc>,
    recorded_by: &'a str,
    amount: Option<&'a Decimal>,
    supporting_documents: &'a [String],
}

impl InvolvementRecord {
    pub(crate) fn new(
        id: String,
        association_id: &str,
        action: &str,
        details: &str,
        author: &ChangeAuthor,
        extra: InvolvementExtra,
    ) -> Result<Self, CoreError> {
        let mut record = Self {
            id,
            association_id: association_id.to_string(),
            action: action.to_string(),
            details: details.to_string(),
            occurred_at: extra.occurred_at.unwrap_or_else(Utc::now),
            recorded_by: author.clone(),
            amount: extra.amount,
            supporting_documents: extra.supporting_documents,
            signature: String::new(),
            change_history: Vec::new(),
        };
        record.signature = record.content_digest()?;
        Ok(record)
    }

    /// Digest of the signed content; equals `signature` unless tampered with
    pub fn content_digest(&self) -> Result<String, CoreError> {
        canonical_digest(&SignedContent {
            id: &self.id,
            association_id: &self.association_id,
            action: &self.action,
            details: &self.details,
            occurred_at: &self.occurred_at,
            recorded_by: &self.recorded_by.id,
            amount: self.amount.as_ref(),
            supporting_documents: &self.supporting_documents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_signature_covers_content() {
        let extra = InvolvementExtra {
            amount: Some(dec!(5000)),
            supporting_documents: vec!["receipt-1".to_string()],
            ..InvolvementExtra::default()
        };
        let mut record = InvolvementRecord::new(
            "I1".to_string(),
            "A1",
            "received",
            "campaign contribution",
            &ChangeAuthor::new("U1", "Clerk"),
            extra,
        )
        .unwrap();

        assert_eq!(record.signature, record.content_digest().unwrap());

        record.details = "edited".to_string();
        assert_ne!(record.signature, record.content_digest().unwrap());
    }
}
