//! Core document types for docfiler.
//!
//! A [`DocumentRecord`] is one stored form: the common fields every record
//! carries plus a flat map of type-specific fields whose names come from the
//! matching entry in the [`registry`](crate::registry).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Placeholder shown for a type-specific field the record does not carry.
pub const MISSING_FIELD: &str = "N/A";

/// Approval state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Awaiting a decision.
    #[default]
    Pending,
    /// Approved by the authorizer.
    Approved,
    /// Rejected by the authorizer.
    Rejected,
}

impl Status {
    /// Every status, in display order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    /// The lowercase wire name of this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::validation(format!("unknown status: {s}")))
    }
}

/// A stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    /// Internal identifier, assigned by the store and never changed.
    pub id: String,

    /// Human-facing code such as `GATEPASS2401001`.
    pub doc_id: String,

    /// Registry type key. May be a key the registry does not know.
    #[serde(rename = "type")]
    pub doc_type: String,

    /// Document date, `YYYY-MM-DD`.
    pub date: String,

    /// The person the document is about.
    pub person_name: String,

    /// Who authorized it.
    pub authorized_by: String,

    /// Approval state.
    pub status: Status,

    /// When the record was created. Never changes.
    pub created_at: DateTime<Utc>,

    /// When the record was last written.
    pub updated_at: DateTime<Utc>,

    /// Type-specific fields, keyed by field name.
    #[serde(flatten, deserialize_with = "stored_fields")]
    pub fields: BTreeMap<String, String>,
}

/// Read stored type-specific fields, accepting any JSON value.
///
/// Numbers and booleans become their JSON text, nested values are kept as
/// JSON text, and nulls are dropped.
fn stored_fields<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, String>, D::Error> {
    let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(name, value)| match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some((name, s)),
            other => Some((name, other.to_string())),
        })
        .collect())
}

impl DocumentRecord {
    /// The value of a type-specific field, or [`MISSING_FIELD`] when absent.
    #[must_use]
    pub fn field_or_missing(&self, name: &str) -> &str {
        self.fields.get(name).map_or(MISSING_FIELD, String::as_str)
    }

    /// Human-readable type name, falling back to the raw type key.
    #[must_use]
    pub fn type_name(&self) -> &str {
        crate::registry::display_name(&self.doc_type)
    }
}

/// The input to a create or update.
///
/// Every common field is optional here so that a missing value can be
/// reported as a validation error naming the field instead of a parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPayload {
    /// Registry type key.
    #[serde(rename = "type", default)]
    pub doc_type: Option<String>,

    /// Document date, `YYYY-MM-DD`.
    #[serde(default)]
    pub date: Option<String>,

    /// The person the document is about.
    #[serde(default)]
    pub person_name: Option<String>,

    /// Who authorized it.
    #[serde(default)]
    pub authorized_by: Option<String>,

    /// Approval state as its wire name.
    #[serde(default)]
    pub status: Option<String>,

    /// Type-specific fields.
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl DocumentPayload {
    /// Start a payload for the given type key.
    #[must_use]
    pub fn new(doc_type: impl Into<String>) -> Self {
        Self {
            doc_type: Some(doc_type.into()),
            ..Self::default()
        }
    }

    /// Set the document date.
    #[must_use]
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Set the person name.
    #[must_use]
    pub fn person_name(mut self, name: impl Into<String>) -> Self {
        self.person_name = Some(name.into());
        self
    }

    /// Set the authorizer.
    #[must_use]
    pub fn authorized_by(mut self, name: impl Into<String>) -> Self {
        self.authorized_by = Some(name.into());
        self
    }

    /// Set the status.
    #[must_use]
    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status.as_str().to_string());
        self
    }

    /// Set a type-specific field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields
            .insert(name.into(), serde_json::Value::String(value.into()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> DocumentRecord {
        let now = Utc::now();
        DocumentRecord {
            id: "1".to_string(),
            doc_id: "GATEPASS2401001".to_string(),
            doc_type: "gate-pass".to_string(),
            date: "2024-01-15".to_string(),
            person_name: "John Doe".to_string(),
            authorized_by: "Manager Smith".to_string(),
            status: Status::Approved,
            created_at: now,
            updated_at: now,
            fields: BTreeMap::from([("assetTag".to_string(), "LT001234".to_string())]),
        }
    }

    #[test]
    fn test_status_display_and_parse() {
        assert_eq!(Status::Pending.to_string(), "pending");
        assert_eq!("approved".parse::<Status>().unwrap(), Status::Approved);
        assert_eq!("Rejected".parse::<Status>().unwrap(), Status::Rejected);
        assert!("archived".parse::<Status>().unwrap_err().is_validation());
    }

    #[test]
    fn test_status_default_is_pending() {
        assert_eq!(Status::default(), Status::Pending);
    }

    #[test]
    fn test_record_json_shape() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(json["docId"], "GATEPASS2401001");
        assert_eq!(json["type"], "gate-pass");
        assert_eq!(json["personName"], "John Doe");
        assert_eq!(json["authorizedBy"], "Manager Smith");
        assert_eq!(json["status"], "approved");
        assert_eq!(json["assetTag"], "LT001234");
        assert!(json.get("fields").is_none());
        assert!(json["createdAt"].is_string());
    }

    #[test]
    fn test_record_parses_stored_sample_shape() {
        let json = r#"{
            "id": "2",
            "docId": "JOBCARD23010001",
            "type": "job-card",
            "date": "2024-01-16",
            "personName": "IT Department",
            "authorizedBy": "CTO Johnson",
            "status": "pending",
            "jobTitle": "Server Maintenance",
            "priority": "High",
            "createdAt": "2024-01-16T09:00:00Z",
            "updatedAt": "2024-01-16T09:00:00Z"
        }"#;
        let record: DocumentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.doc_id, "JOBCARD23010001");
        assert_eq!(record.status, Status::Pending);
        assert_eq!(record.fields.len(), 2);
        assert_eq!(record.field_or_missing("priority"), "High");
    }

    #[test]
    fn test_record_accepts_non_string_fields() {
        let json = r#"{
            "id": "3",
            "docId": "INVOICE2401001",
            "type": "invoice",
            "date": "2024-01-18",
            "personName": "Acme",
            "authorizedBy": "Finance",
            "status": "pending",
            "amount": 1250,
            "paid": false,
            "clientName": null,
            "createdAt": "2024-01-18T09:00:00Z",
            "updatedAt": "2024-01-18T09:00:00Z"
        }"#;
        let record: DocumentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.field_or_missing("amount"), "1250");
        assert_eq!(record.field_or_missing("paid"), "false");
        assert_eq!(record.field_or_missing("clientName"), MISSING_FIELD);
    }

    #[test]
    fn test_field_or_missing() {
        let record = sample_record();
        assert_eq!(record.field_or_missing("assetTag"), "LT001234");
        assert_eq!(record.field_or_missing("purpose"), MISSING_FIELD);
    }

    #[test]
    fn test_type_name_fallback() {
        let mut record = sample_record();
        assert_eq!(record.type_name(), "Gate Pass");
        record.doc_type = "visitor-badge".to_string();
        assert_eq!(record.type_name(), "visitor-badge");
    }

    #[test]
    fn test_payload_builder() {
        let payload = DocumentPayload::new("invoice")
            .date("2024-02-01")
            .person_name("Acme")
            .status(Status::Pending)
            .field("amount", "120.50");
        assert_eq!(payload.doc_type.as_deref(), Some("invoice"));
        assert_eq!(payload.status.as_deref(), Some("pending"));
        assert_eq!(payload.fields["amount"], "120.50");
        assert!(payload.authorized_by.is_none());
    }

    #[test]
    fn test_payload_deserializes_flat_fields() {
        let json = r#"{"type":"invoice","personName":"Acme","amount":99.5,"clientName":"Acme Ltd"}"#;
        let payload: DocumentPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.person_name.as_deref(), Some("Acme"));
        assert!(payload.date.is_none());
        assert_eq!(payload.fields["amount"], serde_json::json!(99.5));
        assert_eq!(payload.fields["clientName"], "Acme Ltd");
    }
}
