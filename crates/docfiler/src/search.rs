//! Predicate search over the document collection.

use serde::{Deserialize, Deserializer, Serialize};

use crate::document::{DocumentRecord, Status};

/// Optional filters for a search. Every criterion that is set must match.
///
/// Blank strings are treated as unset, the same as an empty form field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchCriteria {
    /// Case-insensitive substring of the person name or document code.
    pub name: Option<String>,
    /// Exact type key.
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    /// Inclusive lower bound on the document date (string comparison).
    pub date_from: Option<String>,
    /// Inclusive upper bound on the document date (string comparison).
    pub date_to: Option<String>,
    /// Exact status.
    #[serde(deserialize_with = "blank_status")]
    pub status: Option<Status>,
}

fn blank_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Status>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

fn set(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl SearchCriteria {
    /// Whether no criterion is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        set(self.name.as_ref()).is_none()
            && set(self.doc_type.as_ref()).is_none()
            && set(self.date_from.as_ref()).is_none()
            && set(self.date_to.as_ref()).is_none()
            && self.status.is_none()
    }

    /// Whether `record` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, record: &DocumentRecord) -> bool {
        if let Some(name) = set(self.name.as_ref()) {
            let needle = name.to_lowercase();
            if !record.person_name.to_lowercase().contains(&needle)
                && !record.doc_id.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(doc_type) = set(self.doc_type.as_ref()) {
            if record.doc_type != doc_type {
                return false;
            }
        }
        if let Some(from) = set(self.date_from.as_ref()) {
            if record.date.as_str() < from {
                return false;
            }
        }
        if let Some(to) = set(self.date_to.as_ref()) {
            if record.date.as_str() > to {
                return false;
            }
        }
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        true
    }
}

/// The outcome of a search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    /// Whether any criterion was set. When false, `documents` is the whole
    /// collection.
    pub filtered: bool,
    /// Number of matches.
    pub count: usize,
    /// Matching records in store order.
    pub documents: Vec<DocumentRecord>,
}

impl SearchResults {
    /// Whether a filtered search found nothing.
    #[must_use]
    pub fn is_no_match(&self) -> bool {
        self.filtered && self.documents.is_empty()
    }
}

/// Run `criteria` over `records`, keeping their order.
#[must_use]
pub fn search(records: &[DocumentRecord], criteria: &SearchCriteria) -> SearchResults {
    let documents: Vec<_> = records
        .iter()
        .filter(|d| criteria.matches(d))
        .cloned()
        .collect();
    SearchResults {
        filtered: !criteria.is_empty(),
        count: documents.len(),
        documents,
    }
}
