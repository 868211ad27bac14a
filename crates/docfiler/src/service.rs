//! Create, read, update and delete operations over the document store.
//!
//! [`DocumentService`] is the only writer of a [`DocumentStore`]. Every
//! successful mutation is followed by a full write of the collection. If that
//! write fails the change stays in memory and the caller gets
//! [`Error::Persistence`] so it knows the change may be lost on restart.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::dashboard::{self, DashboardStats};
use crate::docid;
use crate::document::{DocumentPayload, DocumentRecord, Status};
use crate::error::{Error, Result};
use crate::registry::{self, DocumentTypeDescriptor, FieldKind};
use crate::search::{self, SearchCriteria, SearchResults};
use crate::storage::{Backend, DocumentStore};

/// Date format for the common `date` field and date-kind fields.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A payload that passed validation.
#[derive(Debug)]
struct Validated {
    doc_type: String,
    date: String,
    person_name: String,
    authorized_by: String,
    status: Status,
    fields: BTreeMap<String, String>,
}

fn text(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn field_text(value: &serde_json::Value) -> std::result::Result<Option<String>, &'static str> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s.trim().to_string()).filter(|s| !s.is_empty())),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        serde_json::Value::Bool(b) => Ok(Some(b.to_string())),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            Err("must be a string or number")
        }
    }
}

fn is_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, DATE_FORMAT).is_ok()
}

fn check_field(
    descriptor: &DocumentTypeDescriptor,
    name: &str,
    value: &str,
) -> std::result::Result<(), String> {
    let Some(field) = descriptor.field(name) else {
        return Ok(());
    };
    match field.kind {
        FieldKind::Number => match value.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(()),
            _ => Err(format!("{name} must be a number")),
        },
        FieldKind::Date if !is_date(value) => Err(format!("{name} must be a YYYY-MM-DD date")),
        FieldKind::Select if !field.options.contains(&value) => Err(format!(
            "{name} must be one of: {}",
            field.options.join(", ")
        )),
        _ => Ok(()),
    }
}

fn validate(payload: &DocumentPayload) -> Result<Validated> {
    let doc_type = text(payload.doc_type.as_ref())
        .ok_or_else(|| Error::validation("document type is required"))?;
    let descriptor = registry::describe(&doc_type)
        .ok_or_else(|| Error::validation(format!("unknown document type: {doc_type}")))?;

    let mut missing = Vec::new();
    let mut problems = Vec::new();

    let date = text(payload.date.as_ref());
    let person_name = text(payload.person_name.as_ref());
    let authorized_by = text(payload.authorized_by.as_ref());
    let status = text(payload.status.as_ref());
    for (name, value) in [
        ("date", &date),
        ("personName", &person_name),
        ("authorizedBy", &authorized_by),
        ("status", &status),
    ] {
        if value.is_none() {
            missing.push(name.to_string());
        }
    }
    if let Some(date) = &date {
        if !is_date(date) {
            problems.push("date must be a YYYY-MM-DD date".to_string());
        }
    }
    let status = match status.as_deref().map(str::parse::<Status>) {
        Some(Ok(status)) => Some(status),
        Some(Err(e)) => {
            problems.push(match e {
                Error::Validation { message } => message,
                other => other.to_string(),
            });
            None
        }
        None => None,
    };

    let mut fields = BTreeMap::new();
    for (name, raw) in &payload.fields {
        if descriptor.field(name).is_none() {
            debug!("Dropping field {} not defined for {}", name, doc_type);
            continue;
        }
        match field_text(raw) {
            Ok(Some(value)) => {
                if let Err(problem) = check_field(descriptor, name, &value) {
                    problems.push(problem);
                }
                fields.insert(name.clone(), value);
            }
            Ok(None) => {}
            Err(problem) => problems.push(format!("{name} {problem}")),
        }
    }
    for field in descriptor.fields {
        if field.required && !fields.contains_key(field.name) {
            missing.push(field.name.to_string());
        }
    }

    if !missing.is_empty() {
        problems.insert(0, format!("missing required fields: {}", missing.join(", ")));
    }
    if !problems.is_empty() {
        return Err(Error::validation(problems.join("; ")));
    }

    match (date, person_name, authorized_by, status) {
        (Some(date), Some(person_name), Some(authorized_by), Some(status)) => Ok(Validated {
            doc_type,
            date,
            person_name,
            authorized_by,
            status,
            fields,
        }),
        _ => Err(Error::internal("validated payload lost a common field")),
    }
}

/// `payload` laid over the stored contents of `record`.
fn merge(record: &DocumentRecord, payload: &DocumentPayload) -> DocumentPayload {
    let keep = |given: Option<&str>, stored: &str| Some(given.unwrap_or(stored).to_string());

    let mut fields: BTreeMap<String, serde_json::Value> = record
        .fields
        .iter()
        .map(|(name, value)| (name.clone(), serde_json::Value::String(value.clone())))
        .collect();
    fields.extend(payload.fields.clone());

    DocumentPayload {
        doc_type: keep(payload.doc_type.as_deref(), &record.doc_type),
        date: keep(payload.date.as_deref(), &record.date),
        person_name: keep(payload.person_name.as_deref(), &record.person_name),
        authorized_by: keep(payload.authorized_by.as_deref(), &record.authorized_by),
        status: keep(payload.status.as_deref(), record.status.as_str()),
        fields,
    }
}

/// The two records shipped as sample data.
fn sample_records() -> Result<Vec<DocumentRecord>> {
    let at = |s: &str| -> Result<DateTime<Utc>> {
        s.parse()
            .map_err(|e| Error::internal(format!("bad sample timestamp {s}: {e}")))
    };
    let fields = |pairs: &[(&str, &str)]| -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    };

    Ok(vec![
        DocumentRecord {
            id: "1".to_string(),
            doc_id: "GATEPASS23010001".to_string(),
            doc_type: "gate-pass".to_string(),
            date: "2024-01-15".to_string(),
            person_name: "John Doe".to_string(),
            authorized_by: "Manager Smith".to_string(),
            status: Status::Approved,
            created_at: at("2024-01-15T10:00:00Z")?,
            updated_at: at("2024-01-15T10:00:00Z")?,
            fields: fields(&[
                ("assetType", "Laptop"),
                ("assetTag", "LT001234"),
                ("exitDate", "2024-01-15"),
                ("returnDate", "2024-01-20"),
                ("purpose", "Work from home setup"),
            ]),
        },
        DocumentRecord {
            id: "2".to_string(),
            doc_id: "JOBCARD23010001".to_string(),
            doc_type: "job-card".to_string(),
            date: "2024-01-16".to_string(),
            person_name: "IT Department".to_string(),
            authorized_by: "CTO Johnson".to_string(),
            status: Status::Pending,
            created_at: at("2024-01-16T09:00:00Z")?,
            updated_at: at("2024-01-16T09:00:00Z")?,
            fields: fields(&[
                ("jobTitle", "Server Maintenance"),
                ("priority", "High"),
                ("assignedTo", "Tech Team"),
                ("dueDate", "2024-01-25"),
                ("description", "Monthly server maintenance and updates"),
            ]),
        },
    ])
}

/// Document operations over one store.
#[derive(Debug)]
pub struct DocumentService {
    store: DocumentStore,
    clock: Arc<dyn Clock>,
}

impl DocumentService {
    /// Load the store from `backend` and use the system clock.
    #[must_use]
    pub fn open(backend: Box<dyn Backend>) -> Self {
        Self::with_clock(backend, Arc::new(SystemClock))
    }

    /// Load the store from `backend` with an explicit clock.
    #[must_use]
    pub fn with_clock(backend: Box<dyn Backend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: DocumentStore::load(backend),
            clock,
        }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// All records in store order.
    #[must_use]
    pub fn list(&self) -> &[DocumentRecord] {
        self.store.snapshot()
    }

    /// Look up a record by internal id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has that id.
    pub fn read(&self, id: &str) -> Result<&DocumentRecord> {
        self.store.get(id).ok_or_else(|| Error::not_found(id))
    }

    /// Validate `payload` and store it as a new record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a bad payload (nothing is stored) or
    /// [`Error::Persistence`] if the record was added but could not be saved.
    pub fn create(&mut self, payload: &DocumentPayload) -> Result<DocumentRecord> {
        let valid = validate(payload)?;
        let now = self.clock.now();
        let doc_id = docid::generate(&valid.doc_type, now.date_naive(), self.store.snapshot());
        let id = self.store.next_id(now);

        let record = DocumentRecord {
            id,
            doc_id,
            doc_type: valid.doc_type,
            date: valid.date,
            person_name: valid.person_name,
            authorized_by: valid.authorized_by,
            status: valid.status,
            created_at: now,
            updated_at: now,
            fields: valid.fields,
        };
        self.store.push(record.clone());
        info!("Created document {} ({})", record.doc_id, record.id);

        self.store.persist()?;
        Ok(record)
    }

    /// Overwrite the supplied fields of an existing record.
    ///
    /// Anything `payload` leaves unset keeps its stored value, and the merged
    /// record is validated as a whole. `id`, `docId` and `createdAt` never
    /// change. Type-specific fields that the (possibly new) type does not
    /// declare are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has that id,
    /// [`Error::Validation`] if the merged record is invalid, or
    /// [`Error::Persistence`] if the change was applied but could not be
    /// saved.
    pub fn update(&mut self, id: &str, payload: &DocumentPayload) -> Result<DocumentRecord> {
        let current = self.store.get(id).ok_or_else(|| Error::not_found(id))?;
        let valid = validate(&merge(current, payload))?;
        let now = self.clock.now();

        let record = self.store.get_mut(id).ok_or_else(|| Error::not_found(id))?;
        record.doc_type = valid.doc_type;
        record.date = valid.date;
        record.person_name = valid.person_name;
        record.authorized_by = valid.authorized_by;
        record.status = valid.status;
        record.fields = valid.fields;
        record.updated_at = now.max(record.updated_at);
        let updated = record.clone();
        info!("Updated document {} ({})", updated.doc_id, updated.id);

        self.store.persist()?;
        Ok(updated)
    }

    /// Remove a record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has that id, or
    /// [`Error::Persistence`] if it was removed but the removal could not be
    /// saved.
    pub fn delete(&mut self, id: &str) -> Result<DocumentRecord> {
        let removed = self.store.remove(id).ok_or_else(|| Error::not_found(id))?;
        info!("Deleted document {} ({})", removed.doc_id, removed.id);

        self.store.persist()?;
        Ok(removed)
    }

    /// Filter the current records.
    #[must_use]
    pub fn search(&self, criteria: &SearchCriteria) -> SearchResults {
        let results = search::search(self.store.snapshot(), criteria);
        debug!("Search matched {} documents", results.count);
        results
    }

    /// Dashboard figures as of the clock's current date.
    #[must_use]
    pub fn stats(&self) -> DashboardStats {
        dashboard::stats(self.store.snapshot(), self.clock.today())
    }

    /// Load the sample records into an empty store.
    ///
    /// Returns how many records were added; zero if the store already had
    /// documents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persistence`] if the samples were added but could not
    /// be saved.
    pub fn seed_samples(&mut self) -> Result<usize> {
        if !self.store.snapshot().is_empty() {
            debug!("Store not empty, skipping sample data");
            return Ok(0);
        }
        let samples = sample_records()?;
        let count = samples.len();
        for record in samples {
            self.store.push(record);
        }
        info!("Loaded {} sample documents", count);

        self.store.persist()?;
        Ok(count)
    }
}
