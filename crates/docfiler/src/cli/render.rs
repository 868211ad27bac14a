//! Text rendering for CLI output.

use std::fmt::Write as _;

use serde::Serialize;

use super::OutputFormat;
use crate::dashboard::DashboardStats;
use crate::document::DocumentRecord;
use crate::error::Result;
use crate::registry::{self, DocumentTypeDescriptor};

const TABLE_HEADERS: [&str; 6] = ["ID", "DOC ID", "TYPE", "DATE", "PERSON", "STATUS"];

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Full detail view of one record.
///
/// Type-specific fields are listed in registry order with `N/A` for any the
/// record lacks. Records of an unknown type list whatever fields they carry.
#[must_use]
pub fn record_detail(record: &DocumentRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", record.doc_id, record.type_name());
    let _ = writeln!(out, "  Id:            {}", record.id);
    let _ = writeln!(out, "  Date:          {}", record.date);
    let _ = writeln!(out, "  Person:        {}", record.person_name);
    let _ = writeln!(out, "  Authorized by: {}", record.authorized_by);
    let _ = writeln!(out, "  Status:        {}", record.status);
    let _ = writeln!(out, "  Created:       {}", record.created_at.to_rfc3339());
    let _ = writeln!(out, "  Updated:       {}", record.updated_at.to_rfc3339());

    match registry::describe(&record.doc_type) {
        Some(descriptor) => {
            for field in descriptor.fields {
                let _ = writeln!(
                    out,
                    "  {}: {}",
                    field.label,
                    record.field_or_missing(field.name)
                );
            }
        }
        None => {
            for (name, value) in &record.fields {
                let _ = writeln!(out, "  {name}: {value}");
            }
        }
    }
    out
}

fn record_line(record: &DocumentRecord) -> String {
    format!(
        "{}  {}  {}  {}  [{}]",
        record.doc_id,
        record.type_name(),
        record.date,
        record.person_name,
        record.status
    )
}

fn record_table(records: &[DocumentRecord]) -> String {
    let rows: Vec<[String; 6]> = records
        .iter()
        .map(|r| {
            [
                r.id.clone(),
                r.doc_id.clone(),
                r.type_name().to_string(),
                r.date.clone(),
                r.person_name.clone(),
                r.status.to_string(),
            ]
        })
        .collect();

    let mut widths = TABLE_HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = TABLE_HEADERS.iter().map(ToString::to_string).collect();
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

/// Render a list of records.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn records(records: &[DocumentRecord], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(records),
        _ if records.is_empty() => Ok("No documents found.\n".to_string()),
        OutputFormat::Table => Ok(record_table(records)),
        OutputFormat::Plain => Ok(records.iter().map(|r| record_line(r) + "\n").collect()),
    }
}

/// Render one record.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn record(record: &DocumentRecord, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(record),
        OutputFormat::Table => Ok(record_table(std::slice::from_ref(record))),
        OutputFormat::Plain => Ok(record_detail(record)),
    }
}

/// Render dashboard figures.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn stats(stats: &DashboardStats, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(stats);
    }
    let mut out = String::new();
    let _ = writeln!(out, "Total documents:   {}", stats.total);
    let _ = writeln!(out, "Pending approval:  {}", stats.pending);
    let _ = writeln!(out, "This month:        {}", stats.monthly);
    let _ = writeln!(out);
    let _ = writeln!(out, "Recent documents");
    if stats.recent.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for r in &stats.recent {
        let _ = writeln!(out, "  {}", record_line(r));
    }
    Ok(out)
}

/// Render the registry listing.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn types(types: &[DocumentTypeDescriptor], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(types);
    }
    Ok(types
        .iter()
        .map(|t| format!("{:<14} {}\n", t.key, t.name))
        .collect())
}

/// Render one registry entry with its fields.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn type_detail(descriptor: &DocumentTypeDescriptor, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(descriptor);
    }
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", descriptor.name, descriptor.key);
    for field in descriptor.fields {
        let required = if field.required { " *" } else { "" };
        let _ = write!(out, "  {:<16} {:<9} {}{}", field.name, field.kind.to_string(), field.label, required);
        if !field.options.is_empty() {
            let _ = write!(out, " [{}]", field.options.join(", "));
        }
        let _ = writeln!(out);
    }
    Ok(out)
}
