//! Human-facing document code generation.
//!
//! A code is `<PREFIX><YY><MM><SEQ>`: the type key uppercased with
//! separators removed, the two-digit year and month of creation, and a
//! three-digit, 1-based count of records of that type that exist at the
//! moment of generation. The count is a live re-scan, so deleting a record
//! and creating another can reproduce a code that was already handed out.

use chrono::{Datelike, NaiveDate};

use crate::document::DocumentRecord;

/// The code prefix for a type key, e.g. `gate-pass` becomes `GATEPASS`.
#[must_use]
pub fn prefix(type_key: &str) -> String {
    type_key
        .chars()
        .filter(|c| !matches!(c, '-' | '_') && !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Generate the code for a new record of `type_key` created on `today`.
#[must_use]
pub fn generate(type_key: &str, today: NaiveDate, existing: &[DocumentRecord]) -> String {
    let seq = existing.iter().filter(|d| d.doc_type == type_key).count() + 1;
    format!(
        "{}{:02}{:02}{:03}",
        prefix(type_key),
        today.year().rem_euclid(100),
        today.month(),
        seq
    )
}
