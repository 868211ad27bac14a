//! Dashboard counts derived from the current collection.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::document::{DocumentRecord, Status};

/// How many records the dashboard lists as recent activity.
pub const RECENT_LIMIT: usize = 5;

/// Aggregate dashboard figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    /// Number of records in the store.
    #[serde(rename = "totalDocuments")]
    pub total: usize,
    /// Records whose status is pending.
    #[serde(rename = "pendingDocuments")]
    pub pending: usize,
    /// Records dated in the current calendar month of any year.
    #[serde(rename = "monthlyDocuments")]
    pub monthly: usize,
    /// Most recently created records, newest first.
    #[serde(rename = "recentDocuments")]
    pub recent: Vec<DocumentRecord>,
}

/// The month (1-12) of a stored date string.
///
/// Accepts `YYYY-MM-DD`, optionally followed by a time part.
fn month_of(date: &str) -> Option<u32> {
    let day = date.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .ok()
        .map(|d| d.month())
}

/// Compute dashboard figures for `records` as of `today`.
///
/// `monthly` compares the month number only, so a record dated in March of
/// any year counts during March.
#[must_use]
pub fn stats(records: &[DocumentRecord], today: NaiveDate) -> DashboardStats {
    let current_month = today.month();

    let pending = records
        .iter()
        .filter(|d| d.status == Status::Pending)
        .count();
    let monthly = records
        .iter()
        .filter(|d| month_of(&d.date) == Some(current_month))
        .count();

    let mut recent: Vec<&DocumentRecord> = records.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    DashboardStats {
        total: records.len(),
        pending,
        monthly,
        recent: recent.into_iter().take(RECENT_LIMIT).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::BTreeMap;

    fn record(id: &str, date: &str, status: Status, age_minutes: i64) -> DocumentRecord {
        let created = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap() - Duration::minutes(age_minutes);
        DocumentRecord {
            id: id.to_string(),
            doc_id: format!("JOBCARD2406{id:0>3}"),
            doc_type: "job-card".to_string(),
            date: date.to_string(),
            person_name: "Ops".to_string(),
            authorized_by: "Lead".to_string(),
            status,
            created_at: created,
            updated_at: created,
            fields: BTreeMap::new(),
        }
    }

    fn june() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 12).unwrap()
    }

    #[test]
    fn test_empty_collection() {
        let s = stats(&[], june());
        assert_eq!(s.total, 0);
        assert_eq!(s.pending, 0);
        assert_eq!(s.monthly, 0);
        assert!(s.recent.is_empty());
    }

    #[test]
    fn test_total_and_pending() {
        let records = vec![
            record("1", "2024-06-01", Status::Pending, 3),
            record("2", "2024-05-01", Status::Approved, 2),
            record("3", "2024-04-01", Status::Pending, 1),
        ];
        let s = stats(&records, june());
        assert_eq!(s.total, 3);
        assert_eq!(s.pending, 2);
    }

    #[test]
    fn test_monthly_ignores_year() {
        let records = vec![
            record("1", "2024-06-01", Status::Approved, 0),
            record("2", "2019-06-30", Status::Approved, 0),
            record("3", "2024-07-01", Status::Approved, 0),
            record("4", "not a date", Status::Approved, 0),
            record("5", "2024-06-05T10:00:00Z", Status::Approved, 0),
        ];
        assert_eq!(stats(&records, june()).monthly, 3);
    }

    #[test]
    fn test_recent_newest_first_and_capped() {
        let records: Vec<_> = (0..8)
            .map(|i| record(&i.to_string(), "2024-06-01", Status::Pending, 10 - i))
            .collect();
        let s = stats(&records, june());
        let ids: Vec<_> = s.recent.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["7", "6", "5", "4", "3"]);
    }

    #[test]
    fn test_recent_ties_keep_store_order() {
        let records = vec![
            record("a", "2024-06-01", Status::Pending, 5),
            record("b", "2024-06-01", Status::Pending, 5),
            record("c", "2024-06-01", Status::Pending, 1),
        ];
        let ids: Vec<_> = stats(&records, june())
            .recent
            .iter()
            .map(|d| d.id.clone())
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_stats_do_not_reorder_input() {
        let records = vec![
            record("old", "2024-06-01", Status::Pending, 9),
            record("new", "2024-06-01", Status::Pending, 1),
        ];
        let _ = stats(&records, june());
        assert_eq!(records[0].id, "old");
    }

    #[test]
    fn test_json_names() {
        let json = serde_json::to_value(stats(&[], june())).unwrap();
        assert!(json.get("totalDocuments").is_some());
        assert!(json.get("pendingDocuments").is_some());
        assert!(json.get("monthlyDocuments").is_some());
        assert!(json["recentDocuments"].is_array());
    }
}
