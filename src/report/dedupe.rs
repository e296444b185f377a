// Repeated submissions from the same email address.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;

use crate::report::io_common::RawRecord;
use crate::report::*;

const TIMESTAMP_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Keeps the latest submission of every email address.
///
/// Unreadable timestamps are older than any other. On equal timestamps the
/// first submission is kept. Records without an email are all kept, and the
/// records keep their order.
pub fn deduplicate_by_email(
    records: Vec<RawRecord>,
    email_idx: usize,
    timestamp_idx: usize,
) -> Vec<RawRecord> {
    // email -> (position, timestamp) of the submission to keep
    let mut latest: BTreeMap<String, (usize, Option<NaiveDateTime>)> = BTreeMap::new();
    for (pos, record) in records.iter().enumerate() {
        let email = match record.cells.get(email_idx) {
            Some(e) if !e.trim().is_empty() => e.trim().to_lowercase(),
            _ => continue,
        };
        let ts = record
            .cells
            .get(timestamp_idx)
            .and_then(|s| parse_timestamp(s));
        if ts.is_none() {
            debug!(
                "deduplicate_by_email: row {}: unreadable timestamp {:?}",
                record.lineno,
                record.cells.get(timestamp_idx)
            );
        }
        let newer = match latest.get(&email) {
            Some((_, previous)) => ts > *previous,
            None => true,
        };
        if newer {
            latest.insert(email, (pos, ts));
        }
    }

    let kept: BTreeSet<usize> = latest.values().map(|(pos, _)| *pos).collect();
    let total = records.len();
    let res: Vec<RawRecord> = records
        .into_iter()
        .enumerate()
        .filter(|(pos, record)| {
            let has_email = record
                .cells
                .get(email_idx)
                .map(|e| !e.trim().is_empty())
                .unwrap_or(false);
            !has_email || kept.contains(pos)
        })
        .map(|(_, record)| record)
        .collect();
    info!(
        "Removed {} duplicate submissions, {} rows kept",
        total - res.len(),
        res.len()
    );
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(lineno: usize, ts: &str, email: &str) -> RawRecord {
        RawRecord {
            lineno,
            cells: vec![ts.to_string(), email.to_string()],
        }
    }

    fn linenos(records: &[RawRecord]) -> Vec<usize> {
        records.iter().map(|r| r.lineno).collect()
    }

    #[test]
    fn timestamps() {
        assert!(parse_timestamp("3/1/2024 10:00:00").is_some());
        assert!(parse_timestamp("03/01/2024 10:00").is_some());
        assert!(parse_timestamp(" 2024-03-01 10:00:00 ").is_some());
        assert!(parse_timestamp("2024-03-01 10:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("3/2/2024 09:00:00") > parse_timestamp("3/1/2024 23:00:00"));
    }

    #[test]
    fn latest_submission_wins() {
        let records = vec![
            rec(1, "3/1/2024 10:00:00", "amina@example.com"),
            rec(2, "3/2/2024 10:00:00", "kofi@example.com"),
            rec(3, "3/3/2024 10:00:00", " AMINA@example.com"),
            rec(4, "3/4/2024 10:00:00", ""),
            rec(5, "3/5/2024 10:00:00", ""),
        ];
        assert_eq!(linenos(&deduplicate_by_email(records, 1, 0)), vec![2, 3, 4, 5]);
    }

    #[test]
    fn ties_and_unreadable_timestamps() {
        let records = vec![
            rec(1, "3/1/2024 10:00:00", "a@x.org"),
            rec(2, "3/1/2024 10:00:00", "a@x.org"),
            rec(3, "not a date", "b@x.org"),
            rec(4, "3/1/2024 10:00:00", "b@x.org"),
            rec(5, "garbage", "b@x.org"),
        ];
        assert_eq!(linenos(&deduplicate_by_email(records, 1, 0)), vec![1, 4]);
    }
}
