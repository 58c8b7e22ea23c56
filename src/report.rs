//! Per-record, per-project and grand-total durations.
//!
//! Open intervals are listed as ongoing but never counted in any sum.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::error::Result;
use crate::store::RecordStore;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportRow {
    Record {
        project: String,
        task: String,
        start: DateTime<FixedOffset>,
        end: Option<DateTime<FixedOffset>>,
        /// `None` while the interval is still running.
        seconds: Option<i64>,
    },
    Subtotal {
        project: String,
        seconds: i64,
    },
    Total {
        seconds: i64,
    },
}

#[derive(Debug)]
pub struct Report {
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn total_seconds(&self) -> i64 {
        self.rows
            .iter()
            .find_map(|row| match row {
                ReportRow::Total { seconds } => Some(*seconds),
                _ => None,
            })
            .unwrap_or(0)
    }
}

/// Builds the report for `projects` in the order given; an empty slice means every project.
/// A project named more than once is reported once, at its first position.
pub fn build_report(store: &RecordStore, projects: &[String]) -> Result<Report> {
    let projects = if projects.is_empty() {
        store.list_projects()?
    } else {
        let mut seen = HashSet::new();
        projects
            .iter()
            .filter(|p| seen.insert(*p))
            .cloned()
            .collect()
    };
    let mut rows = Vec::new();
    let mut total = 0i64;
    for project in &projects {
        let mut subtotal = 0i64;
        for record in store.load(project)? {
            let seconds = record.seconds();
            subtotal += seconds.unwrap_or(0);
            rows.push(ReportRow::Record {
                project: project.clone(),
                task: record.task,
                start: record.start,
                end: record.end,
                seconds,
            });
        }
        rows.push(ReportRow::Subtotal {
            project: project.clone(),
            seconds: subtotal,
        });
        total += subtotal;
    }
    rows.push(ReportRow::Total { seconds: total });
    Ok(Report { rows })
}

/// `{d}d {h}h:{m}m` when there is at least a day, else `{h}h:{m}m`. Truncates leftover seconds.
pub fn format_duration(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let seconds = seconds.unsigned_abs();
    let days = seconds / 86_400;
    let hours = seconds % 86_400 / 3600;
    let minutes = seconds % 3600 / 60;
    if days > 0 {
        format!("{}{}d {}h:{}m", sign, days, hours, minutes)
    } else {
        format!("{}{}h:{}m", sign, hours, minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackError;

    fn ts(raw: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(raw).unwrap()
    }

    fn store() -> (tempfile::TempDir, RecordStore) {
        let dir = tempfile::tempdir().unwrap();
        let records = dir.path().join("records");
        fs_err::create_dir_all(&records).unwrap();
        (dir, RecordStore::new(records))
    }

    fn closed(store: &RecordStore, project: &str, task: &str, start: &str, end: &str) {
        store.append_open(project, task, ts(start)).unwrap();
        let end = ts(end);
        store
            .mutate_last(project, |mut r| {
                r.end = Some(end);
                Some(r)
            })
            .unwrap();
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0h:0m");
        assert_eq!(format_duration(59), "0h:0m");
        assert_eq!(format_duration(60), "0h:1m");
        assert_eq!(format_duration(98 * 60), "1h:38m");
        assert_eq!(format_duration(99 * 60 + 59), "1h:39m");
        assert_eq!(format_duration(25 * 3600), "1d 1h:0m");
        assert_eq!(format_duration(2 * 86_400 + 3 * 3600 + 4 * 60), "2d 3h:4m");
        assert_eq!(format_duration(-90 * 60), "-1h:30m");
    }

    #[test]
    fn test_report_subtotals_and_total() {
        let (_dir, store) = store();
        closed(&store, "site", "design", "2024-01-01T10:00:00Z", "2024-01-01T11:38:00Z");
        closed(&store, "site", "", "2024-01-02T10:00:00Z", "2024-01-02T10:01:00Z");
        closed(&store, "blog", "", "2024-01-03T00:00:00Z", "2024-01-04T01:00:00Z");
        store.append_open("blog", "draft", ts("2024-01-05T09:00:00Z")).unwrap();

        let report = build_report(&store, &[]).unwrap();
        let subtotals: Vec<_> = report
            .rows
            .iter()
            .filter_map(|row| match row {
                ReportRow::Subtotal { project, seconds } => Some((project.as_str(), *seconds)),
                _ => None,
            })
            .collect();
        assert_eq!(subtotals, vec![("blog", 25 * 3600), ("site", 99 * 60)]);
        assert_eq!(format_duration(subtotals[1].1), "1h:39m");
        assert_eq!(report.total_seconds(), 25 * 3600 + 99 * 60);
        assert_eq!(report.rows.len(), 4 + 2 + 1);
        assert!(matches!(report.rows.last(), Some(ReportRow::Total { .. })));
        assert!(report.rows.iter().any(|row| matches!(
            row,
            ReportRow::Record { task, seconds: None, .. } if task == "draft"
        )));
    }

    #[test]
    fn test_report_keeps_requested_order() {
        let (_dir, store) = store();
        closed(&store, "a", "", "2024-01-01T10:00:00Z", "2024-01-01T11:00:00Z");
        closed(&store, "b", "", "2024-01-01T12:00:00Z", "2024-01-01T12:30:00Z");
        let report = build_report(&store, &["b".to_string(), "a".to_string()]).unwrap();
        let order: Vec<_> = report
            .rows
            .iter()
            .filter_map(|row| match row {
                ReportRow::Record { project, .. } => Some(project.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(order, vec!["b", "a"]);
        assert_eq!(report.total_seconds(), 5400);
    }

    #[test]
    fn test_report_repeated_project_counted_once() {
        let (_dir, store) = store();
        closed(&store, "a", "", "2024-01-01T10:00:00Z", "2024-01-01T11:00:00Z");
        closed(&store, "b", "", "2024-01-01T12:00:00Z", "2024-01-01T12:30:00Z");
        let names: Vec<String> = ["b", "a", "b", "a"].iter().map(|s| s.to_string()).collect();
        let report = build_report(&store, &names).unwrap();
        let subtotals: Vec<_> = report
            .rows
            .iter()
            .filter_map(|row| match row {
                ReportRow::Subtotal { project, .. } => Some(project.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(subtotals, vec!["b", "a"]);
        assert_eq!(report.rows.len(), 2 + 2 + 1);
        assert_eq!(report.total_seconds(), 5400);
    }

    #[test]
    fn test_report_unknown_project() {
        let (_dir, store) = store();
        let err = build_report(&store, &["ghost".to_string()]).unwrap_err();
        assert!(matches!(err, TrackError::NotFound(p) if p == "ghost"));
    }

    #[test]
    fn test_report_empty_store() {
        let (_dir, store) = store();
        let report = build_report(&store, &[]).unwrap();
        assert_eq!(report.rows, vec![ReportRow::Total { seconds: 0 }]);
    }
}
