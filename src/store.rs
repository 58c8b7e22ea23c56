//! Per-project interval logs.
//!
//! Logically append-only: intervals are only ever added at the end, and only the last one is
//! changed afterwards. Physically each operation reads the whole file and writes it back, so a
//! write also normalizes every earlier timestamp to RFC 3339 with an explicit offset: a
//! hand-edited `2024-01-01T10:00:00` or `...Z` comes back as `...+HH:MM`. The instant is kept.
//!
//! A log holds at most one open interval, and only as its last entry. Anything else is rejected
//! as corrupt when the file is read.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, SecondsFormat};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, TrackError};
use crate::key::check_project;
use crate::storage::atomic_write;

/// One tracked stretch of time. `end == None` means it is still running.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    #[serde(with = "timestamp")]
    pub start: DateTime<FixedOffset>,
    #[serde(with = "optional_timestamp", default)]
    pub end: Option<DateTime<FixedOffset>>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        serialize_with = "empty_as_null"
    )]
    pub task: String,
}

impl Interval {
    pub fn open(start: DateTime<FixedOffset>, task: &str) -> Interval {
        Interval {
            start,
            end: None,
            task: task.to_string(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Seconds between start and end; `None` while open.
    pub fn seconds(&self) -> Option<i64> {
        self.end.map(|end| (end - self.start).num_seconds())
    }
}

/// Parses an RFC 3339 timestamp, or a naive `YYYY-MM-DDTHH:MM:SS` one taken as local time.
pub fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<FixedOffset>, String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return naive
                .and_local_timezone(Local)
                .earliest()
                .map(|dt| dt.fixed_offset())
                .ok_or_else(|| format!("{} does not exist in the local time zone", raw));
        }
    }
    Err(format!("invalid timestamp: {}", raw))
}

pub fn format_timestamp(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

mod timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(dt: &DateTime<FixedOffset>, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&format_timestamp(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<DateTime<FixedOffset>, D::Error> {
        let raw = String::deserialize(d)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

mod optional_timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(
        dt: &Option<DateTime<FixedOffset>>,
        s: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        match dt {
            Some(dt) => s.serialize_some(&format_timestamp(dt)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> std::result::Result<Option<DateTime<FixedOffset>>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) => parse_timestamp(&raw).map(Some).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

fn empty_as_null<S: Serializer>(task: &str, s: S) -> std::result::Result<S::Ok, S::Error> {
    if task.is_empty() {
        s.serialize_none()
    } else {
        s.serialize_some(task)
    }
}

/// Parses the contents of a record file. Blank content is an empty log.
pub fn parse_records(path: &Path, content: &str) -> Result<Vec<Interval>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let corrupt = |source: serde_json::Error| TrackError::CorruptStore {
        path: path.to_path_buf(),
        source,
    };
    let records: Vec<Interval> = serde_json::from_str(content).map_err(corrupt)?;
    let last = records.len().saturating_sub(1);
    if let Some(pos) = records.iter().position(Interval::is_open).filter(|&pos| pos < last) {
        return Err(corrupt(serde::de::Error::custom(format!(
            "interval {} is open but is not the last one",
            pos + 1
        ))));
    }
    Ok(records)
}

/// The `records/` directory: one JSON file per project.
#[derive(Clone, Debug)]
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    pub fn new(dir: PathBuf) -> RecordStore {
        RecordStore { dir }
    }

    /// Path of a project's record file, whether or not it exists.
    pub fn path(&self, project: &str) -> PathBuf {
        self.dir.join(format!("{}.json", project))
    }

    pub fn exists(&self, project: &str) -> bool {
        self.path(project).is_file()
    }

    /// Project names, sorted. Temp files and other non-`.json` entries are ignored.
    pub fn list_projects(&self) -> Result<Vec<String>> {
        let mut projects = Vec::new();
        for entry in fs_err::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !stem.starts_with('.') {
                    projects.push(stem.to_string());
                }
            }
        }
        projects.sort();
        Ok(projects)
    }

    pub fn load(&self, project: &str) -> Result<Vec<Interval>> {
        check_project(project)?;
        let path = self.path(project);
        if !path.is_file() {
            return Err(TrackError::NotFound(project.to_string()));
        }
        let content = fs_err::read_to_string(&path)?;
        parse_records(&path, &content)
    }

    fn save(&self, project: &str, records: &[Interval]) -> Result<()> {
        let json = serde_json::to_string_pretty(records).map_err(std::io::Error::other)?;
        atomic_write(&self.path(project), &(json + "\n"))
    }

    /// Adds an open interval at the end of the project's log, creating the project if needed.
    pub fn append_open(&self, project: &str, task: &str, now: DateTime<FixedOffset>) -> Result<Interval> {
        let mut records = match self.load(project) {
            Ok(records) => records,
            Err(TrackError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e),
        };
        if records.last().is_some_and(Interval::is_open) {
            return Err(TrackError::DanglingInterval(project.to_string()));
        }
        let interval = Interval::open(now, task);
        records.push(interval.clone());
        self.save(project, &records)?;
        tracing::debug!(project, task, records = records.len(), "appended open interval");
        Ok(interval)
    }

    /// Replaces the last interval with `f(last)`, or drops it when `f` returns `None`.
    /// Returns the interval as it was before the change. A log left empty is removed.
    pub fn mutate_last<F>(&self, project: &str, f: F) -> Result<Interval>
    where
        F: FnOnce(Interval) -> Option<Interval>,
    {
        let mut records = self.load(project)?;
        let last = records
            .pop()
            .ok_or_else(|| TrackError::EmptyStore(project.to_string()))?;
        if let Some(replacement) = f(last.clone()) {
            records.push(replacement);
        }
        if records.is_empty() {
            tracing::debug!(project, "last interval removed; removing project");
            fs_err::remove_file(self.path(project))?;
        } else {
            self.save(project, &records)?;
        }
        Ok(last)
    }

    pub fn delete(&self, project: &str) -> Result<()> {
        check_project(project)?;
        let path = self.path(project);
        if !path.is_file() {
            return Err(TrackError::NotFound(project.to_string()));
        }
        fs_err::remove_file(&path)?;
        tracing::debug!(project, "deleted project");
        Ok(())
    }
}
