//! The tracking state machine.
//!
//! Idle: the session pointer is empty. Tracking(key): the pointer names `key` and the key's
//! project log ends with an open interval. Only one session exists at a time, across all
//! projects.
//!
//! The pointer is never trusted on its own: every operation re-reads the project log to confirm
//! the open interval is really there. Writes are ordered so that an interrupted command leaves at
//! worst a pointer without an open interval, which the next command detects and clears.

use chrono::{DateTime, Duration, FixedOffset};

use crate::error::{Result, TrackError};
use crate::key::{check_project, Key};
use crate::session::{Session, SessionPointer};
use crate::storage::Storage;
use crate::store::{Interval, RecordStore};

#[derive(Debug, PartialEq, Eq)]
pub enum StartOutcome {
    Started(Interval),
    AlreadyTracking(Key),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Status {
    Idle,
    Tracking {
        key: Key,
        start: DateTime<FixedOffset>,
        elapsed: Duration,
    },
}

/// An interval together with the key it is tracked under.
#[derive(Debug, PartialEq, Eq)]
pub struct Tracked {
    pub key: Key,
    pub interval: Interval,
}

pub struct Tracker {
    records: RecordStore,
    pointer: SessionPointer,
}

impl Tracker {
    pub fn new(storage: &Storage) -> Tracker {
        Tracker {
            records: storage.records(),
            pointer: storage.pointer(),
        }
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    /// The open interval at the end of `key`'s project, if there is one.
    fn open_interval(&self, key: &Key) -> Result<Option<Interval>> {
        match self.records.load(&key.project) {
            Ok(records) => Ok(records.last().filter(|r| r.is_open()).cloned()),
            Err(TrackError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// The session and its open interval; clears a pointer that has no open interval behind it.
    fn require_tracking(&self) -> Result<(Session, Key, Interval)> {
        let session = self.pointer.get()?;
        let key = session.key.clone().ok_or(TrackError::NotTracking)?;
        match self.open_interval(&key)? {
            Some(interval) => Ok((session, key, interval)),
            None => {
                tracing::warn!(key = %key, "session pointer has no open interval; clearing it");
                self.pointer.set(&session, None)?;
                Err(TrackError::StalePointer(key))
            }
        }
    }

    pub fn start(&self, key: &Key, now: DateTime<FixedOffset>) -> Result<StartOutcome> {
        let session = self.pointer.get()?;
        if let Some(active) = &session.key {
            if self.open_interval(active)?.is_some() {
                if active == key {
                    tracing::debug!(key = %key, "start: already tracking");
                    return Ok(StartOutcome::AlreadyTracking(key.clone()));
                }
                return Err(TrackError::Conflict {
                    active: active.clone(),
                });
            }
            tracing::warn!(key = %active, "ignoring stale session pointer");
        }
        if self.open_interval(key)?.is_some() {
            return Err(TrackError::DanglingInterval(key.project.clone()));
        }
        self.pointer.set(&session, Some(key))?;
        let interval = self
            .records
            .append_open(&key.project, key.task_or_empty(), now)?;
        tracing::debug!(key = %key, "start: tracking");
        Ok(StartOutcome::Started(interval))
    }

    pub fn stop(&self, now: DateTime<FixedOffset>) -> Result<Tracked> {
        let (session, key, _) = self.require_tracking()?;
        let previous = self.records.mutate_last(&key.project, |mut last| {
            last.end = Some(now);
            Some(last)
        })?;
        self.pointer.set(&session, None)?;
        tracing::debug!(key = %key, "stop: idle");
        Ok(Tracked {
            key,
            interval: Interval {
                end: Some(now),
                ..previous
            },
        })
    }

    /// Moves the running interval's start to `now`, dropping the time tracked so far.
    pub fn reset(&self, now: DateTime<FixedOffset>) -> Result<Tracked> {
        let (_, key, _) = self.require_tracking()?;
        let previous = self.records.mutate_last(&key.project, |mut last| {
            last.start = now;
            Some(last)
        })?;
        tracing::debug!(key = %key, "reset: clock restarted");
        Ok(Tracked {
            key,
            interval: Interval {
                start: now,
                ..previous
            },
        })
    }

    /// Throws away the running interval as if it had never been started.
    pub fn cancel(&self) -> Result<Tracked> {
        let (session, key, _) = self.require_tracking()?;
        let dropped = self.records.mutate_last(&key.project, |_| None)?;
        self.pointer.set(&session, None)?;
        tracing::debug!(key = %key, "cancel: idle");
        Ok(Tracked {
            key,
            interval: dropped,
        })
    }

    /// Read-only; a stale pointer reads as idle.
    pub fn status(&self, now: DateTime<FixedOffset>) -> Result<Status> {
        let session = self.pointer.get()?;
        let Some(key) = session.key else {
            return Ok(Status::Idle);
        };
        match self.open_interval(&key)? {
            Some(interval) => Ok(Status::Tracking {
                key,
                start: interval.start,
                elapsed: now - interval.start,
            }),
            None => {
                tracing::warn!(key = %key, "session pointer has no open interval");
                Ok(Status::Idle)
            }
        }
    }

    /// Removes a project and all of its history. The project being tracked cannot be deleted.
    pub fn delete(&self, project: &str) -> Result<()> {
        check_project(project)?;
        let session = self.pointer.get()?;
        if let Some(active) = session.key {
            if active.project == project && self.open_interval(&active)?.is_some() {
                return Err(TrackError::Conflict { active });
            }
        }
        self.records.delete(project)
    }
}
