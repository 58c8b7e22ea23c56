//! The session pointer: which key, if any, is being tracked right now.
//!
//! Stored as `current.json`, `{"key": "task@project", "generation": 7}`. An empty key means
//! idle. The generation goes up on every write, and a write only succeeds if the generation on
//! disk is still the one the command read, so two overlapping commands cannot silently
//! overwrite each other.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackError};
use crate::key::Key;
use crate::storage::atomic_write;

#[derive(Debug, Default, Serialize, Deserialize)]
struct PointerFile {
    #[serde(default)]
    key: String,
    #[serde(default)]
    generation: u64,
}

/// A snapshot of the pointer as read at the start of a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub key: Option<Key>,
    pub generation: u64,
}

#[derive(Clone, Debug)]
pub struct SessionPointer {
    path: PathBuf,
}

impl SessionPointer {
    pub fn new(path: PathBuf) -> SessionPointer {
        SessionPointer { path }
    }

    pub(crate) fn init_if_missing(&self) -> Result<()> {
        if self.path.is_file() {
            return Ok(());
        }
        tracing::debug!(path = %self.path.display(), "initializing session pointer");
        write_pointer(&self.path, &PointerFile::default())
    }

    fn read(&self) -> Result<PointerFile> {
        if !self.path.is_file() {
            return Ok(PointerFile::default());
        }
        let content = fs_err::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(PointerFile::default());
        }
        serde_json::from_str(&content).map_err(|source| TrackError::CorruptStore {
            path: self.path.clone(),
            source,
        })
    }

    /// A key that no longer parses (a hand edit) reads as idle, like a stale pointer; the next
    /// `start` overwrites it.
    pub fn get(&self) -> Result<Session> {
        let file = self.read()?;
        let key = if file.key.trim().is_empty() {
            None
        } else {
            match Key::parse(&file.key) {
                Ok(key) => Some(key),
                Err(e) => {
                    tracing::warn!(key = %file.key, error = %e, "ignoring unparsable session pointer");
                    None
                }
            }
        };
        Ok(Session {
            key,
            generation: file.generation,
        })
    }

    /// Points the session at `key` (or clears it with `None`), provided nobody else has written
    /// the pointer since `seen` was read.
    pub fn set(&self, seen: &Session, key: Option<&Key>) -> Result<Session> {
        let on_disk = self.read()?;
        if on_disk.generation != seen.generation {
            tracing::warn!(
                expected = seen.generation,
                found = on_disk.generation,
                "session pointer changed underneath us"
            );
            return Err(TrackError::ConcurrentModification);
        }
        let next = PointerFile {
            key: key.map(Key::to_string).unwrap_or_default(),
            generation: seen.generation + 1,
        };
        write_pointer(&self.path, &next)?;
        tracing::debug!(key = %next.key, generation = next.generation, "session pointer updated");
        Ok(Session {
            key: key.cloned(),
            generation: next.generation,
        })
    }
}

fn write_pointer(path: &std::path::Path, file: &PointerFile) -> Result<()> {
    let json = serde_json::to_string(file).map_err(std::io::Error::other)?;
    atomic_write(path, &(json + "\n"))
}
