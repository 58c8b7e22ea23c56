//! On-disk layout under the storage root:
//!
//! - `records/<project>.json`: the project's intervals, oldest first
//! - `current.json`: the session pointer
//!
//! Every file is replaced whole through [`atomic_write`]; readers never see a half-written file.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::Result;
use crate::session::SessionPointer;
use crate::store::RecordStore;

const RECORDS_DIR: &str = "records";
const CURRENT_FILE: &str = "current.json";

/// Root of a `tt` data directory.
#[derive(Clone, Debug)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Opens the storage root, creating it (with an empty session pointer) on first run.
    pub fn init(root: impl Into<PathBuf>) -> Result<Storage> {
        let storage = Storage { root: root.into() };
        let records = storage.root.join(RECORDS_DIR);
        if !records.is_dir() {
            tracing::debug!(path = %records.display(), "creating records directory");
            fs_err::create_dir_all(&records)?;
        }
        storage.pointer().init_if_missing()?;
        Ok(storage)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn records(&self) -> RecordStore {
        RecordStore::new(self.root.join(RECORDS_DIR))
    }

    pub fn pointer(&self) -> SessionPointer {
        SessionPointer::new(self.root.join(CURRENT_FILE))
    }
}

/// Writes `contents` to a temp file next to `path`, then renames it over `path`.
pub fn atomic_write(path: &Path, contents: &str) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("tt");
        let storage = Storage::init(&root).unwrap();
        assert!(root.join("records").is_dir());
        assert!(root.join("current.json").is_file());
        assert_eq!(storage.root(), root.as_path());
        let session = storage.pointer().get().unwrap();
        assert!(session.key.is_none());
    }

    #[test]
    fn test_init_keeps_existing_pointer() {
        let dir = tempfile::tempdir().unwrap();
        fs_err::create_dir_all(dir.path().join("records")).unwrap();
        fs_err::write(dir.path().join("current.json"), r#"{"key": "dev@site"}"#).unwrap();
        let storage = Storage::init(dir.path()).unwrap();
        let session = storage.pointer().get().unwrap();
        assert_eq!(session.key.unwrap().to_string(), "dev@site");
    }

    #[test]
    fn test_atomic_write_replaces_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        atomic_write(&path, "[1]").unwrap();
        atomic_write(&path, "[2]").unwrap();
        assert_eq!(fs_err::read_to_string(&path).unwrap(), "[2]");
        let names: Vec<_> = fs_err::read_dir(dir.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }
}
