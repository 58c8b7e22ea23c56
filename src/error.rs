//! Error type shared by the store, the session pointer, the tracker and the report engine.

use std::path::PathBuf;

use crate::key::Key;

pub type Result<T> = std::result::Result<T, TrackError>;

/// Every failure a `tt` command can end with. All of them are terminal for the invocation.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("invalid key \"{key}\": {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("already tracking {active}; stop or cancel it first")]
    Conflict { active: Key },

    #[error("not tracking anything")]
    NotTracking,

    #[error("project not found: {0}")]
    NotFound(String),

    #[error("corrupt store file {}: {source}", .path.display())]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("project {0} has no records")]
    EmptyStore(String),

    #[error("project {0} already ends with an open interval that no session owns; fix it with `tt edit {0}`")]
    DanglingInterval(String),

    #[error("session pointer named {0} but it has no open interval; pointer cleared")]
    StalePointer(Key),

    #[error("session pointer changed while this command ran; re-run the command")]
    ConcurrentModification,

    #[error("editor {editor} failed: {reason}")]
    Editor { editor: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TrackError {
    pub(crate) fn invalid_key(key: &str, reason: &str) -> Self {
        TrackError::InvalidKey {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}
