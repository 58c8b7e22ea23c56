//! `task@project` / `project` keys.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TrackError};

/// What the user is tracking: a project, optionally narrowed to a task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Key {
    pub project: String,
    pub task: Option<String>,
}

impl Key {
    /// Parses `task@project` or `project`. The task is everything before the last `@`,
    /// so tasks may themselves contain `@`. An empty task is treated as no task.
    pub fn parse(raw: &str) -> Result<Key> {
        let raw = raw.trim();
        let (task, project) = match raw.rsplit_once('@') {
            Some((task, project)) => (task.trim(), project.trim()),
            None => ("", raw),
        };
        validate_project(project).map_err(|reason| TrackError::invalid_key(raw, reason))?;
        Ok(Key {
            project: project.to_string(),
            task: if task.is_empty() {
                None
            } else {
                Some(task.to_string())
            },
        })
    }

    pub fn task_or_empty(&self) -> &str {
        self.task.as_deref().unwrap_or("")
    }
}

impl FromStr for Key {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Key> {
        Key::parse(s)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.task {
            Some(task) => write!(f, "{}@{}", task, self.project),
            None => write!(f, "{}", self.project),
        }
    }
}

/// Project names double as file names under `records/`.
fn validate_project(project: &str) -> std::result::Result<(), &'static str> {
    if project.is_empty() {
        return Err("project must not be empty");
    }
    if project.contains('/') || project.contains('\\') {
        return Err("project must not contain path separators");
    }
    if project.starts_with('.') {
        return Err("project must not start with '.'");
    }
    Ok(())
}

/// Checks a bare project name (as given to `report`, `delete`, `edit`).
pub fn check_project(project: &str) -> Result<()> {
    validate_project(project).map_err(|reason| TrackError::invalid_key(project, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_project_only() {
        let key = Key::parse("website").unwrap();
        assert_eq!(key.project, "website");
        assert_eq!(key.task, None);
        assert_eq!(key.to_string(), "website");
    }

    #[test]
    fn test_parse_task_and_project() {
        let key = Key::parse("design@website").unwrap();
        assert_eq!(key.project, "website");
        assert_eq!(key.task.as_deref(), Some("design"));
        assert_eq!(key.to_string(), "design@website");
    }

    #[test]
    fn test_parse_task_containing_at() {
        let key = Key::parse("mail a@b@inbox").unwrap();
        assert_eq!(key.project, "inbox");
        assert_eq!(key.task.as_deref(), Some("mail a@b"));
    }

    #[test]
    fn test_parse_empty_task_is_none() {
        let key = Key::parse("@website").unwrap();
        assert_eq!(key, Key::parse("website").unwrap());
    }

    #[test]
    fn test_parse_empty_project_rejected() {
        assert!(matches!(Key::parse(""), Err(TrackError::InvalidKey { .. })));
        assert!(matches!(Key::parse("design@"), Err(TrackError::InvalidKey { .. })));
        assert!(matches!(Key::parse("  "), Err(TrackError::InvalidKey { .. })));
    }

    #[test]
    fn test_parse_unsafe_project_rejected() {
        assert!(Key::parse("x@../etc").is_err());
        assert!(Key::parse("a/b").is_err());
        assert!(Key::parse(".hidden").is_err());
        assert!(check_project("ok-name").is_ok());
        assert!(check_project("").is_err());
    }
}
