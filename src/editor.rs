//! Hands a file to the user's editor and waits for it to exit.

use std::path::Path;
use std::process::Command;

use crate::error::{Result, TrackError};

const DEFAULT_EDITOR: &str = "vi";

/// `$VISUAL`, then `$EDITOR`, then `vi`. Blank values are skipped.
pub fn editor_command(visual: Option<String>, editor: Option<String>) -> String {
    [visual, editor]
        .into_iter()
        .flatten()
        .find(|cmd| !cmd.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string())
}

/// Runs the user's editor on `path`.
pub fn open_in_editor(path: &Path) -> Result<()> {
    let editor = editor_command(
        std::env::var("VISUAL").ok(),
        std::env::var("EDITOR").ok(),
    );
    open_with(&editor, path)
}

/// The editor command may carry its own arguments (`code --wait`).
fn open_with(editor: &str, path: &Path) -> Result<()> {
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or(DEFAULT_EDITOR);
    tracing::debug!(editor = %editor, path = %path.display(), "launching editor");
    let status = Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .map_err(|e| TrackError::Editor {
            editor: editor.to_string(),
            reason: e.to_string(),
        })?;
    if !status.success() {
        return Err(TrackError::Editor {
            editor: editor.to_string(),
            reason: format!("exited with {}", status),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_command_precedence() {
        assert_eq!(editor_command(Some("nano".into()), Some("emacs".into())), "nano");
        assert_eq!(editor_command(None, Some("emacs".into())), "emacs");
        assert_eq!(editor_command(Some("  ".into()), Some("emacs".into())), "emacs");
        assert_eq!(editor_command(None, None), "vi");
    }

    #[cfg(unix)]
    #[test]
    fn test_open_with_exit_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.json");
        fs_err::write(&path, "[]").unwrap();
        assert!(open_with("true", &path).is_ok());
        assert!(matches!(open_with("false", &path), Err(TrackError::Editor { .. })));
        assert!(matches!(
            open_with("tt-no-such-editor --wait", &path),
            Err(TrackError::Editor { editor, .. }) if editor == "tt-no-such-editor --wait"
        ));
    }
}
