//! Where data lives and how output looks.

use std::env;
use std::path::PathBuf;

use is_terminal::IsTerminal;

/// Default data directory under `$HOME`.
const DEFAULT_DIR: &str = ".tt";

#[derive(Clone, Debug)]
pub struct Config {
    pub root: PathBuf,
    /// Color on stdout (reports, status lines).
    pub color: bool,
    /// Color on stderr (error messages).
    pub err_color: bool,
}

impl Config {
    /// `dir` comes from `--dir` or `TT_DIR`; without it the data lives in `$HOME/.tt`.
    pub fn resolve(dir: Option<PathBuf>) -> Config {
        let no_color = env::var_os("NO_COLOR").is_some();
        Config {
            root: dir.unwrap_or_else(default_root),
            color: wants_color(no_color, &std::io::stdout()),
            err_color: wants_color(no_color, &std::io::stderr()),
        }
    }
}

/// Each stream is colored only when it is itself a terminal.
fn wants_color(no_color: bool, stream: &impl IsTerminal) -> bool {
    !no_color && stream.is_terminal()
}

/// `$HOME/.tt`, or `./.tt` if `HOME` is unset.
fn default_root() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR)
}
