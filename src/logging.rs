//! Diagnostic logging to stderr.
//!
//! Quiet by default. `TT_DEBUG=1` turns on debug output; otherwise `RUST_LOG` applies.

use std::env;

use tracing_subscriber::EnvFilter;

pub fn init() {
    let debug_enabled = env::var("TT_DEBUG")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
