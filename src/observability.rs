//! Logging setup.
//!
//! Logs go to stderr. stdout carries progress lines and `--dry-run` output.

use tracing_subscriber::filter::EnvFilter;

const DEFAULT_LEVEL: &str = "info";

/// Level forced by `-q` / `-v`, if any.
fn flag_level(quiet: bool, verbose: u8) -> Option<&'static str> {
    match (quiet, verbose) {
        (true, _) => Some("error"),
        (false, 0) => None,
        (false, 1) => Some("debug"),
        (false, _) => Some("trace"),
    }
}

/// Flags win; without them `RUST_LOG` applies, then `info`.
pub fn log_filter(quiet: bool, verbose: u8) -> EnvFilter {
    match flag_level(quiet, verbose) {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL)),
    }
}

pub fn init(filter: EnvFilter) {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
