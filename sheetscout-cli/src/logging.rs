use anyhow::{anyhow, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const FALLBACK_LEVEL: &str = "warn";
const LOG_FILE: &str = "sheetscout.log";

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard error, for headless runs
    Stderr,
    /// A file in the temp directory, so the terminal UI stays clean
    File,
}

/// Location of the log file used by the terminal UI
pub fn log_file_path() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE)
}

/// Picks the filter: `--log-level` first, then `RUST_LOG`, then the saved
/// setting. Unparseable levels fall back to `warn`.
pub fn build_filter(cli_level: Option<&str>, settings_level: &str) -> EnvFilter {
    let filter = match cli_level {
        Some(level) => EnvFilter::try_new(level),
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(settings_level)),
    };
    filter.unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}

pub fn init_logging(filter: EnvFilter, target: LogTarget) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match target {
        LogTarget::Stderr => builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow!(e)),
        LogTarget::File => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file_path())?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow!(e))
        }
    }
}
