use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Where logs go: stderr for one-shot commands, a file while the TUI owns the terminal
pub enum LogTarget {
    Stderr,
    File,
}

/// Initialize the tracing subscriber with env-based filtering.
///
/// Reads `RUST_LOG`, then `SUPPORTDESK_LOG`, falling back to `default_level`.
pub fn init_tracing(default_level: &str, target: LogTarget) -> Result<()> {
    let filter = EnvFilter::try_from_env("RUST_LOG")
        .or_else(|_| EnvFilter::try_from_env("SUPPORTDESK_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    match target {
        LogTarget::Stderr => {
            fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        LogTarget::File => {
            let path = log_file_path()?;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
    }
    Ok(())
}

pub fn log_file_path() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .ok_or_else(|| anyhow!("Could not determine cache directory"))?;

    Ok(cache_dir.join("supportdesk").join("supportdesk.log"))
}
