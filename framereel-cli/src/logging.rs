// ============================================================================
// framereel-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: env_logger by default, log4rs when --log-dir is given
//
// Terminal output goes through the `log` macros, so the console format is the
// bare message for info lines. Warnings and errors carry a level tag.
//
// USAGE:
// - RUST_LOG=info (default): Normal operation logs
// - RUST_LOG=debug or --verbose: ffmpeg command lines and state transitions

use anyhow::{Context, Result};
use log::{Level, LevelFilter};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Path of the log file for a run started now.
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("framereel_{}.log", get_timestamp()))
}

/// Initialises logging. Returns the log file path when file logging is on.
pub fn init_logging(verbose: bool, log_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    if let Some(dir) = log_dir {
        let path = log_file_path(dir);
        framereel_core::file_logging::setup_file_logging(&path, level)
            .with_context(|| format!("Failed to set up log file {}", path.display()))?;
        return Ok(Some(path));
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level.to_string().to_lowercase()),
    )
    .format(|buf, record| match record.level() {
        Level::Info => writeln!(buf, "{}", record.args()),
        level => writeln!(buf, "[{level}] {}", record.args()),
    })
    .try_init()
    .context("Failed to initialise logger")?;

    Ok(None)
}
