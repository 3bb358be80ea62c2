//! Logging configuration using tracing

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Environment variable controlling the log filter
pub const LOG_ENV_VAR: &str = "VISTA_LOG";

const DEFAULT_FILTER: &str = "vista_grande=info,vista_loader=info,warn";

/// Initialize the logging subsystem
///
/// Logs are written to `~/.local/share/vista-grande/logs/` so stdout stays
/// free for NDJSON output. Log level is controlled by `VISTA_LOG`.
///
/// # Examples
/// ```bash
/// VISTA_LOG=debug cargo run
/// VISTA_LOG=vista_loader=trace cargo run
/// ```
pub fn init() -> Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "vista.log");

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("Vista Grande loader starting");
    tracing::info!("Log directory: {}", log_dir.display());
    tracing::info!("═══════════════════════════════════════════════════════");

    Ok(())
}

/// Filter from `VISTA_LOG`, falling back to info for our crates
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Get the log directory path
fn get_log_directory() -> Result<PathBuf> {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join("vista-grande").join("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_log_directory_location() {
        let dir = get_log_directory().unwrap();
        assert!(dir.ends_with("vista-grande/logs"));
    }

    #[test]
    #[serial]
    fn test_env_filter_uses_override() {
        std::env::set_var(LOG_ENV_VAR, "vista_loader=trace");
        let filter = env_filter();
        std::env::remove_var(LOG_ENV_VAR);
        assert_eq!(filter.to_string(), "vista_loader=trace");
    }

    #[test]
    #[serial]
    fn test_env_filter_default() {
        std::env::remove_var(LOG_ENV_VAR);
        let filter = env_filter();
        assert!(filter.to_string().contains("vista_loader=info"));
    }
}
