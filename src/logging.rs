use std::io;
use std::path::{Path, PathBuf};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_FILE: &str = "towertui.log";

pub fn default_log_dir() -> PathBuf {
    crate::api::cache_root().join("logs")
}

/// File-only logging: the terminal belongs to the TUI.
pub fn setup_logging(log_dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .map_err(io::Error::other)?;

    // The writer flushes on a background thread for as long as the guard lives.
    std::mem::forget(guard);

    tracing::info!("log file: {}", log_dir.join(LOG_FILE).display());
    Ok(())
}
