use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::data_dir;

pub fn default_log_dir() -> PathBuf {
    data_dir().join("logs")
}

/// Logs to stdout and to a fresh `<prefix>_<timestamp>.log` under `log_dir`.
/// `RUST_LOG` overrides `level` when set.
pub fn init(log_dir: &Path, level: &str, prefix: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let path = log_dir.join(format!(
        "{prefix}_{}.log",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    ));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(path)
}

pub fn section(title: &str) {
    let rule = "=".repeat(80);
    info!("{rule}");
    info!("{title}");
    info!("{rule}");
}
