//! Structured logging setup using `tracing-subscriber`.
//!
//! The library itself only emits `tracing` events. Applications that want
//! them printed call [`init_logging`] once at startup.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use crate::error::{DataError, Result};

/// Environment variable whose filter directives override the configured level.
pub const ENV_LOG: &str = "GMDATA_LOG";

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warning (or warn), error, off.
    #[serde(default = "default_level")]
    pub level: String,
    /// Append log lines to this file in addition to stderr.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_level() -> String {
    "warning".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
        }
    }
}

/// Install a global subscriber for this process.
///
/// Fails with [`DataError::Config`] if the level is unknown, the log file
/// cannot be opened, or a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_env_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match &config.file {
        Some(path) => {
            let file = open_log_file(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file).and(std::io::stderr))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    installed.map_err(|e| DataError::Config(format!("Failed to install logger: {}", e)))
}

pub(crate) fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(ENV_LOG) {
        return Ok(filter);
    }
    let level = normalize_level(&config.level)?;
    Ok(EnvFilter::new(format!("warn,gmdata={}", level)))
}

/// Map a configured level name onto a `tracing` directive.
fn normalize_level(level: &str) -> Result<&'static str> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        "off" => Ok("off"),
        other => Err(DataError::Config(format!("Unknown log level: {}", other))),
    }
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DataError::Config(format!("Failed to create log directory: {}", e))
            })?;
        }
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| DataError::Config(format!("Failed to open log file {:?}: {}", path, e)))
}
