//! Tracing setup.
//!
//! Stderr gets a compact layer filtered by `WREN_LOG`, then `RUST_LOG`, then
//! the configured level. When file logging is on, a daily-rolling file under
//! `<data_dir>/logs/` records wren's own events at debug level.

use std::env;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use crate::core::lib::{WrenError, WrenResult};

pub const LOG_FILE_NAME: &str = "wren.log";

/// File layer filter. HTTP client internals stay out of the file.
pub const FILE_LOG_DIRECTIVES: &str = "warn,wren_terminal=debug,wren=debug";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file_enabled: bool,
}

impl LoggingConfig {
    fn build_env_filter(&self) -> EnvFilter {
        let directive = env::var("WREN_LOG")
            .ok()
            .or_else(|| env::var("RUST_LOG").ok())
            .unwrap_or_else(|| self.level.clone());

        EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

/// Installs the global subscriber. The returned guard flushes the file
/// writer on drop and must be held for the life of the process.
pub fn init_logging(config: &LoggingConfig, data_dir: &Path) -> WrenResult<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(io::stderr)
        .with_filter(config.build_env_filter());

    if !config.file_enabled {
        Registry::default()
            .with(stderr_layer)
            .try_init()
            .map_err(|e| WrenError::ConfigError(format!("Failed to initialize logging: {}", e)))?;
        return Ok(None);
    }

    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)
        .map_err(|e| WrenError::ConfigError(format!("Failed to create log directory: {}", e)))?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new(FILE_LOG_DIRECTIVES));

    Registry::default()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| WrenError::ConfigError(format!("Failed to initialize logging: {}", e)))?;

    Ok(Some(guard))
}
