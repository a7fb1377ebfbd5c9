use crate::error::{RelayError, Result};
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes logging with console output and a daily rotated JSON file in `log_dir`.
///
/// The returned guard flushes the file writer when dropped; keep it alive in `main`.
pub fn init_logging(log_dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "relay.log");
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);
    let console_layer = fmt::layer().with_writer(std::io::stdout);

    let directive = "scanmap_relay=info"
        .parse::<Directive>()
        .map_err(|e| RelayError::Config(format!("invalid log directive: {}", e)))?;

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(directive))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| RelayError::Config(format!("failed to install logger: {}", e)))?;

    Ok(guard)
}
