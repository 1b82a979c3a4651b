//! Logging configuration and initialization for GreenFi services
//!
//! Output goes either to stdout or to daily rotating files, selected through
//! environment variables:
//!
//! - `LOG_DESTINATION`: `console` (default) or `file`
//! - `LOG_DIR`: directory for log files (default `./logs`), file mode only
//! - `LOG_FILE_PREFIX`: log file name prefix (default `greenfi`), file mode only
//! - `RUST_LOG`: filter directives (default `info`)

use anyhow::{Result, anyhow};
use std::env;
use std::str::FromStr;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_DIR: &str = "./logs";
const DEFAULT_LOG_FILE_PREFIX: &str = "greenfi";

/// Where log lines are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogDestination {
    #[default]
    Console,
    File,
}

impl FromStr for LogDestination {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "console" | "stdout" => Ok(LogDestination::Console),
            "file" => Ok(LogDestination::File),
            other => Err(format!("unknown log destination '{}'", other)),
        }
    }
}

fn destination_from_env() -> LogDestination {
    env::var("LOG_DESTINATION")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or_default()
}

/// Initialize tracing for the process.
///
/// Returns the file writer guard in file mode; dropping it stops the background
/// writer, so the caller holds it until shutdown.
pub fn init_logging() -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match destination_from_env() {
        LogDestination::Console => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stdout)
                        .with_ansi(true)
                        .with_target(false),
                )
                .try_init()
                .map_err(|e| anyhow!("Failed to initialize console tracing subscriber: {}", e))?;

            info!("📺 Logging to console (stdout)");
            Ok(None)
        }
        LogDestination::File => {
            let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string());
            let log_file_prefix = env::var("LOG_FILE_PREFIX")
                .unwrap_or_else(|_| DEFAULT_LOG_FILE_PREFIX.to_string());

            std::fs::create_dir_all(&log_dir).map_err(|e| {
                anyhow!("Failed to create log directory '{}': {}", log_dir, e)
            })?;

            let file_appender = rolling::daily(&log_dir, &log_file_prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(false),
                )
                .try_init()
                .map_err(|e| anyhow!("Failed to initialize file tracing subscriber: {}", e))?;

            info!("📝 Logging to daily rotating files in: {}/", log_dir);
            info!(
                "📂 Log file pattern: {}/{}.<YYYY-MM-DD>",
                log_dir, log_file_prefix
            );
            Ok(Some(guard))
        }
    }
}
