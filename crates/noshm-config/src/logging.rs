//! Structured logging for the noshm layer.
//!
//! Events carry a `component` field so a log shared with the host
//! application can be filtered down to ours.
//!
//! # Usage
//!
//! ```ignore
//! use noshm_config::log_layer_debug;
//!
//! log_layer_debug!("Hiding extension", name = "MIT-SHM");
//! ```

use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::{ConfigError, LoggingConfig};

/// Environment variable holding an `EnvFilter` directive. Wins over the
/// configured level.
pub const LOG_ENV: &str = "NOSHM_LOG";

/// Component identifiers for log filtering
pub struct Component;

impl Component {
    pub const LAYER: &'static str = "LAYER";
    pub const CONFIG: &'static str = "CONFIG";
}

// === LAYER logging macros ===

#[macro_export]
macro_rules! log_layer_warn {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::warn!(component = $crate::logging::Component::LAYER, $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_layer_debug {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::debug!(component = $crate::logging::Component::LAYER, $($key = $value,)* $msg)
    };
}

// === CONFIG logging macros ===

#[macro_export]
macro_rules! log_config_warn {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::warn!(component = $crate::logging::Component::CONFIG, $($key = $value,)* $msg)
    };
}

/// Build the filter: `NOSHM_LOG` first, then the configured level, then `warn`.
pub fn env_filter(logging: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("warn"))
    })
}

/// Non-rotating appender for `path`. Writes happen on the calling thread.
pub fn file_appender(path: &Path) -> Result<RollingFileAppender, ConfigError> {
    let name = path
        .file_name()
        .ok_or_else(|| ConfigError::InvalidLogFile(path.to_path_buf()))?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    Ok(RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy().into_owned())
        .build(dir)?)
}

/// Install the global subscriber.
///
/// Uses `try_init`: a host that already set a global subscriber keeps it.
/// An unusable log file falls back to stderr. Returns `false` when another
/// subscriber was already installed.
pub fn init_logging(logging: &LoggingConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(logging))
        .with_target(false);

    let (installed, appender_error) = match logging.file.as_deref().map(file_appender) {
        Some(Ok(appender)) => (
            builder.with_ansi(false).with_writer(appender).try_init(),
            None,
        ),
        Some(Err(e)) => (builder.with_writer(std::io::stderr).try_init(), Some(e)),
        None => (builder.with_writer(std::io::stderr).try_init(), None),
    };

    if let Some(e) = appender_error {
        log_config_warn!("Logging to stderr instead", error = tracing::field::display(&e));
    }

    installed.is_ok()
}
