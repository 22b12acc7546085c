//! Process-wide tracing subscriber
//!
//! Console output goes to stderr; when a log file is configured every event
//! is also appended to it without ANSI colours. `RUST_LOG` overrides the
//! configured level.

use std::fs::{File, OpenOptions};
use std::sync::{Mutex, OnceLock};

use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

const FALLBACK_LEVEL: &str = "info";

static ACTIVE: OnceLock<LoggingConfig> = OnceLock::new();

/// Install the subscriber once and return the configuration in effect.
///
/// Later calls change nothing and return the first configuration. An invalid
/// level falls back to `info`; a log file that cannot be opened leaves
/// console logging only. Both are reported as warnings.
pub fn init_logging(config: &LoggingConfig) -> &'static LoggingConfig {
    ACTIVE.get_or_init(|| install(config))
}

fn install(config: &LoggingConfig) -> LoggingConfig {
    let mut effective = config.clone();
    let mut problems = Vec::new();

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).unwrap_or_else(|e| {
            problems.push(format!(
                "Invalid log level '{}' ({}), using '{}'",
                config.level, e, FALLBACK_LEVEL
            ));
            effective.level = FALLBACK_LEVEL.to_string();
            EnvFilter::new(FALLBACK_LEVEL)
        }),
    };

    let file = config.file.as_ref().and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(file),
            Err(e) => {
                problems.push(format!("Cannot open log file {}: {}", path.display(), e));
                effective.file = None;
                None
            }
        }
    });

    let file_layer = file.map(|file: File| {
        fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(Mutex::new(file))
    });

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .is_ok();

    for problem in &problems {
        warn!("{}", problem);
    }
    if installed {
        info!(
            "Logging configured (level={}, file={})",
            effective.level,
            effective
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "none".to_string())
        );
    }
    effective
}
