//! Logging and tracing infrastructure for gridkit
//!
//! Console output goes to stderr so command output on stdout stays clean.
//! Optionally a daily-rotated JSON file is written for bug reports.
//! `RUST_LOG` overrides the configured filter.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory where log files should be written
    pub log_dir: PathBuf,

    /// Whether to enable JSON output to files (for bug reports)
    pub enable_json_logs: bool,

    /// Whether to enable pretty console output
    pub enable_console_logs: bool,

    /// Whether to include file/line information in logs
    pub include_location: bool,

    /// Whether to log spans (for performance tracing)
    pub enable_spans: bool,

    /// Default log level filter
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: log_directory(),
            enable_json_logs: true,
            enable_console_logs: true,
            include_location: cfg!(debug_assertions),
            enable_spans: cfg!(debug_assertions),
            default_filter: "debug,gridkit_app=debug,gridkit_table=debug,gridkit_services=debug,gridkit_settings=debug".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Production configuration (warnings on the console, JSON logs for bug reports)
    pub fn production() -> Self {
        Self {
            log_dir: log_directory(),
            enable_json_logs: true,
            enable_console_logs: true,
            include_location: false,
            enable_spans: false,
            default_filter: "warn,gridkit_app=info,gridkit_services=info".to_string(),
        }
    }

    /// Development configuration (pretty console output, verbose logging)
    pub fn development() -> Self {
        Self::default()
    }

    /// Testing configuration (console only, no files)
    pub fn testing() -> Self {
        Self {
            log_dir: std::env::temp_dir().join("gridkit-tests"),
            enable_json_logs: false,
            enable_console_logs: true,
            include_location: true,
            enable_spans: true,
            default_filter: "debug".to_string(),
        }
    }

    /// Replace the default filter, e.g. from a `--log-level` flag
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }
}

/// Initialize the logging system with the given configuration
///
/// The returned guard flushes the file writer; keep it alive until exit.
pub fn init(config: LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    // NEW fires once per span; ENTER would repeat on every async re-poll
    let span_events = if config.enable_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let mut layers = Vec::new();
    let mut guard = None;

    if config.enable_console_logs {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_span_events(span_events.clone())
            .with_ansi(true)
            .with_writer(std::io::stderr)
            .pretty()
            .with_filter(env_filter.clone())
            .boxed();

        layers.push(console_layer);
    }

    if config.enable_json_logs {
        std::fs::create_dir_all(&config.log_dir)?;
        let file_appender = tracing_appender::rolling::daily(&config.log_dir, "gridkit.log");
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(worker_guard);

        let json_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(span_events)
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(non_blocking)
            .with_filter(env_filter)
            .boxed();

        layers.push(json_layer);
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    tracing::debug!(
        log_dir = %config.log_dir.display(),
        json_enabled = config.enable_json_logs,
        console_enabled = config.enable_console_logs,
        "Logging system initialized"
    );

    Ok(guard)
}

/// The settings crate's logs directory, so `ensure_directories` creates it
pub fn log_directory() -> PathBuf {
    gridkit_settings::logs_dir().unwrap_or_else(|_| PathBuf::from("gridkit").join("logs"))
}

/// Guard that logs timing information when dropped
pub struct TimingGuard {
    name: &'static str,
    start: std::time::Instant,
}

impl TimingGuard {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        tracing::debug!(
            operation = self.name,
            duration_ms = elapsed.as_millis(),
            "Operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_defaults() {
        let config = LoggingConfig::default();
        assert!(config.enable_console_logs);
        assert!(config.enable_json_logs);
        assert!(config.log_dir.ends_with("gridkit/logs"));
    }

    #[test]
    fn test_log_directory_matches_settings() {
        if let Ok(dir) = gridkit_settings::logs_dir() {
            assert_eq!(log_directory(), dir);
        }
    }

    #[test]
    fn test_production_config() {
        let config = LoggingConfig::production();
        assert!(config.enable_json_logs);
        assert!(!config.include_location);
        assert!(config.default_filter.starts_with("warn"));
    }

    #[test]
    fn test_testing_config_writes_no_files() {
        let config = LoggingConfig::testing().with_filter("trace");
        assert!(!config.enable_json_logs);
        assert_eq!(config.default_filter, "trace");
    }
}
