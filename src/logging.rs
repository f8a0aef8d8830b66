use std::path::Path;

use config::ConfigError;
use once_cell::sync::OnceCell;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::config::{LoggingConfig, Settings};

const LOG_FILE_PREFIX: &str = "llama_module";

// Holds the file writer guard for the life of the process; dropping it would
// stop the background writer.
static LOGGING: OnceCell<Option<WorkerGuard>> = OnceCell::new();

/// Installs the global tracing subscriber once per process.
///
/// `RUST_LOG` wins over the configured level. When `logging.file` is set the
/// output goes to a daily rolling file in that directory, otherwise to stderr
/// (which Android forwards to logcat for native libraries started by the VM).
/// A log directory that cannot be created falls back to stderr.
pub fn init(config: &LoggingConfig) {
    LOGGING.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.to_lowercase()));

        let mut file_error = None;
        let appender = match &config.file {
            Some(dir) => match daily_appender(dir) {
                Ok(appender) => Some(appender),
                Err(e) => {
                    file_error = Some(e);
                    None
                }
            },
            None => None,
        };

        let guard = match appender {
            Some(file_appender) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                let installed = tracing_subscriber::fmt()
                    .with_writer(non_blocking)
                    .with_env_filter(filter)
                    // Disable ANSI colors for cleaner log files
                    .with_ansi(false)
                    .with_line_number(true)
                    .with_file(true)
                    .with_thread_ids(true)
                    .with_target(false)
                    .try_init()
                    .is_ok();
                installed.then_some(guard)
            }
            None => {
                // Another subscriber (e.g. a test harness) may already be set.
                let _ = tracing_subscriber::fmt()
                    .with_writer(std::io::stderr)
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_thread_ids(true)
                    .with_target(false)
                    .try_init();
                None
            }
        };

        if let Some(e) = file_error {
            warn!(file = ?config.file, error = %e, "Cannot open log directory, logging to stderr");
        }
        info!(level = %config.level, file = ?config.file, "llama_module logging initialized");
        guard
    });
}

/// Installs logging from the environment-level settings, falling back to
/// the defaults when they do not load. Returns the load error, if any, after
/// it has been logged.
pub fn init_from_env() -> Option<ConfigError> {
    init_from(Settings::load(None))
}

fn init_from(loaded: Result<Settings, ConfigError>) -> Option<ConfigError> {
    match loaded {
        Ok(settings) => {
            init(&settings.logging);
            None
        }
        Err(e) => {
            init(&Settings::default().logging);
            warn!(error = %e, "Invalid environment settings, using defaults");
            Some(e)
        }
    }
}

/// Daily rolling appender in `dir`, creating the directory if needed.
pub fn daily_appender(dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(dir)
}

/// Returns true once `init` has run.
pub fn is_initialized() -> bool {
    LOGGING.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let config = LoggingConfig {
            level: "warn".into(),
            file: None,
        };
        init(&config);
        init(&config);
        assert!(is_initialized());
    }

    #[test]
    fn test_unusable_log_directory_is_an_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let dir = file.path().join("logs");
        assert!(daily_appender(&dir).is_err());
    }

    #[test]
    fn test_init_with_unusable_log_directory_falls_back() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = LoggingConfig {
            level: "info".into(),
            file: Some(file.path().join("logs")),
        };
        let result = std::panic::catch_unwind(|| init(&config));
        assert!(result.is_ok());
        assert!(is_initialized());
    }

    #[test]
    fn test_bad_settings_are_reported_and_defaults_used() {
        let error = init_from(Err(ConfigError::Message("bad level".into())));
        assert!(matches!(error, Some(ConfigError::Message(m)) if m == "bad level"));
        assert!(is_initialized());
    }

    #[test]
    fn test_appender_creates_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("logs");
        assert!(daily_appender(&dir).is_ok());
        assert!(dir.is_dir());
    }
}
