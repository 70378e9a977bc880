//! Tracing subscriber setup.
//!
//! The rolling file under `LOG_DIR` always gets JSON. Stdout gets JSON in
//! production and compact human-readable lines in development.

use std::env;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AppEnv;

const DEFAULT_FILTER: &str = "info,omni_saude_server=debug,sea_orm=warn,sqlx=warn";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_FILE_PREFIX: &str = "omni-saude.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub dir: PathBuf,
    pub file_prefix: String,
    pub json_stdout: bool,
}

impl LogSettings {
    /// Reads `APP_ENV`, `LOG_DIR` and `LOG_FILE`. An unparseable `APP_ENV` is
    /// treated as development here; `AppConfig::from_env` reports it later.
    pub fn from_env() -> Self {
        Self::resolve(
            env::var("APP_ENV").ok().as_deref(),
            env::var("LOG_DIR").ok(),
            env::var("LOG_FILE").ok(),
        )
    }

    fn resolve(app_env: Option<&str>, dir: Option<String>, file_prefix: Option<String>) -> Self {
        let app_env = app_env
            .and_then(|raw| raw.parse::<AppEnv>().ok())
            .unwrap_or(AppEnv::Development);

        Self {
            dir: PathBuf::from(
                dir.filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_LOG_DIR.to_string()),
            ),
            file_prefix: file_prefix
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FILE_PREFIX.to_string()),
            json_stdout: app_env == AppEnv::Production,
        }
    }
}

/// Installs the global subscriber. Level comes from `RUST_LOG`.
///
/// Hold the returned guard until exit so buffered file lines get flushed.
pub fn init_logging() -> WorkerGuard {
    let settings = LogSettings::from_env();

    let file_appender = rolling::daily(&settings.dir, &settings.file_prefix);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_current_span(true)
        .with_ansi(false)
        .with_writer(file_writer);

    let json_stdout = settings.json_stdout.then(|| {
        fmt::layer()
            .json()
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_current_span(true)
    });
    let compact_stdout = (!settings.json_stdout).then(|| fmt::layer().compact().with_target(true));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // Fails only when a subscriber is already installed
    if let Err(err) = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(json_stdout)
        .with(compact_stdout)
        .try_init()
    {
        tracing::debug!(error = %err, "Tracing subscriber already installed");
    }

    tracing::info!(
        log_dir = %settings.dir.display(),
        file_prefix = %settings.file_prefix,
        json_stdout = settings.json_stdout,
        "Logging initialised"
    );

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_should_use_compact_stdout_and_logs_dir() {
        let settings = LogSettings::resolve(None, None, None);

        assert_eq!(settings.dir, PathBuf::from("logs"));
        assert_eq!(settings.file_prefix, "omni-saude.log");
        assert!(!settings.json_stdout);
    }

    #[test]
    fn production_should_switch_stdout_to_json() {
        let settings = LogSettings::resolve(Some("production"), Some("/var/log/omni".to_string()), None);

        assert!(settings.json_stdout);
        assert_eq!(settings.dir, PathBuf::from("/var/log/omni"));
    }

    #[test]
    fn blank_overrides_should_fall_back_to_defaults() {
        let settings = LogSettings::resolve(Some("staging"), Some("  ".to_string()), Some(String::new()));

        assert_eq!(settings.dir, PathBuf::from("logs"));
        assert_eq!(settings.file_prefix, "omni-saude.log");
        assert!(!settings.json_stdout);
    }
}
