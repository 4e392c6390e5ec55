//! Shared logging configuration and initialization.

use std::env;
use std::net::SocketAddr;

use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::parse_bool;
use crate::dataset::DatasetError;
use crate::filter::FilterOptions;
use crate::record::SalesRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            include_target: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoggingInitError {
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(#[from] tracing::subscriber::SetGlobalDefaultError),
}

pub fn logging_config_from_env() -> LoggingConfig {
    let mut config = LoggingConfig::default();

    if let Ok(level) = env::var("SALESDASH_LOG_LEVEL") {
        let trimmed = level.trim();
        if !trimmed.is_empty() {
            config.level = trimmed.to_string();
        }
    }

    if let Ok(format) = env::var("SALESDASH_LOG_FORMAT") {
        if let Some(parsed) = parse_log_format(&format) {
            config.format = parsed;
        }
    }

    if let Ok(include_target) = env::var("SALESDASH_LOG_TARGET") {
        if let Some(parsed) = parse_bool(&include_target) {
            config.include_target = parsed;
        }
    }

    config
}

pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingInitError> {
    let env_filter =
        EnvFilter::try_new(config.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(config.include_target)
        .with_ansi(matches!(config.format, LogFormat::Pretty));

    match config.format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.pretty().finish())?,
    }

    Ok(())
}

pub fn log_app_start(config: &LoggingConfig) {
    info!(
        component = "dashboard_server",
        event = "app.start",
        log_level = %config.level,
        log_format = ?config.format,
        include_target = config.include_target
    );
}

pub fn log_app_bind(bound_addr: SocketAddr) {
    info!(
        component = "dashboard_server",
        event = "app.bind",
        bind_addr = %bound_addr,
        routes = "/dashboard,/dashboard/view,/dashboard/view/current"
    );
}

pub fn log_dataset_selected(source: &str, reason: Option<&str>, top_n: usize) {
    match reason {
        Some(reason) => info!(
            component = "dashboard_server",
            event = "dataset.selected",
            source,
            reason,
            top_n
        ),
        None => info!(
            component = "dashboard_server",
            event = "dataset.selected",
            source,
            top_n
        ),
    }
}

/// Startup load of the configured dataset. A failure is reported but not fatal:
/// every request reloads, so the file may appear later.
pub fn log_dataset_check(source: &str, result: Result<&[SalesRecord], &DatasetError>) {
    match result {
        Ok(records) => {
            let options = FilterOptions::from_records(records);
            info!(
                component = "dashboard_server",
                event = "dataset.ready",
                source,
                records = records.len(),
                years = options.years.len(),
                discount_types = options.discount_types.len(),
                regions = options.regions.len(),
                segments = options.segments.len()
            );
        }
        Err(err) => warn!(
            component = "dashboard_server",
            event = "dataset.unavailable",
            source,
            error = %err
        ),
    }
}

fn parse_log_format(raw: &str) -> Option<LogFormat> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "json" => Some(LogFormat::Json),
        "pretty" => Some(LogFormat::Pretty),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_env::with_env_vars;

    #[test]
    fn defaults_when_env_missing() {
        let cfg = with_env_vars(
            &[
                ("SALESDASH_LOG_LEVEL", None),
                ("SALESDASH_LOG_FORMAT", None),
                ("SALESDASH_LOG_TARGET", None),
            ],
            logging_config_from_env,
        );

        assert_eq!(cfg, LoggingConfig::default());
    }

    #[test]
    fn parses_json_and_level_and_target_from_env() {
        let cfg = with_env_vars(
            &[
                ("SALESDASH_LOG_LEVEL", Some("salesdash=debug")),
                ("SALESDASH_LOG_FORMAT", Some("JSON")),
                ("SALESDASH_LOG_TARGET", Some("off")),
            ],
            logging_config_from_env,
        );

        assert_eq!(cfg.level, "salesdash=debug");
        assert_eq!(cfg.format, LogFormat::Json);
        assert!(!cfg.include_target);
    }

    #[test]
    fn invalid_format_or_target_falls_back_to_defaults() {
        let cfg = with_env_vars(
            &[
                ("SALESDASH_LOG_LEVEL", Some("  ")),
                ("SALESDASH_LOG_FORMAT", Some("yaml")),
                ("SALESDASH_LOG_TARGET", Some("maybe")),
            ],
            logging_config_from_env,
        );

        assert_eq!(cfg, LoggingConfig::default());
    }
}
