//! Logging and tracing initialization.
//!
//! Standard output belongs to the CLI's progress lines, so log records go to
//! stderr unless a log file is configured.

use std::path::PathBuf;
use std::sync::Mutex;

use crate::config::LoggingConfig;

/// Where log records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    pub fn for_config(config: &LoggingConfig) -> Self {
        match &config.file {
            Some(path) => Self::File(path.clone()),
            None => Self::Stderr,
        }
    }
}

/// Initialize the tracing subscriber with the given configuration.
///
/// `RUST_LOG` takes precedence over `config.level`. When a log file is
/// configured but cannot be opened, logs go to stderr instead.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let log_file = match LogTarget::for_config(config) {
        LogTarget::File(path) => std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| eprintln!("Failed to open log file {}: {e}", path.display()))
            .ok(),
        LogTarget::Stderr => None,
    };

    if config.json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else if let Some(file) = log_file {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .without_time()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_logs_to_stderr() {
        assert_eq!(
            LogTarget::for_config(&LoggingConfig::default()),
            LogTarget::Stderr
        );

        let json = LoggingConfig {
            json: true,
            ..LoggingConfig::default()
        };
        assert_eq!(LogTarget::for_config(&json), LogTarget::Stderr);
    }

    #[test]
    fn test_configured_file_is_the_target() {
        let config = LoggingConfig {
            file: Some(PathBuf::from("/var/log/ksg.log")),
            ..LoggingConfig::default()
        };
        assert_eq!(
            LogTarget::for_config(&config),
            LogTarget::File(PathBuf::from("/var/log/ksg.log"))
        );
    }
}
