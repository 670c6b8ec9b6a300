//! # Logging Setup
//!
//! Configures the `tracing-subscriber` stack used by the player core.
//! Hosts call [`init_logging`] once at startup; all crates log through the
//! `tracing` macros.

use crate::error::{Result, RuntimeError};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format with colors
    Pretty,
    /// Structured JSON format for machine parsing
    Json,
    /// Compact format for production
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        return Self::Pretty;

        #[cfg(not(debug_assertions))]
        return Self::Json;
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Filter directive, e.g. `"info"` or `"core_playback=debug,info"`.
    /// Overridden by `RUST_LOG` when set.
    pub directive: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            directive: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = directive.into();
        self
    }
}

/// Initializes the global tracing subscriber.
///
/// # Errors
///
/// Returns `RuntimeError::Logging` when the filter directive is invalid or a
/// global subscriber is already installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.directive))
        .map_err(|e| RuntimeError::Logging(format!("invalid filter directive: {e}")))?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
    };

    result.map_err(|e| RuntimeError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directive_is_info() {
        let config = LoggingConfig::default();
        assert_eq!(config.directive, "info");
    }

    #[test]
    fn builder_overrides_fields() {
        let config = LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_directive("core_playback=debug");
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.directive, "core_playback=debug");
    }
}
