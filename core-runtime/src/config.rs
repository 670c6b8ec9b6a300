//! # Player Configuration
//!
//! Tunable parameters shared by the library and playback crates.

use crate::error::{Result, RuntimeError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Player core configuration.
///
/// Controls debounce delays, notice lifetime, history depth and the
/// placeholder metadata used for generated and freshly-imported songs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Delay before a search query is executed.
    ///
    /// Each keystroke restarts the timer; only the latest query runs.
    ///
    /// Default: 500 ms.
    #[serde(default = "default_search_debounce")]
    pub search_debounce: Duration,

    /// How long a user-facing notice stays visible before auto-dismissing.
    ///
    /// Default: 3 seconds.
    #[serde(default = "default_notice_duration")]
    pub notice_duration: Duration,

    /// Maximum number of entries kept in the play history.
    ///
    /// Default: 50.
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,

    /// Elapsed time past which "previous" restarts the current track instead
    /// of moving back.
    ///
    /// Default: 3 seconds.
    #[serde(default = "default_restart_threshold")]
    pub restart_threshold: Duration,

    /// Placeholder duration (seconds) assigned to generated songs whose real
    /// length is unknown.
    ///
    /// Default: 210 (3:30).
    #[serde(default = "default_placeholder_duration_secs")]
    pub placeholder_duration_secs: f64,

    /// Number of songs requested per generated playlist.
    ///
    /// Default: 8.
    #[serde(default = "default_generated_playlist_size")]
    pub generated_playlist_size: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            search_debounce: default_search_debounce(),
            notice_duration: default_notice_duration(),
            history_cap: default_history_cap(),
            restart_threshold: default_restart_threshold(),
            placeholder_duration_secs: default_placeholder_duration_secs(),
            generated_playlist_size: default_generated_playlist_size(),
        }
    }
}

impl PlayerConfig {
    /// Configuration tuned for tests and instant-feedback hosts.
    ///
    /// - Short debounce (50 ms)
    /// - Short notice lifetime (100 ms)
    pub fn snappy() -> Self {
        Self {
            search_debounce: Duration::from_millis(50),
            notice_duration: Duration::from_millis(100),
            ..Default::default()
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.history_cap == 0 {
            return Err(RuntimeError::InvalidConfig {
                field: "history_cap".to_string(),
                message: "must be > 0".to_string(),
            });
        }

        if self.placeholder_duration_secs <= 0.0 {
            return Err(RuntimeError::InvalidConfig {
                field: "placeholder_duration_secs".to_string(),
                message: "must be positive".to_string(),
            });
        }

        if self.generated_playlist_size == 0 {
            return Err(RuntimeError::InvalidConfig {
                field: "generated_playlist_size".to_string(),
                message: "must be > 0".to_string(),
            });
        }

        Ok(())
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_search_debounce() -> Duration {
    Duration::from_millis(500)
}

fn default_notice_duration() -> Duration {
    Duration::from_secs(3)
}

fn default_history_cap() -> usize {
    50
}

fn default_restart_threshold() -> Duration {
    Duration::from_secs(3)
}

fn default_placeholder_duration_secs() -> f64 {
    210.0
}

fn default_generated_playlist_size() -> usize {
    8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PlayerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search_debounce, Duration::from_millis(500));
        assert_eq!(config.history_cap, 50);
        assert_eq!(config.placeholder_duration_secs, 210.0);
    }

    #[test]
    fn snappy_config_shortens_timers() {
        let config = PlayerConfig::snappy();
        assert!(config.validate().is_ok());
        assert!(config.search_debounce < PlayerConfig::default().search_debounce);
        assert!(config.notice_duration < PlayerConfig::default().notice_duration);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = PlayerConfig::default();

        config.history_cap = 0;
        assert!(config.validate().is_err());
        config.history_cap = 50;

        config.placeholder_duration_secs = 0.0;
        assert!(config.validate().is_err());
        config.placeholder_duration_secs = 210.0;

        config.generated_playlist_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let config: PlayerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.history_cap, 50);
        assert_eq!(config.generated_playlist_size, 8);
    }
}
