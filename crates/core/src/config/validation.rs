//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `keyword` or `user_agent` is empty
    /// - `min_score` falls outside the oracle's 0-10 scale
    /// - `max_search_pages` is 0 or exceeds 50
    /// - `max_text_len` is 0 or exceeds 100k characters
    /// - `nav_timeout_ms` is under 1s or over 5 minutes
    /// - `request_delay_ms` exceeds 5 minutes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keyword.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "keyword".into(), reason: "must not be empty".into() });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if !(0.0..=10.0).contains(&self.min_score) {
            return Err(ConfigError::Invalid {
                field: "min_score".into(),
                reason: "must be within the 0-10 scoring scale".into(),
            });
        }

        if self.max_search_pages == 0 {
            return Err(ConfigError::Invalid { field: "max_search_pages".into(), reason: "must be at least 1".into() });
        }
        if self.max_search_pages > 50 {
            return Err(ConfigError::Invalid { field: "max_search_pages".into(), reason: "must not exceed 50".into() });
        }

        if self.max_text_len == 0 {
            return Err(ConfigError::Invalid { field: "max_text_len".into(), reason: "must be greater than 0".into() });
        }
        if self.max_text_len > 100_000 {
            return Err(ConfigError::Invalid {
                field: "max_text_len".into(),
                reason: "must not exceed 100000 characters".into(),
            });
        }

        if self.nav_timeout_ms < 1_000 {
            return Err(ConfigError::Invalid { field: "nav_timeout_ms".into(), reason: "must be at least 1s".into() });
        }
        if self.nav_timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "nav_timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.request_delay_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "request_delay_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.sites.is_empty() {
            tracing::warn!("no sites configured; discovery cycles will harvest nothing");
        }

        Ok(())
    }
}
