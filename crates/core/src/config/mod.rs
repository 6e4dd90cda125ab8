//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (JOBSCOUT_*)
//! 2. TOML config file (if JOBSCOUT_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (JOBSCOUT_*)
/// 2. TOML config file (if JOBSCOUT_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Search keyword submitted to every configured site.
    ///
    /// Set via JOBSCOUT_KEYWORD environment variable.
    #[serde(default = "default_keyword")]
    pub keyword: String,

    /// Candidate profile text handed to the scoring endpoint.
    ///
    /// Set via JOBSCOUT_RESUME environment variable.
    #[serde(default = "default_resume")]
    pub resume: String,

    /// Free-form filter text handed to the scoring endpoint alongside the
    /// profile (e.g. "remote only, no gambling companies").
    ///
    /// Set via JOBSCOUT_FILTERS environment variable.
    #[serde(default)]
    pub filters: String,

    /// Minimum score (0-10) a posting must reach to trigger a notification.
    ///
    /// Set via JOBSCOUT_MIN_SCORE environment variable.
    #[serde(default = "default_min_score")]
    pub min_score: f64,

    /// Pause between successive posting fetches in milliseconds.
    ///
    /// Set via JOBSCOUT_REQUEST_DELAY_MS environment variable.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Maximum result pages to walk per site.
    ///
    /// Set via JOBSCOUT_MAX_SEARCH_PAGES environment variable.
    #[serde(default = "default_max_search_pages")]
    pub max_search_pages: u32,

    /// Site identifiers to harvest, in visit order. Identifiers without a
    /// registered adapter are skipped.
    ///
    /// Set via JOBSCOUT_SITES environment variable (comma-separated).
    #[serde(default = "default_sites")]
    pub sites: Vec<String>,

    /// Maximum extracted description length in characters.
    ///
    /// Set via JOBSCOUT_MAX_TEXT_LEN environment variable.
    #[serde(default = "default_max_text_len")]
    pub max_text_len: usize,

    /// Path to the SQLite vacancy database.
    ///
    /// Set via JOBSCOUT_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for both HTTP requests and the browser session.
    ///
    /// Set via JOBSCOUT_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Ceiling for a site's initial navigation in milliseconds.
    ///
    /// Set via JOBSCOUT_NAV_TIMEOUT_MS environment variable.
    #[serde(default = "default_nav_timeout_ms")]
    pub nav_timeout_ms: u64,

    /// How long to wait for the first result link to appear, in milliseconds.
    ///
    /// Set via JOBSCOUT_RESULTS_WAIT_MS environment variable.
    #[serde(default = "default_results_wait_ms")]
    pub results_wait_ms: u64,

    /// Idle pause between successive site visits in milliseconds.
    ///
    /// Set via JOBSCOUT_SITE_PAUSE_MS environment variable.
    #[serde(default = "default_site_pause_ms")]
    pub site_pause_ms: u64,

    /// Cron expression (with seconds field) for recurring discovery cycles.
    ///
    /// Set via JOBSCOUT_SEARCH_CRON environment variable.
    #[serde(default = "default_search_cron")]
    pub search_cron: String,

    /// API key for the scoring endpoint.
    ///
    /// Set via JOBSCOUT_ORACLE_API_KEY environment variable.
    /// Checked at daemon startup via [`AppConfig::require_oracle_api_key`].
    #[serde(default)]
    pub oracle_api_key: Option<String>,

    /// Chat-completions endpoint used for scoring.
    ///
    /// Set via JOBSCOUT_ORACLE_API_URL environment variable.
    #[serde(default = "default_oracle_api_url")]
    pub oracle_api_url: String,

    /// Model name passed to the scoring endpoint.
    ///
    /// Set via JOBSCOUT_ORACLE_MODEL environment variable.
    #[serde(default = "default_oracle_model")]
    pub oracle_model: String,

    /// Webhook URL for match notifications. Notifications are disabled when
    /// unset.
    ///
    /// Set via JOBSCOUT_WEBHOOK_URL environment variable.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

fn default_keyword() -> String {
    "Node.js Developer".into()
}

fn default_resume() -> String {
    "Fullstack Developer, NestJS, TypeScript, React, Trainee/Junior".into()
}

fn default_min_score() -> f64 {
    8.0
}

fn default_request_delay_ms() -> u64 {
    2_000
}

fn default_max_search_pages() -> u32 {
    3
}

fn default_sites() -> Vec<String> {
    vec!["work.ua".into(), "robota.ua".into(), "dou.ua".into(), "djinni.co".into()]
}

fn default_max_text_len() -> usize {
    5_000
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./jobscout.sqlite")
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36"
        .into()
}

fn default_nav_timeout_ms() -> u64 {
    45_000
}

fn default_results_wait_ms() -> u64 {
    8_000
}

fn default_site_pause_ms() -> u64 {
    2_000
}

fn default_search_cron() -> String {
    // hourly, tokio-cron-scheduler six-field form
    "0 0 * * * *".into()
}

fn default_oracle_api_url() -> String {
    "https://api.groq.com/openai/v1/chat/completions".into()
}

fn default_oracle_model() -> String {
    "compound-beta".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            keyword: default_keyword(),
            resume: default_resume(),
            filters: String::new(),
            min_score: default_min_score(),
            request_delay_ms: default_request_delay_ms(),
            max_search_pages: default_max_search_pages(),
            sites: default_sites(),
            max_text_len: default_max_text_len(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            nav_timeout_ms: default_nav_timeout_ms(),
            results_wait_ms: default_results_wait_ms(),
            site_pause_ms: default_site_pause_ms(),
            search_cron: default_search_cron(),
            oracle_api_key: None,
            oracle_api_url: default_oracle_api_url(),
            oracle_model: default_oracle_model(),
            webhook_url: None,
        }
    }
}

impl AppConfig {
    /// Inter-request pause as a Duration.
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Navigation ceiling as a Duration.
    pub fn nav_timeout(&self) -> Duration {
        Duration::from_millis(self.nav_timeout_ms)
    }

    /// Result-selector wait bound as a Duration.
    pub fn results_wait(&self) -> Duration {
        Duration::from_millis(self.results_wait_ms)
    }

    /// Inter-site idle pause as a Duration.
    pub fn site_pause(&self) -> Duration {
        Duration::from_millis(self.site_pause_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `JOBSCOUT_`
    /// 2. TOML file from `JOBSCOUT_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("JOBSCOUT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("JOBSCOUT_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check that the oracle API key is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the key is not set.
    pub fn require_oracle_api_key(&self) -> Result<&str, ConfigError> {
        self.oracle_api_key.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "oracle_api_key".into(),
            hint: "Set JOBSCOUT_ORACLE_API_KEY environment variable".into(),
        })
    }
}
