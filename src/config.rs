//! Configuration management for `EcoVoyage`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::EcoVoyageError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Public demo application id. Only paired with a search-only key.
const FALLBACK_APP_ID: &str = "RM2LBYLLID";
/// Search-only key scoped to the public destination index.
const FALLBACK_SEARCH_KEY: &str = "00076acd167ffcfcf8bec05ae031852a";

/// Root configuration structure for `EcoVoyage`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EcoVoyageConfig {
    /// Hosted search index settings
    #[serde(default)]
    pub search: SearchConfig,
    /// Suggestion debouncing
    #[serde(default)]
    pub autocomplete: AutocompleteConfig,
    /// HTTP service settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Hosted search index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Application id of the search service
    #[serde(default = "default_app_id")]
    pub app_id: String,
    /// Read-only search key
    #[serde(default = "default_search_key")]
    pub search_key: String,
    /// Name of the destination index
    #[serde(default = "default_index_name")]
    pub index_name: String,
    /// Override for the search host, e.g. a local stand-in
    #[serde(default)]
    pub host: Option<String>,
    /// Number of destinations requested per search
    #[serde(default = "default_hits_per_page")]
    pub hits_per_page: u32,
    /// Request timeout; unset keeps the transport default
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

/// Autocomplete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutocompleteConfig {
    /// Quiet period after the last keystroke before a request is issued
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Shorter inputs clear suggestions instead of querying
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
    /// Maximum number of suggestions
    #[serde(default = "default_suggestion_limit")]
    pub limit: u32,
}

/// HTTP service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory with a prebuilt front end, served as fallback
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    /// Conversations kept in memory; the oldest is dropped beyond this
    #[serde(default = "default_max_conversations")]
    pub max_conversations: usize,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_app_id() -> String {
    FALLBACK_APP_ID.to_string()
}

fn default_search_key() -> String {
    FALLBACK_SEARCH_KEY.to_string()
}

fn default_index_name() -> String {
    "ecovoyage_destinations".to_string()
}

fn default_hits_per_page() -> u32 {
    5
}

fn default_debounce_ms() -> u64 {
    200
}

fn default_min_query_len() -> usize {
    2
}

fn default_suggestion_limit() -> u32 {
    5
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "frontend/dist".to_string()
}

pub(crate) fn default_max_conversations() -> usize {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            app_id: default_app_id(),
            search_key: default_search_key(),
            index_name: default_index_name(),
            host: None,
            hits_per_page: default_hits_per_page(),
            timeout_seconds: None,
        }
    }
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_query_len: default_min_query_len(),
            limit: default_suggestion_limit(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            static_dir: default_static_dir(),
            max_conversations: default_max_conversations(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl SearchConfig {
    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> String {
        match &self.host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => format!("https://{}-dsn.algolia.net", self.app_id.to_lowercase()),
        }
    }

    /// True when the built-in demo credentials are in use
    #[must_use]
    pub fn uses_fallback_credentials(&self) -> bool {
        self.app_id == FALLBACK_APP_ID && self.search_key == FALLBACK_SEARCH_KEY
    }
}

impl AutocompleteConfig {
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl EcoVoyageConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // ECOVOYAGE_SEARCH__APP_ID -> search.app_id
        builder = builder.add_source(
            Environment::with_prefix("ECOVOYAGE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: EcoVoyageConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ecovoyage").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.search.app_id.is_empty() {
            self.search.app_id = default_app_id();
        }
        if self.search.search_key.is_empty() {
            self.search.search_key = default_search_key();
        }
        if self.search.index_name.is_empty() {
            self.search.index_name = default_index_name();
        }
        if self.search.hits_per_page == 0 {
            self.search.hits_per_page = default_hits_per_page();
        }
        if self.search.host.as_deref().is_some_and(str::is_empty) {
            self.search.host = None;
        }
        if self.autocomplete.debounce_ms == 0 {
            self.autocomplete.debounce_ms = default_debounce_ms();
        }
        if self.autocomplete.limit == 0 {
            self.autocomplete.limit = default_suggestion_limit();
        }
        if self.server.port == 0 {
            self.server.port = default_port();
        }
        if self.server.max_conversations == 0 {
            self.server.max_conversations = default_max_conversations();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_credentials()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate search credentials and index name
    pub fn validate_credentials(&self) -> Result<()> {
        if self.search.app_id.trim().is_empty() {
            return Err(EcoVoyageError::config("Search app id cannot be empty").into());
        }
        if self.search.search_key.trim().is_empty() {
            return Err(EcoVoyageError::config("Search key cannot be empty").into());
        }
        if self.search.index_name.trim().is_empty() {
            return Err(EcoVoyageError::config("Search index name cannot be empty").into());
        }
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if !(1..=50).contains(&self.search.hits_per_page) {
            return Err(EcoVoyageError::config("Search hits per page must be between 1 and 50").into());
        }

        if self.search.timeout_seconds.is_some_and(|t| t == 0 || t > 300) {
            return Err(EcoVoyageError::config(
                "Search timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if self.autocomplete.debounce_ms > 5000 {
            return Err(EcoVoyageError::config("Autocomplete debounce cannot exceed 5000 ms").into());
        }

        if self.autocomplete.min_query_len == 0 {
            return Err(EcoVoyageError::config(
                "Autocomplete minimum query length must be at least 1",
            )
            .into());
        }

        if !(1..=20).contains(&self.autocomplete.limit) {
            return Err(EcoVoyageError::config("Autocomplete limit must be between 1 and 20").into());
        }

        if self.server.max_conversations > 100_000 {
            return Err(EcoVoyageError::config("Server cannot keep more than 100000 conversations").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(EcoVoyageError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(EcoVoyageError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if let Some(host) = &self.search.host {
            if !host.starts_with("http://") && !host.starts_with("https://") {
                return Err(EcoVoyageError::config(
                    "Search host must be a valid HTTP or HTTPS URL",
                )
                .into());
            }
        }

        Ok(())
    }
}
