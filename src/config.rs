//! Configuration management for the `ForageGuide` service
//!
//! Handles loading configuration from a TOML file and environment variables,
//! picks up the two API secrets from the process environment, and validates
//! every setting before the service starts.

use crate::ForageError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the Google Geocoding API key
pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";
/// Environment variable holding the LLM API key
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Environment variable pointing at an alternate config file
pub const CONFIG_PATH_VAR: &str = "FORAGE_CONFIG";

/// Root configuration structure for the `ForageGuide` service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForageConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Geocoding API configuration
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Knowledge-base (encyclopedia) configuration
    #[serde(default)]
    pub encyclopedia: EncyclopediaConfig,
    /// LLM agent configuration
    #[serde(default)]
    pub agent: AgentConfig,
    /// Plant catalog configuration
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Upper bound for a whole request, enrichment included
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
}

/// Geocoding API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Google Geocoding API key
    pub api_key: Option<String>,
    /// Base URL for the geocoding API
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_client_timeout")]
    pub timeout_seconds: u32,
}

/// Knowledge-base configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncyclopediaConfig {
    /// MediaWiki action API endpoint
    #[serde(default = "default_encyclopedia_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_client_timeout")]
    pub timeout_seconds: u32,
    /// Number of summary sentences kept as the plant description
    #[serde(default = "default_summary_sentences")]
    pub summary_sentences: u32,
    /// User agent sent to the knowledge base
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// LLM agent configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// API key for the chat completions endpoint; the agent is disabled without it
    pub api_key: Option<String>,
    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_agent_api_url")]
    pub api_url: String,
    /// Model identifier
    #[serde(default = "default_agent_model")]
    pub model: String,
    /// Maximum number of model round trips per request
    #[serde(default = "default_agent_max_steps")]
    pub max_steps: u32,
    /// Request timeout in seconds
    #[serde(default = "default_agent_timeout")]
    pub timeout_seconds: u32,
}

/// Plant catalog configuration settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Alternate catalog file; the bundled table is used when unset
    pub path: Option<PathBuf>,
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
fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8000
}

fn default_request_timeout() -> u32 {
    60
}

fn default_geocoding_base_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}

fn default_client_timeout() -> u32 {
    15
}

fn default_encyclopedia_base_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_summary_sentences() -> u32 {
    2
}

fn default_user_agent() -> String {
    format!("ForageGuide/{}", env!("CARGO_PKG_VERSION"))
}

fn default_agent_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_agent_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_agent_max_steps() -> u32 {
    6
}

fn default_agent_timeout() -> u32 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_geocoding_base_url(),
            timeout_seconds: default_client_timeout(),
        }
    }
}

impl Default for EncyclopediaConfig {
    fn default() -> Self {
        Self {
            base_url: default_encyclopedia_base_url(),
            timeout_seconds: default_client_timeout(),
            summary_sentences: default_summary_sentences(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_agent_api_url(),
            model: default_agent_model(),
            max_steps: default_agent_max_steps(),
            timeout_seconds: default_agent_timeout(),
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

impl ForageConfig {
    /// Load configuration from file, environment variables and secrets
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from);
        Self::load_from_path(path)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from("forage.toml"));

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // FORAGE_GEOCODING__TIMEOUT_SECONDS=30 overrides geocoding.timeout_seconds
        builder = builder.add_source(
            Environment::with_prefix("FORAGE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: ForageConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_secrets(
            std::env::var(GOOGLE_API_KEY_VAR).ok(),
            std::env::var(OPENAI_API_KEY_VAR).ok(),
        );
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Fill API keys from the process secrets when the config leaves them unset
    pub fn apply_secrets(&mut self, google_api_key: Option<String>, openai_api_key: Option<String>) {
        if self.geocoding.api_key.is_none() {
            self.geocoding.api_key = google_api_key.filter(|k| !k.trim().is_empty());
        }
        if self.agent.api_key.is_none() {
            self.agent.api_key = openai_api_key.filter(|k| !k.trim().is_empty());
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.timeout_seconds == 0 {
            self.geocoding.timeout_seconds = default_client_timeout();
        }
        if self.encyclopedia.base_url.is_empty() {
            self.encyclopedia.base_url = default_encyclopedia_base_url();
        }
        if self.encyclopedia.timeout_seconds == 0 {
            self.encyclopedia.timeout_seconds = default_client_timeout();
        }
        if self.encyclopedia.user_agent.is_empty() {
            self.encyclopedia.user_agent = default_user_agent();
        }
        if self.agent.api_url.is_empty() {
            self.agent.api_url = default_agent_api_url();
        }
        if self.agent.model.is_empty() {
            self.agent.model = default_agent_model();
        }
        if self.agent.timeout_seconds == 0 {
            self.agent.timeout_seconds = default_agent_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Whether the agent endpoint can be served
    #[must_use]
    pub fn agent_enabled(&self) -> bool {
        self.agent.api_key.is_some()
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        match &self.geocoding.api_key {
            None => {
                return Err(ForageError::config(format!(
                    "Geocoding API key is required. Set {GOOGLE_API_KEY_VAR} or geocoding.api_key."
                ))
                .into());
            }
            Some(key) if key.len() < 8 => {
                return Err(ForageError::config(
                    "Geocoding API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }
            Some(_) => {}
        }

        if let Some(key) = &self.agent.api_key {
            if key.len() < 8 {
                return Err(ForageError::config(
                    "LLM API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        let timeouts = [
            ("Server request", self.server.request_timeout_seconds),
            ("Geocoding API", self.geocoding.timeout_seconds),
            ("Encyclopedia API", self.encyclopedia.timeout_seconds),
            ("Agent API", self.agent.timeout_seconds),
        ];
        for (name, seconds) in timeouts {
            if seconds > 300 {
                return Err(ForageError::config(format!(
                    "{name} timeout cannot exceed 300 seconds"
                ))
                .into());
            }
        }

        if !(1..=10).contains(&self.encyclopedia.summary_sentences) {
            return Err(
                ForageError::config("Summary sentences must be between 1 and 10").into(),
            );
        }

        if !(1..=20).contains(&self.agent.max_steps) {
            return Err(ForageError::config("Agent max steps must be between 1 and 20").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ForageError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ForageError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("Geocoding API", &self.geocoding.base_url),
            ("Encyclopedia API", &self.encyclopedia.base_url),
            ("Agent API", &self.agent.api_url),
        ];
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ForageError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
