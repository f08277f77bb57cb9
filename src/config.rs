//! Configuration management

use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    /// Regex matched case-insensitively against the device manufacturer name
    /// to decide whether support data applies to a device.
    pub manufacturer_pattern: String,
    pub logging: LoggingConfig,
}

/// Cisco Support API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
    pub token_url: String,
    pub timeout_seconds: u64,
}

/// Response cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                client_id: String::new(),
                client_secret: String::new(),
                base_url: "https://apix.cisco.com".to_string(),
                token_url: "https://id.cisco.com/oauth2/default/v1/token".to_string(),
                timeout_seconds: 30,
            },
            cache: CacheConfig { ttl_seconds: 300 },
            manufacturer_pattern: "cisco".to_string(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("CISCO_SUPPORT").separator("__"));

        // Override with environment-specific config if ENV is set
        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        builder.build()?.try_deserialize()
    }

    /// Check that required settings are present. Intended for settings-page
    /// or test-connection time, not per-request.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.api.client_id.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "api.client_id is required".to_string(),
            ));
        }
        if self.api.client_secret.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "api.client_secret is required".to_string(),
            ));
        }
        Ok(())
    }
}
