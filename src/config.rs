//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
}

/// Upstream API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Bearer token for the upstream API
    pub bearer_token: String,
    /// Base URL of the upstream API
    pub base_url: String,
    /// Posts requested per page (upstream allows 5..=100)
    pub page_size: u32,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

/// Cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Maximum entries in each account lookup cache
    pub account_capacity: u64,
    /// Account cache TTL in seconds, counted from insertion
    pub account_ttl_seconds: u64,
    /// Maximum number of simultaneously-tracked accounts' stores
    pub store_capacity: usize,
    /// Post store TTL in seconds; retention window and sync floor
    pub store_ttl_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (BIRDFEED_*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("upstream.base_url", "https://api.twitter.com")?
            .set_default("upstream.page_size", 100)?
            .set_default("upstream.timeout_seconds", 30)?
            .set_default("cache.account_capacity", 1000)?
            .set_default("cache.account_ttl_seconds", 3600)?
            .set_default("cache.store_capacity", 1000)?
            .set_default("cache.store_ttl_seconds", 86400)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (BIRDFEED_*)
            .add_source(
                Environment::with_prefix("BIRDFEED")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        if self.upstream.bearer_token.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "upstream.bearer_token must be set".to_string(),
            ));
        }

        if !(5..=100).contains(&self.upstream.page_size) {
            return Err(crate::error::AppError::Config(
                "upstream.page_size must be between 5 and 100".to_string(),
            ));
        }

        if self.cache.account_capacity == 0 || self.cache.store_capacity == 0 {
            return Err(crate::error::AppError::Config(
                "cache capacities must be greater than 0".to_string(),
            ));
        }

        if self.cache.account_ttl_seconds == 0 || self.cache.store_ttl_seconds == 0 {
            return Err(crate::error::AppError::Config(
                "cache TTLs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
