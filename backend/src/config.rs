//! Configuration management for the Filament Inventory service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with FI_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT verification configuration
    pub jwt: JwtConfig,

    /// Label printer configuration
    pub printer: PrinterConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Shared secret used to verify HS256 tokens from the identity service
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PrinterConfig {
    /// When false labels are rendered but never sent
    pub enabled: bool,

    /// Printer host name or IP address
    pub host: String,

    /// Raw TCP printing port
    pub port: u16,

    /// Brother QL model, e.g. "QL-810W"
    pub model: String,

    /// Label media identifier, e.g. "17x54"
    pub label: String,

    /// Connect/write timeout in seconds
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("FI_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let mut builder = config::Config::builder();
        if environment == "development" {
            builder = builder.set_default("jwt.secret", "development-secret-key")?;
        }

        let config = builder
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 8000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("printer.enabled", false)?
            .set_default("printer.host", "127.0.0.1")?
            .set_default("printer.port", 9100)?
            .set_default("printer.model", "QL-810W")?
            .set_default("printer.label", "17x54")?
            .set_default("printer.timeout_secs", 5)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FI prefix)
            .add_source(
                Environment::with_prefix("FI")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "0.0.0.0".to_string(),
        }
    }
}
