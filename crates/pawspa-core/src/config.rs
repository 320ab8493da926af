//! Application configuration
//!
//! Centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.

use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub grooming: GroomingConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Comma-separated list of allowed CORS origins
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_cors_origins() -> String {
    "http://localhost:3000,http://127.0.0.1:3000".to_string()
}

/// Database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Grooming business configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GroomingConfig {
    /// Matted coat fee applied when no explicit amount is given
    #[serde(default = "default_matted_coat_fee")]
    pub default_matted_coat_fee: f64,

    /// Retries for queue-number unique-index collisions
    #[serde(default = "default_queue_retries")]
    pub queue_retry_attempts: u32,
}

fn default_matted_coat_fee() -> f64 {
    100.00
}

fn default_queue_retries() -> u32 {
    3
}

impl GroomingConfig {
    /// Default matted coat fee as a money amount
    pub fn matted_coat_fee(&self) -> Decimal {
        Decimal::try_from(self.default_matted_coat_fee).unwrap_or_else(|_| Decimal::new(10000, 2))
    }
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("server.cors_origins", default_cors_origins())?
            .set_default("database.max_connections", 10)?
            .set_default("grooming.default_matted_coat_fee", 100.00)?
            .set_default("grooming.queue_retry_attempts", 3)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with PAWSPA_ prefix
            .add_source(
                Environment::with_prefix("PAWSPA")
                    .separator("__")
                    .try_parsing(true),
            )
            // Conventional flat env vars win over everything
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("server.cors_origins", env::var("CORS_ORIGINS").ok())?
            .build()?;

        config.try_deserialize()
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for GroomingConfig {
    fn default() -> Self {
        Self {
            default_matted_coat_fee: 100.00,
            queue_retry_attempts: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grooming_config() {
        let config = GroomingConfig::default();
        assert_eq!(config.default_matted_coat_fee, 100.00);
        assert_eq!(config.queue_retry_attempts, 3);
    }

    #[test]
    fn test_matted_coat_fee_as_decimal() {
        let config = GroomingConfig::default();
        assert_eq!(config.matted_coat_fee(), Decimal::new(10000, 2));
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 9090,
            workers: 2,
            cors_origins: default_cors_origins(),
        };
        let app = AppConfig {
            server: config,
            database: DatabaseConfig {
                url: "postgresql://localhost/pawspa".to_string(),
                max_connections: 5,
            },
            grooming: GroomingConfig::default(),
        };
        assert_eq!(app.server_addr(), "127.0.0.1:9090");
    }
}
