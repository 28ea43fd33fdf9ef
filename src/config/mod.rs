//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `COURSEGATE_` prefix and nested values use underscores as separators. An
//! optional YAML file pointed to by `COURSEGATE_CONFIG_FILE` is merged in
//! below the environment, for deployments that ship settings as a mounted file.
//!
//! # Example
//!
//! ```no_run
//! use coursegate::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr());
//! ```

mod database;
mod email;
mod error;
mod fulfillment;
mod lms;
mod payment;
mod server;

pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use error::{ConfigError, ValidationError};
pub use fulfillment::FulfillmentConfig;
pub use lms::LmsConfig;
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Environment variable naming the optional YAML settings file.
const CONFIG_FILE_VAR: &str = "COURSEGATE_CONFIG_FILE";

/// Root application configuration
///
/// Contains all configuration sections for the Coursegate webhook receiver.
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Payment configuration (Omise)
    pub payment: PaymentConfig,

    /// LMS configuration (Open edX)
    pub lms: LmsConfig,

    /// Email configuration (Resend)
    pub email: EmailConfig,

    /// Fulfillment task configuration (retries, timeouts)
    #[serde(default)]
    pub fulfillment: FulfillmentConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Merges the YAML file named by `COURSEGATE_CONFIG_FILE`, if set
    /// 3. Reads environment variables with `COURSEGATE` prefix
    /// 4. Uses `__` (double underscore) to separate nested values
    /// 5. Deserializes into typed configuration structs
    ///
    /// Environment variables take precedence over the YAML file. A
    /// `COURSEGATE_CONFIG_FILE` pointing at a missing file is an error.
    ///
    /// # Environment Variable Format
    ///
    /// - `COURSEGATE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `COURSEGATE__DATABASE__URL=...` -> `database.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Ok(path) = std::env::var(CONFIG_FILE_VAR) {
            builder = builder.add_source(config::File::new(&path, config::FileFormat::Yaml));
        }

        let config = builder
            .add_source(
                config::Environment::default()
                    .prefix("COURSEGATE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Performs semantic validation of configuration:
    /// - URL formats
    /// - Pool size constraints
    /// - Required API key prefixes
    /// - Retry and timeout bounds
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.payment.validate()?;
        self.lms.validate()?;
        self.email.validate()?;
        self.fulfillment.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
