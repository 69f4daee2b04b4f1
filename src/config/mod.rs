//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `SPENDTRACK` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use spendtrack::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr());
//! ```

mod database;
mod error;
mod payment;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Payment configuration (Midtrans)
    pub payment: PaymentConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `SPENDTRACK` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `SPENDTRACK__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `SPENDTRACK__DATABASE__URL=...` -> `database.url = ...`
    /// - `SPENDTRACK__PAYMENT__SERVER_KEY=...` -> `payment.server_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required environment variables are missing
    /// or values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SPENDTRACK")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.payment.validate(&self.server.environment)?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var(
            "SPENDTRACK__DATABASE__URL",
            "postgresql://test@localhost/spendtrack",
        );
        env::set_var("SPENDTRACK__PAYMENT__SERVER_KEY", "SB-Mid-server-xxx");
    }

    fn clear_env() {
        env::remove_var("SPENDTRACK__DATABASE__URL");
        env::remove_var("SPENDTRACK__PAYMENT__SERVER_KEY");
        env::remove_var("SPENDTRACK__SERVER__PORT");
    }

    #[test]
    fn test_load_minimal_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();

        let config = AppConfig::load().unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/spendtrack");
        assert_eq!(config.server.port, 8080);
        assert!(config.validate().is_ok());

        clear_env();
    }

    #[test]
    fn test_load_with_overridden_port() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("SPENDTRACK__SERVER__PORT", "3000");

        let config = AppConfig::load().unwrap();
        assert_eq!(config.server.port, 3000);

        clear_env();
    }

    #[test]
    fn test_missing_database_url_fails_validation() {
        let config = AppConfig {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            payment: PaymentConfig::default(),
        };
        assert!(config.validate().is_err());
    }
}
