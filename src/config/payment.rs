//! Payment gateway configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Payment configuration (Midtrans)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Midtrans server key, used for Snap API auth and webhook signatures
    pub server_key: SecretString,

    /// Midtrans client key, exposed to the frontend Snap widget
    pub client_key: Option<String>,

    /// Snap API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Snap API request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl PaymentConfig {
    /// Check if using a sandbox server key
    pub fn is_sandbox(&self) -> bool {
        self.server_key.expose_secret().starts_with("SB-Mid-server-")
    }

    /// Validate payment configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let key = self.server_key.expose_secret();
        if key.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__SERVER_KEY"));
        }
        if !key.starts_with("SB-Mid-server-") && !key.starts_with("Mid-server-") {
            return Err(ValidationError::InvalidServerKey);
        }
        if !self.base_url.starts_with("https://") {
            return Err(ValidationError::BaseUrlMustBeHttps);
        }
        if *environment == Environment::Production && self.is_sandbox() {
            return Err(ValidationError::SandboxKeyInProduction);
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            server_key: SecretString::new(String::new()),
            client_key: None,
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://app.sandbox.midtrans.com".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key(key: &str) -> PaymentConfig {
        PaymentConfig {
            server_key: SecretString::new(key.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_is_sandbox() {
        assert!(config_with_key("SB-Mid-server-xxx").is_sandbox());
        assert!(!config_with_key("Mid-server-xxx").is_sandbox());
    }

    #[test]
    fn test_validation_missing_key() {
        let config = PaymentConfig::default();
        assert!(config.validate(&Environment::Development).is_err());
    }

    #[test]
    fn test_validation_invalid_key_prefix() {
        let config = config_with_key("sk_test_xxx");
        assert!(config.validate(&Environment::Development).is_err());
    }

    #[test]
    fn test_validation_http_base_url() {
        let config = PaymentConfig {
            base_url: "http://app.sandbox.midtrans.com".to_string(),
            ..config_with_key("SB-Mid-server-xxx")
        };
        assert!(config.validate(&Environment::Development).is_err());
    }

    #[test]
    fn test_validation_sandbox_key_in_production() {
        let config = config_with_key("SB-Mid-server-xxx");
        assert!(config.validate(&Environment::Production).is_err());
        assert!(config.validate(&Environment::Development).is_ok());
    }

    #[test]
    fn test_validation_live_key_in_production() {
        let config = config_with_key("Mid-server-xxx");
        assert!(config.validate(&Environment::Production).is_ok());
    }
}
