//! MercadoPago configuration

use serde::Deserialize;

use super::error::ValidationError;

/// MercadoPago configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MercadoPagoConfig {
    /// MercadoPago access token (server-side credential)
    pub access_token: String,

    /// Webhook signing secret for the `x-signature` header
    pub webhook_secret: String,

    /// API base URL, overridable for tests
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// HTTP client timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl MercadoPagoConfig {
    /// Check if using sandbox credentials
    pub fn is_sandbox(&self) -> bool {
        self.access_token.starts_with("TEST-")
    }

    /// Validate MercadoPago configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.access_token.is_empty() {
            return Err(ValidationError::MissingRequired("MERCADOPAGO_ACCESS_TOKEN"));
        }
        if self.webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired(
                "MERCADOPAGO_WEBHOOK_SECRET",
            ));
        }

        // Production tokens start with APP_USR-, sandbox tokens with TEST-
        if !self.access_token.starts_with("APP_USR-") && !self.access_token.starts_with("TEST-") {
            return Err(ValidationError::InvalidMercadoPagoToken);
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(ValidationError::InvalidMercadoPagoUrl);
        }

        Ok(())
    }
}

impl Default for MercadoPagoConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            webhook_secret: String::new(),
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.mercadopago.com".to_string()
}

fn default_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_sandbox() {
        let config = MercadoPagoConfig {
            access_token: "TEST-123".to_string(),
            webhook_secret: "secret".to_string(),
            ..Default::default()
        };
        assert!(config.is_sandbox());

        let config = MercadoPagoConfig {
            access_token: "APP_USR-123".to_string(),
            webhook_secret: "secret".to_string(),
            ..Default::default()
        };
        assert!(!config.is_sandbox());
    }

    #[test]
    fn test_validation_missing_access_token() {
        let config = MercadoPagoConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_missing_webhook_secret() {
        let config = MercadoPagoConfig {
            access_token: "TEST-123".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_token_prefix() {
        let config = MercadoPagoConfig {
            access_token: "sk_test_123".to_string(),
            webhook_secret: "secret".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_valid_config() {
        let config = MercadoPagoConfig {
            access_token: "APP_USR-1234567890".to_string(),
            webhook_secret: "whk_secret_value".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.api_base_url, "https://api.mercadopago.com");
        assert_eq!(config.timeout_secs, 10);
    }
}
