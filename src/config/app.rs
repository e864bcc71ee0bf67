//! Application-level configuration

use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Application configuration (public URLs)
#[derive(Debug, Clone, Deserialize)]
pub struct AppUrlConfig {
    /// Public base URL of the site, used to build checkout redirect URLs
    /// and the webhook notification URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl AppUrlConfig {
    /// Validate application URL configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if *environment == Environment::Production && !self.base_url.starts_with("https://") {
            return Err(ValidationError::BaseUrlMustBeHttps);
        }
        Ok(())
    }

    /// Base URL with any trailing slash removed
    pub fn base_url_trimmed(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl Default for AppUrlConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}
