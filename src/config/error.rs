//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid server bind address")]
    InvalidBindAddress,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Database pool size out of bounds")]
    InvalidPoolSize,

    #[error("Invalid MercadoPago access token format")]
    InvalidMercadoPagoToken,

    #[error("Invalid MercadoPago API base URL")]
    InvalidMercadoPagoUrl,

    #[error("Base URL must be absolute (http:// or https://)")]
    InvalidBaseUrl,

    #[error("Base URL must use HTTPS in production")]
    BaseUrlMustBeHttps,
}
