//! Error types for MercadoPago webhook handling.
//!
//! Status codes drive the sender's retry policy: MercadoPago redelivers the
//! notification on any non-2xx response, so transient failures map to 500 on
//! purpose while permanently-rejected events map to 4xx.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Server has no webhook secret configured; events cannot be verified.
    #[error("Webhook no configurado")]
    MissingSecret,

    /// Webhook signature verification failed or the timestamp was stale.
    #[error("Firma inválida")]
    InvalidSignature,

    /// Failed to parse the webhook payload.
    #[error("Notificación inválida: {0}")]
    ParseError(String),

    /// MercadoPago's payment status API call failed.
    #[error("Error consultando el pago: {0}")]
    Gateway(String),

    /// Database operation failed.
    #[error("Error de base de datos: {0}")]
    Database(String),
}

impl WebhookError {
    /// Maps the error to an HTTP status code.
    ///
    /// - 401: signature failures, discarded permanently
    /// - 400: unparseable payload, resending won't help
    /// - 500: transient failures, sender retries
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,
            WebhookError::ParseError(_) => StatusCode::BAD_REQUEST,
            WebhookError::MissingSecret
            | WebhookError::Gateway(_)
            | WebhookError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns true if MercadoPago should retry delivering this event.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::MissingSecret | WebhookError::Gateway(_) | WebhookError::Database(_)
        )
    }
}
