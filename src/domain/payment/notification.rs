//! Inbound webhook notification payload.
//!
//! The notification body is only trusted to the extent of naming the payment
//! to re-query. The authoritative status always comes from MercadoPago's
//! payments API, never from this payload: the signature proves origin, not
//! current truth.

use serde::Deserialize;

use super::webhook_errors::WebhookError;

/// A MercadoPago webhook notification: `{"type": ..., "data": {"id": ...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookNotification {
    /// Event category; only `payment` events are processed.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Event data carrying the MercadoPago payment id.
    pub data: NotificationData,
}

/// The `data` object of a notification.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationData {
    /// MercadoPago's payment id, used to re-query the authoritative status.
    pub id: String,
}

impl WebhookNotification {
    /// Parses a raw notification body.
    pub fn parse(body: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(body).map_err(|e| WebhookError::ParseError(e.to_string()))
    }

    /// Whether this notification concerns a payment.
    pub fn is_payment(&self) -> bool {
        self.event_type == "payment"
    }
}
