//! Checkout gateway port for the external payment processor.
//!
//! Two operations matter to this system: creating a hosted checkout
//! preference, and re-querying the authoritative status of a settled
//! payment. The reconciler never trusts a webhook body for status; it always
//! re-fetches through this port with server-held credentials.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Port for MercadoPago (or compatible) checkout integrations.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Creates a hosted checkout preference.
    ///
    /// Returns the preference id and the URL the buyer is redirected to.
    async fn create_preference(
        &self,
        request: PreferenceRequest,
    ) -> Result<CheckoutPreference, GatewayError>;

    /// Fetches the authoritative state of a payment by the processor's id.
    async fn get_payment(&self, mp_payment_id: &str) -> Result<GatewayPayment, GatewayError>;
}

/// Redirect URLs per checkout outcome.
#[derive(Debug, Clone, Serialize)]
pub struct BackUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

/// Request to create a checkout preference.
#[derive(Debug, Clone)]
pub struct PreferenceRequest {
    /// Human-readable item title shown at checkout.
    pub title: String,

    /// Unit price in MXN (centavos / 100).
    pub unit_price: f64,

    /// Local correlation key embedded as `external_reference`.
    pub external_reference: String,

    /// Redirect URLs per outcome.
    pub back_urls: BackUrls,

    /// Webhook URL the processor notifies.
    pub notification_url: String,
}

/// A created checkout preference.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutPreference {
    /// Processor-assigned preference id.
    pub id: String,

    /// Hosted checkout URL.
    pub init_point: String,
}

/// Authoritative payment state fetched from the processor.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayPayment {
    pub status: GatewayPaymentStatus,
    pub external_reference: String,
    pub transaction_amount: f64,
}

/// Payment status as reported by the processor's API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayPaymentStatus {
    Approved,
    Rejected,
    Cancelled,
    Pending,
    InProcess,
    /// Any status this system does not act on.
    #[serde(other)]
    Other,
}

/// Errors from gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Network failure or timeout talking to the processor.
    #[error("Gateway request failed: {0}")]
    Request(String),

    /// Processor returned a non-success HTTP status.
    #[error("Gateway returned status {status}")]
    Status { status: u16 },

    /// Processor response could not be decoded.
    #[error("Gateway response invalid: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn CheckoutGateway) {}
    }

    #[test]
    fn status_deserializes_known_values() {
        let status: GatewayPaymentStatus = serde_json::from_str("\"approved\"").unwrap();
        assert_eq!(status, GatewayPaymentStatus::Approved);
        let status: GatewayPaymentStatus = serde_json::from_str("\"in_process\"").unwrap();
        assert_eq!(status, GatewayPaymentStatus::InProcess);
    }

    #[test]
    fn status_maps_unknown_values_to_other() {
        let status: GatewayPaymentStatus = serde_json::from_str("\"charged_back\"").unwrap();
        assert_eq!(status, GatewayPaymentStatus::Other);
    }

    #[test]
    fn gateway_payment_deserializes_from_api_shape() {
        let json = r#"{"status":"approved","external_reference":"u1-1700000000000","transaction_amount":59.0,"id":123}"#;
        let payment: GatewayPayment = serde_json::from_str(json).unwrap();
        assert_eq!(payment.status, GatewayPaymentStatus::Approved);
        assert_eq!(payment.external_reference, "u1-1700000000000");
    }
}
