//! In-memory checkout gateway for development and testing.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{
    CheckoutGateway, CheckoutPreference, GatewayError, GatewayPayment, GatewayPaymentStatus,
    PreferenceRequest,
};

/// Mock gateway that records created preferences and serves registered
/// payments. Useful for local development without MercadoPago credentials.
#[derive(Default)]
pub struct MockCheckoutGateway {
    preferences: Mutex<Vec<PreferenceRequest>>,
    payments: Mutex<HashMap<String, GatewayPayment>>,
}

impl MockCheckoutGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a payment to be returned by `get_payment`.
    pub fn register_payment(
        &self,
        mp_payment_id: impl Into<String>,
        status: GatewayPaymentStatus,
        external_reference: impl Into<String>,
        transaction_amount: f64,
    ) {
        self.payments.lock().unwrap().insert(
            mp_payment_id.into(),
            GatewayPayment {
                status,
                external_reference: external_reference.into(),
                transaction_amount,
            },
        );
    }

    /// Number of preferences created so far.
    pub fn preference_count(&self) -> usize {
        self.preferences.lock().unwrap().len()
    }
}

#[async_trait]
impl CheckoutGateway for MockCheckoutGateway {
    async fn create_preference(
        &self,
        request: PreferenceRequest,
    ) -> Result<CheckoutPreference, GatewayError> {
        let mut preferences = self.preferences.lock().unwrap();
        preferences.push(request);
        let id = format!("pref-mock-{}", preferences.len());

        Ok(CheckoutPreference {
            init_point: format!("https://checkout.example.com/{}", id),
            id,
        })
    }

    async fn get_payment(&self, mp_payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        self.payments
            .lock()
            .unwrap()
            .get(mp_payment_id)
            .cloned()
            .ok_or(GatewayError::Status { status: 404 })
    }
}
