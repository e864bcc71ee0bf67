//! MercadoPago REST client.
//!
//! Implements the `CheckoutGateway` trait against the MercadoPago API.
//! Two endpoints are used:
//!
//! - `POST /checkout/preferences` to create a hosted checkout preference
//! - `GET /v1/payments/{id}` to fetch the authoritative state of a payment
//!
//! The access token is server-side only and handled via `secrecy::SecretString`.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::config::MercadoPagoConfig;
use crate::ports::{
    CheckoutGateway, CheckoutPreference, GatewayError, GatewayPayment, PreferenceRequest,
};

/// MercadoPago client configuration.
#[derive(Clone)]
pub struct MercadoPagoClientConfig {
    /// Access token (APP_USR-... or TEST-...).
    access_token: SecretString,

    /// Base URL for the MercadoPago API.
    api_base_url: String,

    /// Request timeout.
    timeout: Duration,
}

impl MercadoPagoClientConfig {
    /// Create a new client configuration.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            api_base_url: "https://api.mercadopago.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Create configuration from the application config section.
    pub fn from_config(config: &MercadoPagoConfig) -> Self {
        Self {
            access_token: SecretString::new(config.access_token.clone()),
            api_base_url: config.api_base_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// MercadoPago API client implementing `CheckoutGateway`.
pub struct MercadoPagoClient {
    config: MercadoPagoClientConfig,
    http_client: reqwest::Client,
}

/// Wire shape for `POST /checkout/preferences`.
#[derive(Debug, Serialize)]
struct PreferenceBody {
    items: Vec<PreferenceItem>,
    external_reference: String,
    back_urls: crate::ports::BackUrls,
    auto_return: &'static str,
    notification_url: String,
}

#[derive(Debug, Serialize)]
struct PreferenceItem {
    title: String,
    quantity: u32,
    unit_price: f64,
    currency_id: &'static str,
}

impl MercadoPagoClient {
    /// Create a new client with the given configuration.
    pub fn new(config: MercadoPagoClientConfig) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn preference_body(request: PreferenceRequest) -> PreferenceBody {
        PreferenceBody {
            items: vec![PreferenceItem {
                title: request.title,
                quantity: 1,
                unit_price: request.unit_price,
                currency_id: "MXN",
            }],
            external_reference: request.external_reference,
            back_urls: request.back_urls,
            auto_return: "approved",
            notification_url: request.notification_url,
        }
    }
}

#[async_trait]
impl CheckoutGateway for MercadoPagoClient {
    async fn create_preference(
        &self,
        request: PreferenceRequest,
    ) -> Result<CheckoutPreference, GatewayError> {
        let url = format!("{}/checkout/preferences", self.config.api_base_url);
        let body = Self::preference_body(request);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.config.access_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %error_text, "mp_crear_preferencia_fallo");
            return Err(GatewayError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<CheckoutPreference>()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }

    async fn get_payment(&self, mp_payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        let url = format!("{}/v1/payments/{}", self.config.api_base_url, mp_payment_id);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(self.config.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                mp_payment_id,
                error = %error_text,
                "mp_consultar_pago_fallo"
            );
            return Err(GatewayError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<GatewayPayment>()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::BackUrls;

    fn sample_request() -> PreferenceRequest {
        PreferenceRequest {
            title: "TrámiteSAT — rfc-primera-vez".to_string(),
            unit_price: 59.0,
            external_reference: "user-1-1700000000000".to_string(),
            back_urls: BackUrls {
                success: "https://tramitesat.mx/tramite/rfc-primera-vez/documentos?pago=exitoso"
                    .to_string(),
                failure: "https://tramitesat.mx/tramite/rfc-primera-vez/documentos?pago=fallido"
                    .to_string(),
                pending: "https://tramitesat.mx/tramite/rfc-primera-vez/documentos?pago=pendiente"
                    .to_string(),
            },
            notification_url: "https://tramitesat.mx/api/pagos/webhook".to_string(),
        }
    }

    #[test]
    fn preference_body_has_expected_wire_shape() {
        let body = MercadoPagoClient::preference_body(sample_request());
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["items"][0]["title"], "TrámiteSAT — rfc-primera-vez");
        assert_eq!(json["items"][0]["quantity"], 1);
        assert_eq!(json["items"][0]["unit_price"], 59.0);
        assert_eq!(json["items"][0]["currency_id"], "MXN");
        assert_eq!(json["external_reference"], "user-1-1700000000000");
        assert_eq!(json["auto_return"], "approved");
        assert_eq!(
            json["notification_url"],
            "https://tramitesat.mx/api/pagos/webhook"
        );
        assert!(json["back_urls"]["success"]
            .as_str()
            .unwrap()
            .ends_with("pago=exitoso"));
    }

    #[test]
    fn client_config_defaults_to_production_api() {
        let config = MercadoPagoClientConfig::new("TEST-123");
        assert_eq!(config.api_base_url, "https://api.mercadopago.com");

        let config = config.with_base_url("http://localhost:9000");
        assert_eq!(config.api_base_url, "http://localhost:9000");
    }

    #[test]
    fn client_builds_from_app_config() {
        let section = MercadoPagoConfig {
            access_token: "APP_USR-1".to_string(),
            webhook_secret: "whk".to_string(),
            api_base_url: "http://localhost:9000".to_string(),
            timeout_secs: 5,
        };
        let config = MercadoPagoClientConfig::from_config(&section);
        assert_eq!(config.api_base_url, "http://localhost:9000");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(MercadoPagoClient::new(config).is_ok());
    }
}
