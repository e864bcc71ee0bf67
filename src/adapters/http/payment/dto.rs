//! HTTP DTOs (Data Transfer Objects) for payment endpoints.
//!
//! These types define the JSON request/response structure for the payment API.
//! Field names are camelCase to match the web client.
//!
//! Request fields deserialize as plain strings so every schema violation goes
//! through `validate()` and comes back as a 400 with field-level messages,
//! never as a framework rejection leaking serde internals.

use serde::{Deserialize, Serialize};

use crate::domain::payment::PaymentKind;

/// Maximum accepted slug length.
const MAX_SLUG_LEN: usize = 100;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to create a payment and checkout preference.
#[derive(Debug, Clone, Deserialize)]
pub struct CrearPagoRequest {
    /// What is being purchased: `por_tramite` or `suscripcion_anual`.
    #[serde(rename = "tipoPlan", default)]
    pub tipo_plan: Option<String>,

    /// Slug of the procedure to unlock. Required meaning only for
    /// per-procedure purchases.
    #[serde(rename = "tramiteSlug", default)]
    pub tramite_slug: Option<String>,
}

impl CrearPagoRequest {
    /// Validates the request, returning the parsed plan kind or field-level
    /// messages on failure.
    ///
    /// Slugs are restricted to lowercase alphanumerics and hyphens, at most
    /// 100 characters, matching the public URL scheme.
    pub fn validate(&self) -> Result<PaymentKind, Vec<String>> {
        let mut detalles = Vec::new();

        let kind = match self.tipo_plan.as_deref() {
            None => {
                detalles.push("tipoPlan: es requerido".to_string());
                None
            }
            Some(raw) => match raw.parse::<PaymentKind>() {
                Ok(kind) => Some(kind),
                Err(()) => {
                    detalles.push(
                        "tipoPlan: debe ser por_tramite o suscripcion_anual".to_string(),
                    );
                    None
                }
            },
        };

        if let Some(slug) = &self.tramite_slug {
            if slug.is_empty() || slug.len() > MAX_SLUG_LEN {
                detalles.push(format!(
                    "tramiteSlug: debe tener entre 1 y {} caracteres",
                    MAX_SLUG_LEN
                ));
            } else if !slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            {
                detalles
                    .push("tramiteSlug: solo minúsculas, dígitos y guiones".to_string());
            }
        }

        match (kind, detalles.is_empty()) {
            (Some(kind), true) => Ok(kind),
            _ => Err(detalles),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response for a created payment.
#[derive(Debug, Clone, Serialize)]
pub struct CrearPagoResponse {
    /// Processor-assigned preference id.
    #[serde(rename = "preferenceId")]
    pub preference_id: String,

    /// Hosted checkout URL to redirect the buyer to.
    #[serde(rename = "initPoint")]
    pub init_point: String,
}

/// Acknowledgement body for processed webhooks.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAckResponse {
    pub ok: bool,
}

/// Error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,

    /// Field-level validation messages, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detalles: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detalles: None,
        }
    }

    pub fn with_detalles(error: impl Into<String>, detalles: Vec<String>) -> Self {
        Self {
            error: error.into(),
            detalles: Some(detalles),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(tipo_plan: Option<&str>, tramite_slug: Option<&str>) -> CrearPagoRequest {
        CrearPagoRequest {
            tipo_plan: tipo_plan.map(str::to_string),
            tramite_slug: tramite_slug.map(str::to_string),
        }
    }

    #[test]
    fn request_deserializes_camel_case_fields() {
        let json = r#"{"tipoPlan":"por_tramite","tramiteSlug":"rfc-primera-vez"}"#;
        let parsed: CrearPagoRequest = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.validate(), Ok(PaymentKind::PorTramite));
        assert_eq!(parsed.tramite_slug.as_deref(), Some("rfc-primera-vez"));
    }

    #[test]
    fn request_slug_is_optional() {
        let json = r#"{"tipoPlan":"suscripcion_anual"}"#;
        let parsed: CrearPagoRequest = serde_json::from_str(json).unwrap();
        assert!(parsed.tramite_slug.is_none());
        assert_eq!(parsed.validate(), Ok(PaymentKind::SuscripcionAnual));
    }

    #[test]
    fn unknown_plan_deserializes_but_fails_validation() {
        // Unknown variants must survive deserialization so they surface as a
        // 400 with detalles, not a framework-level rejection
        let json = r#"{"tipoPlan":"mensual"}"#;
        let parsed: CrearPagoRequest = serde_json::from_str(json).unwrap();
        let detalles = parsed.validate().unwrap_err();
        assert_eq!(detalles.len(), 1);
        assert!(detalles[0].starts_with("tipoPlan:"));
    }

    #[test]
    fn missing_plan_fails_validation() {
        let json = r#"{"tramiteSlug":"rfc-primera-vez"}"#;
        let parsed: CrearPagoRequest = serde_json::from_str(json).unwrap();
        let detalles = parsed.validate().unwrap_err();
        assert_eq!(detalles, vec!["tipoPlan: es requerido".to_string()]);
    }

    #[test]
    fn validate_accepts_well_formed_slug() {
        let parsed = request(Some("por_tramite"), Some("e-firma-renovacion-2024"));
        assert_eq!(parsed.validate(), Ok(PaymentKind::PorTramite));
    }

    #[test]
    fn validate_rejects_uppercase_and_spaces() {
        for slug in ["RFC", "rfc primera", "rfc_x", "ácento"] {
            let parsed = request(Some("por_tramite"), Some(slug));
            assert!(parsed.validate().is_err(), "slug {:?} should fail", slug);
        }
    }

    #[test]
    fn validate_rejects_overlong_slug() {
        let slug = "a".repeat(101);
        let parsed = request(Some("por_tramite"), Some(&slug));
        assert!(parsed.validate().is_err());
    }

    #[test]
    fn validate_collects_all_field_errors() {
        let parsed = request(Some("mensual"), Some("Not A Slug"));
        let detalles = parsed.validate().unwrap_err();
        assert_eq!(detalles.len(), 2);
    }

    #[test]
    fn error_response_omits_empty_detalles() {
        let json = serde_json::to_string(&ErrorResponse::new("No autorizado")).unwrap();
        assert_eq!(json, r#"{"error":"No autorizado"}"#);
    }
}
