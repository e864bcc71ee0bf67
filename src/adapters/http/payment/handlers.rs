//! HTTP handlers for payment endpoints.
//!
//! These handlers connect Axum routes to application layer command handlers.
//! The webhook endpoint is unauthenticated by design; its events are
//! verified by signature instead.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use secrecy::SecretString;

use crate::application::handlers::payment::{
    CreatePaymentCommand, CreatePaymentHandler, ProcessWebhookCommand, ProcessWebhookHandler,
    RedirectUrls,
};
use crate::domain::foundation::UserId;
use crate::domain::payment::PaymentFlowError;
use crate::ports::{CheckoutGateway, PaymentStore, ProfileStore, UnlockStore};

use super::dto::{CrearPagoRequest, CrearPagoResponse, ErrorResponse, WebhookAckResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// This struct is cloned for each request and contains Arc-wrapped dependencies
/// for efficient sharing across handlers.
#[derive(Clone)]
pub struct PaymentAppState {
    pub payments: Arc<dyn PaymentStore>,
    pub unlocks: Arc<dyn UnlockStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub gateway: Arc<dyn CheckoutGateway>,
    pub webhook_secret: SecretString,
    pub urls: RedirectUrls,
}

impl PaymentAppState {
    /// Create handlers on demand from the shared state.
    pub fn create_payment_handler(&self) -> CreatePaymentHandler {
        CreatePaymentHandler::new(
            self.payments.clone(),
            self.unlocks.clone(),
            self.gateway.clone(),
            self.urls.clone(),
        )
    }

    pub fn webhook_handler(&self) -> ProcessWebhookHandler {
        ProcessWebhookHandler::new(
            self.payments.clone(),
            self.unlocks.clone(),
            self.profiles.clone(),
            self.gateway.clone(),
            self.webhook_secret.clone(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// User Context (would come from auth middleware in production)
// ════════════════════════════════════════════════════════════════════════════════

/// Authenticated user context extracted from request.
///
/// Session validation is delegated to the fronting auth layer, which forwards
/// the verified identity in the `X-User-Id` header.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> Response {
        let error = ErrorResponse::new("No autorizado");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let user_id = parts
                .headers
                .get("X-User-Id")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| UserId::new(s).ok())
                .ok_or(AuthenticationRequired)?;

            Ok(AuthenticatedUser { user_id })
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/pagos/crear - Create a payment and checkout preference
pub async fn crear_pago(
    State(state): State<PaymentAppState>,
    user: AuthenticatedUser,
    Json(request): Json<CrearPagoRequest>,
) -> Result<Response, PaymentApiError> {
    let kind = match request.validate() {
        Ok(kind) => kind,
        Err(detalles) => {
            let body = ErrorResponse::with_detalles("Datos inválidos", detalles);
            return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
        }
    };

    let handler = state.create_payment_handler();
    let cmd = CreatePaymentCommand {
        user_id: user.user_id,
        kind,
        tramite_slug: request.tramite_slug,
    };

    let result = handler.handle(cmd).await?;

    let response = CrearPagoResponse {
        preference_id: result.preference_id,
        init_point: result.init_point,
    };

    Ok(Json(response).into_response())
}

/// POST /api/pagos/webhook - Handle MercadoPago payment notifications
///
/// Any 2xx stops redelivery; non-2xx statuses are the retry mechanism, so
/// only genuinely transient failures map to 500.
pub async fn webhook_pago(
    State(state): State<PaymentAppState>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> Response {
    // Missing headers verify as empty strings and fail the signature check
    let signature = headers
        .get("x-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let handler = state.webhook_handler();
    let cmd = ProcessWebhookCommand {
        payload: body.to_vec(),
        signature,
        request_id,
    };

    match handler.handle(cmd).await {
        Ok(_) => (StatusCode::OK, Json(WebhookAckResponse { ok: true })).into_response(),
        Err(e) => {
            let body = ErrorResponse::new(e.to_string());
            (e.status_code(), Json(body)).into_response()
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts payment flow errors to HTTP responses.
#[derive(Debug)]
pub struct PaymentApiError(PaymentFlowError);

impl From<PaymentFlowError> for PaymentApiError {
    fn from(err: PaymentFlowError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            PaymentFlowError::AlreadyUnlocked { .. } => {
                (StatusCode::CONFLICT, self.0.to_string())
            }
            PaymentFlowError::Gateway(_) | PaymentFlowError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "No se pudo iniciar el pago".to_string(),
            ),
        };

        let body = ErrorResponse::new(message);
        (status, Json(body)).into_response()
    }
}
