//! ProcessWebhookHandler - Reconciles MercadoPago payment callbacks.
//!
//! Callbacks are delivered at least once and may be spoofed or stale, so the
//! handler (1) verifies the signature before touching the payload, (2) only
//! takes the payment id from the body and re-queries MercadoPago for the
//! authoritative status, and (3) applies side effects idempotently: status
//! updates are atomic and monotonic, unlock inserts are backed by a
//! uniqueness constraint, plan activation is a deterministic overwrite.
//!
//! Transient failures return errors that map to 500, which is the mechanism
//! by which the sender's retry policy provides at-least-once processing.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::domain::foundation::Timestamp;
use crate::domain::payment::{
    PaymentKind, PaymentStatus, PlanTier, WebhookError, WebhookNotification,
    WebhookSignatureVerifier,
};
use crate::ports::{
    CheckoutGateway, GatewayPaymentStatus, PaymentStore, ProfileStore, UnlockInsert, UnlockStore,
};

/// Command carrying one raw webhook delivery.
#[derive(Debug, Clone)]
pub struct ProcessWebhookCommand {
    /// Raw request body.
    pub payload: Vec<u8>,
    /// `x-signature` header value.
    pub signature: String,
    /// `x-request-id` header value.
    pub request_id: String,
}

/// What the reconciler did with a verified event. All outcomes map to 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// A terminal status was applied to the payment.
    Applied(PaymentStatus),
    /// Event type is not `payment`; acknowledged without processing.
    NotRelevant,
    /// No pending payment matched the external reference: either unknown to
    /// this system or already reconciled. Acknowledged to stop retries.
    NoMatchingPayment,
    /// Authoritative status is non-terminal; wait for a future callback.
    NoAction,
}

/// Handler reconciling webhook deliveries against the processor and store.
pub struct ProcessWebhookHandler {
    payments: Arc<dyn PaymentStore>,
    unlocks: Arc<dyn UnlockStore>,
    profiles: Arc<dyn ProfileStore>,
    gateway: Arc<dyn CheckoutGateway>,
    webhook_secret: SecretString,
}

impl ProcessWebhookHandler {
    pub fn new(
        payments: Arc<dyn PaymentStore>,
        unlocks: Arc<dyn UnlockStore>,
        profiles: Arc<dyn ProfileStore>,
        gateway: Arc<dyn CheckoutGateway>,
        webhook_secret: SecretString,
    ) -> Self {
        Self {
            payments,
            unlocks,
            profiles,
            gateway,
            webhook_secret,
        }
    }

    pub async fn handle(
        &self,
        cmd: ProcessWebhookCommand,
    ) -> Result<WebhookOutcome, WebhookError> {
        // Never accept unverifiable events
        let secret = self.webhook_secret.expose_secret();
        if secret.is_empty() {
            tracing::error!("webhook_secret_faltante");
            return Err(WebhookError::MissingSecret);
        }

        // 1. Signature gate, always first
        let verifier = WebhookSignatureVerifier::new(secret);
        if !verifier.verify(&cmd.signature, &cmd.request_id) {
            tracing::warn!(request_id = %cmd.request_id, "webhook_firma_invalida");
            return Err(WebhookError::InvalidSignature);
        }

        // 2. Parse, 3. filter to payment events
        let event = WebhookNotification::parse(&cmd.payload)?;
        if !event.is_payment() {
            return Ok(WebhookOutcome::NotRelevant);
        }

        // 4. Re-query the authoritative status; the callback body is not
        //    trusted for anything beyond the payment id
        let mp_payment_id = event.data.id;
        let payment = self
            .gateway
            .get_payment(&mp_payment_id)
            .await
            .map_err(|e| {
                tracing::error!(mp_payment_id = %mp_payment_id, error = %e, "webhook_consulta_mp_fallo");
                WebhookError::Gateway(e.to_string())
            })?;

        // 5. Branch on what MercadoPago says, not on the callback
        match payment.status {
            GatewayPaymentStatus::Approved => {
                self.apply_approved(&payment.external_reference, &mp_payment_id)
                    .await
            }
            GatewayPaymentStatus::Rejected => {
                self.set_terminal(&payment.external_reference, PaymentStatus::Rechazado)
                    .await
            }
            GatewayPaymentStatus::Cancelled => {
                self.set_terminal(&payment.external_reference, PaymentStatus::Cancelado)
                    .await
            }
            GatewayPaymentStatus::Pending
            | GatewayPaymentStatus::InProcess
            | GatewayPaymentStatus::Other => Ok(WebhookOutcome::NoAction),
        }
    }

    /// Applies an approved payment: terminal status, then the entitlement.
    async fn apply_approved(
        &self,
        external_ref: &str,
        mp_payment_id: &str,
    ) -> Result<WebhookOutcome, WebhookError> {
        let settled = self
            .payments
            .mark_terminal(external_ref, PaymentStatus::Aprobado, Some(mp_payment_id))
            .await
            .map_err(|e| WebhookError::Database(e.to_string()))?;

        let Some(settled) = settled else {
            // Unknown to this system, or a redelivery after reconciliation.
            // Acknowledge: erroring here would retry a payment we can never
            // resolve.
            tracing::info!(external_ref, "pago_no_encontrado_o_ya_reconciliado");
            return Ok(WebhookOutcome::NoMatchingPayment);
        };

        match (settled.kind, settled.tramite_id) {
            (PaymentKind::PorTramite, Some(tramite_id)) => {
                let inserted = self
                    .unlocks
                    .insert_unlock(&settled.user_id, tramite_id, settled.id)
                    .await
                    .map_err(|e| WebhookError::Database(e.to_string()))?;

                if inserted == UnlockInsert::AlreadyExists {
                    tracing::info!(
                        user_id = %settled.user_id,
                        tramite_id = %tramite_id,
                        "desbloqueo_ya_existente"
                    );
                }
            }
            (PaymentKind::SuscripcionAnual, _) => {
                // Deterministic overwrite: redelivery resets the expiry to
                // now + 1 year, an accepted approximation
                let vence_en = Timestamp::now().add_one_year();
                self.profiles
                    .update_plan(&settled.user_id, PlanTier::Anual, Some(vence_en))
                    .await
                    .map_err(|e| WebhookError::Database(e.to_string()))?;
            }
            (PaymentKind::PorTramite, None) => {
                // Paid for a tramite that was never resolved to an id;
                // nothing to unlock
                tracing::warn!(payment_id = %settled.id, "pago_aprobado_sin_tramite");
            }
        }

        tracing::info!(
            payment_id = %settled.id,
            user_id = %settled.user_id,
            "pago_aprobado"
        );

        Ok(WebhookOutcome::Applied(PaymentStatus::Aprobado))
    }

    /// Records a rejected or cancelled payment.
    async fn set_terminal(
        &self,
        external_ref: &str,
        status: PaymentStatus,
    ) -> Result<WebhookOutcome, WebhookError> {
        let settled = self
            .payments
            .mark_terminal(external_ref, status, None)
            .await
            .map_err(|e| WebhookError::Database(e.to_string()))?;

        match settled {
            Some(_) => Ok(WebhookOutcome::Applied(status)),
            None => Ok(WebhookOutcome::NoMatchingPayment),
        }
    }
}
