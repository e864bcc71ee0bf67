//! Payment domain: purchase attempts, plan catalog, and webhook verification.

mod errors;
mod notification;
mod payment;
mod plan;
mod webhook_errors;
mod webhook_verifier;

pub use errors::PaymentFlowError;
pub use notification::WebhookNotification;
pub use payment::{NewPayment, PaymentKind, PaymentStatus, SettledPayment};
pub use plan::{
    EstadoPlan, Plan, PlanTier, PLAN_ANUAL, PLAN_POR_TRAMITE, PRECIO_ANUAL_CENTAVOS,
    PRECIO_POR_TRAMITE_CENTAVOS,
};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::WebhookSignatureVerifier;

#[cfg(test)]
pub use webhook_verifier::compute_test_signature;
