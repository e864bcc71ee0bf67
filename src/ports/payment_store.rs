//! Payment store port.
//!
//! Writes go through service-level credentials: the pending payment row is
//! what later authorizes access, so its creation must bypass per-user row
//! restrictions.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PaymentId};
use crate::domain::payment::{NewPayment, PaymentStatus, SettledPayment};

/// Persistence operations for payment rows.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Inserts a pending payment and returns its id.
    async fn insert(&self, payment: NewPayment) -> Result<PaymentId, DomainError>;

    /// Attaches the processor-assigned preference id to a payment.
    ///
    /// Best-effort from the caller's perspective: the webhook correlates by
    /// external reference, not by preference id.
    async fn attach_preference_id(
        &self,
        id: PaymentId,
        preference_id: &str,
    ) -> Result<(), DomainError>;

    /// Atomically moves the payment identified by `external_ref` to a
    /// terminal status and records the processor's payment id.
    ///
    /// The update only matches rows whose current status is non-terminal, so
    /// transitions out of approved/rejected/cancelled are rejected and a
    /// redelivered callback is a no-op. Returns `None` when no row matched
    /// (unknown or already-reconciled payment).
    async fn mark_terminal(
        &self,
        external_ref: &str,
        status: PaymentStatus,
        mp_payment_id: Option<&str>,
    ) -> Result<Option<SettledPayment>, DomainError>;
}
