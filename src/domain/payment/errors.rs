//! Errors for the payment creation flow.

use thiserror::Error;

use crate::domain::foundation::DomainError;

/// Errors surfaced by the payment intent creator.
#[derive(Debug, Error)]
pub enum PaymentFlowError {
    /// The user already has access to the requested procedure.
    ///
    /// Terminal: creating a second payment would double-charge.
    #[error("Ya tienes acceso a este trámite")]
    AlreadyUnlocked { slug: String },

    /// Checkout preference creation failed at the processor.
    #[error("Fallo del procesador de pagos: {0}")]
    Gateway(String),

    /// Datastore failure.
    #[error("Fallo de almacenamiento: {0}")]
    Store(String),
}

impl From<DomainError> for PaymentFlowError {
    fn from(err: DomainError) -> Self {
        PaymentFlowError::Store(err.to_string())
    }
}
