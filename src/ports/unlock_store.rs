//! Unlock store port: procedure lookups and entitlement grants.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PaymentId, TramiteId, UserId};

/// Outcome of an unlock insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockInsert {
    /// A new unlock row was created.
    Inserted,
    /// The (user, tramite) pair was already unlocked; treated as success.
    AlreadyExists,
}

/// Read/write operations for procedure unlocks.
#[async_trait]
pub trait UnlockStore: Send + Sync {
    /// Resolves a procedure by its URL slug.
    async fn find_tramite_by_slug(&self, slug: &str) -> Result<Option<TramiteId>, DomainError>;

    /// Whether the user already has access to the procedure.
    async fn is_unlocked(
        &self,
        user_id: &UserId,
        tramite_id: TramiteId,
    ) -> Result<bool, DomainError>;

    /// Grants access to a procedure, recording the originating payment.
    ///
    /// Must be idempotent under webhook redelivery: a uniqueness constraint
    /// on (user, tramite) backs this, and a constraint violation is reported
    /// as `AlreadyExists`, not an error.
    async fn insert_unlock(
        &self,
        user_id: &UserId,
        tramite_id: TramiteId,
        payment_id: PaymentId,
    ) -> Result<UnlockInsert, DomainError>;
}
