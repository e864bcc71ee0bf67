//! Profile store port: subscription plan state on the user profile.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::payment::PlanTier;

/// Write access to the plan fields of a user profile.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Sets the user's plan and its expiry.
    ///
    /// A deterministic overwrite: applying the same activation twice resets
    /// the expiry rather than extending it, which keeps webhook redelivery
    /// safe.
    async fn update_plan(
        &self,
        user_id: &UserId,
        plan: PlanTier,
        vence_en: Option<Timestamp>,
    ) -> Result<(), DomainError>;
}
