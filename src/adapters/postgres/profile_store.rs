//! PostgreSQL implementation of ProfileStore.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::payment::PlanTier;
use crate::ports::ProfileStore;

/// PostgreSQL implementation of the ProfileStore port.
pub struct PostgresProfileStore {
    pool: PgPool,
}

impl PostgresProfileStore {
    /// Creates a new PostgresProfileStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PostgresProfileStore {
    async fn update_plan(
        &self,
        user_id: &UserId,
        plan: PlanTier,
        vence_en: Option<Timestamp>,
    ) -> Result<(), DomainError> {
        // Upsert: the profile row may not exist yet for a first purchase
        sqlx::query(
            r#"
            INSERT INTO perfiles (user_id, plan, plan_vence_en, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (user_id)
            DO UPDATE SET plan = $2, plan_vence_en = $3, updated_at = now()
            "#,
        )
        .bind(user_id.as_str())
        .bind(plan.as_str())
        .bind(vence_en.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update plan: {}", e),
            )
        })?;

        Ok(())
    }
}
