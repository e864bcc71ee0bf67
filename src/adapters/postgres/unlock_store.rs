//! PostgreSQL implementation of UnlockStore.
//!
//! The unlock insert leans on the (user_id, tramite_id) uniqueness constraint
//! for idempotency: a violation means the entitlement already exists, which
//! is a success under webhook redelivery.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, TramiteId, UserId};
use crate::ports::{UnlockInsert, UnlockStore};

/// PostgreSQL implementation of the UnlockStore port.
pub struct PostgresUnlockStore {
    pool: PgPool,
}

impl PostgresUnlockStore {
    /// Creates a new PostgresUnlockStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnlockStore for PostgresUnlockStore {
    async fn find_tramite_by_slug(&self, slug: &str) -> Result<Option<TramiteId>, DomainError> {
        let row: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM tramites WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to find tramite: {}", e),
                )
            })?;

        Ok(row.map(|(id,)| TramiteId::from_uuid(id)))
    }

    async fn is_unlocked(
        &self,
        user_id: &UserId,
        tramite_id: TramiteId,
    ) -> Result<bool, DomainError> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM tramites_desbloqueados
            WHERE user_id = $1 AND tramite_id = $2
            "#,
        )
        .bind(user_id.as_str())
        .bind(tramite_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to check unlock: {}", e),
            )
        })?;

        Ok(row.is_some())
    }

    async fn insert_unlock(
        &self,
        user_id: &UserId,
        tramite_id: TramiteId,
        payment_id: PaymentId,
    ) -> Result<UnlockInsert, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO tramites_desbloqueados (user_id, tramite_id, pago_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id.as_str())
        .bind(tramite_id.as_uuid())
        .bind(payment_id.as_uuid())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(UnlockInsert::Inserted),
            Err(e) => {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.constraint()
                        == Some("tramites_desbloqueados_user_id_tramite_id_key")
                    {
                        return Ok(UnlockInsert::AlreadyExists);
                    }
                }
                Err(DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to insert unlock: {}", e),
                ))
            }
        }
    }
}
