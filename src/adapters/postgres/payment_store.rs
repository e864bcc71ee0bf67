//! PostgreSQL implementation of PaymentStore.
//!
//! Terminal-status updates are a single atomic UPDATE filtered on
//! non-terminal states, which makes webhook redelivery and out-of-order
//! callbacks safe: a row settles exactly once and never leaves a terminal
//! state.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, TramiteId, UserId};
use crate::domain::payment::{NewPayment, PaymentKind, PaymentStatus, SettledPayment};
use crate::ports::PaymentStore;

/// PostgreSQL implementation of the PaymentStore port.
pub struct PostgresPaymentStore {
    pool: PgPool,
}

impl PostgresPaymentStore {
    /// Creates a new PostgresPaymentStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row slice returned by the terminal-status update.
#[derive(Debug, sqlx::FromRow)]
struct SettledRow {
    id: Uuid,
    user_id: String,
    tramite_id: Option<Uuid>,
    tipo_plan: String,
}

impl TryFrom<SettledRow> for SettledPayment {
    type Error = DomainError;

    fn try_from(row: SettledRow) -> Result<Self, Self::Error> {
        Ok(SettledPayment {
            id: PaymentId::from_uuid(row.id),
            user_id: UserId::new(row.user_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
            })?,
            tramite_id: row.tramite_id.map(TramiteId::from_uuid),
            kind: parse_kind(&row.tipo_plan)?,
        })
    }
}

fn parse_kind(s: &str) -> Result<PaymentKind, DomainError> {
    s.parse().map_err(|()| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid tipo_plan value: {}", s),
        )
    })
}

#[async_trait]
impl PaymentStore for PostgresPaymentStore {
    async fn insert(&self, payment: NewPayment) -> Result<PaymentId, DomainError> {
        let id = PaymentId::new();
        let metadata = serde_json::to_value(&payment.metadata).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to serialize metadata: {}", e),
            )
        })?;

        sqlx::query(
            r#"
            INSERT INTO pagos (
                id, user_id, tramite_id, tramite_slug, tipo_plan, monto_centavos,
                estado, mp_external_ref, metadata
            ) VALUES ($1, $2, $3, $4, $5, $6, 'pendiente', $7, $8)
            "#,
        )
        .bind(id.as_uuid())
        .bind(payment.user_id.as_str())
        .bind(payment.tramite_id.map(|t| *t.as_uuid()))
        .bind(&payment.tramite_slug)
        .bind(payment.kind.as_str())
        .bind(payment.monto_centavos)
        .bind(&payment.external_ref)
        .bind(metadata)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert payment: {}", e),
            )
        })?;

        Ok(id)
    }

    async fn attach_preference_id(
        &self,
        id: PaymentId,
        preference_id: &str,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE pagos SET mp_preference_id = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(preference_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to attach preference id: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::PaymentNotFound,
                "Payment not found",
            ));
        }

        Ok(())
    }

    async fn mark_terminal(
        &self,
        external_ref: &str,
        status: PaymentStatus,
        mp_payment_id: Option<&str>,
    ) -> Result<Option<SettledPayment>, DomainError> {
        // Monotonic: only non-terminal rows match, so redelivery and
        // transitions out of a terminal state affect zero rows
        let row: Option<SettledRow> = sqlx::query_as(
            r#"
            UPDATE pagos
            SET estado = $2,
                mp_payment_id = COALESCE($3, mp_payment_id),
                updated_at = now()
            WHERE mp_external_ref = $1
              AND estado IN ('pendiente', 'en_proceso')
            RETURNING id, user_id, tramite_id, tipo_plan
            "#,
        )
        .bind(external_ref)
        .bind(status.as_str())
        .bind(mp_payment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to mark payment terminal: {}", e),
            )
        })?;

        row.map(SettledPayment::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_kind_works_for_all_values() {
        assert_eq!(parse_kind("por_tramite").unwrap(), PaymentKind::PorTramite);
        assert_eq!(
            parse_kind("suscripcion_anual").unwrap(),
            PaymentKind::SuscripcionAnual
        );
    }

    #[test]
    fn parse_kind_rejects_invalid_values() {
        assert!(parse_kind("mensual").is_err());
        assert!(parse_kind("").is_err());
    }

    #[test]
    fn settled_row_converts_to_domain() {
        let row = SettledRow {
            id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            tramite_id: Some(Uuid::new_v4()),
            tipo_plan: "por_tramite".to_string(),
        };
        let settled = SettledPayment::try_from(row).unwrap();
        assert_eq!(settled.kind, PaymentKind::PorTramite);
        assert!(settled.tramite_id.is_some());
    }

    #[test]
    fn settled_row_rejects_unknown_plan() {
        let row = SettledRow {
            id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            tramite_id: None,
            tipo_plan: "semanal".to_string(),
        };
        assert!(SettledPayment::try_from(row).is_err());
    }
}
