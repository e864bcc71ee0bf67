//! Payment aggregate: one attempted purchase.
//!
//! A payment is created pending before the checkout preference is requested
//! and only the webhook reconciler moves it to a terminal state. The
//! `external_ref` ties the local row to the MercadoPago checkout session and
//! is immutable once created.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PaymentId, Timestamp, TramiteId, UserId};

/// What is being purchased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentKind {
    /// One-off unlock of a single procedure.
    #[serde(rename = "por_tramite")]
    PorTramite,

    /// Annual all-access subscription.
    #[serde(rename = "suscripcion_anual")]
    SuscripcionAnual,
}

impl PaymentKind {
    /// Database representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentKind::PorTramite => "por_tramite",
            PaymentKind::SuscripcionAnual => "suscripcion_anual",
        }
    }
}

impl std::str::FromStr for PaymentKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "por_tramite" => Ok(PaymentKind::PorTramite),
            "suscripcion_anual" => Ok(PaymentKind::SuscripcionAnual),
            _ => Err(()),
        }
    }
}

/// Lifecycle state of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pendiente,
    Aprobado,
    Rechazado,
    Cancelado,
    EnProceso,
}

impl PaymentStatus {
    /// Database representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pendiente => "pendiente",
            PaymentStatus::Aprobado => "aprobado",
            PaymentStatus::Rechazado => "rechazado",
            PaymentStatus::Cancelado => "cancelado",
            PaymentStatus::EnProceso => "en_proceso",
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Aprobado | PaymentStatus::Rechazado | PaymentStatus::Cancelado
        )
    }
}

/// A payment row about to be inserted, status always pending.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub user_id: UserId,
    pub tramite_id: Option<TramiteId>,
    pub tramite_slug: Option<String>,
    pub kind: PaymentKind,
    pub monto_centavos: i64,
    pub external_ref: String,
    pub metadata: HashMap<String, String>,
}

impl NewPayment {
    /// Builds the pending payment for a purchase attempt.
    ///
    /// The external reference is `{user_id}-{epoch_millis}`, unique per
    /// attempt and embedded into the checkout preference so the webhook can
    /// correlate back to this row.
    pub fn new(
        user_id: UserId,
        kind: PaymentKind,
        tramite_id: Option<TramiteId>,
        tramite_slug: Option<String>,
        monto_centavos: i64,
        now: Timestamp,
    ) -> Self {
        let external_ref = format!("{}-{}", user_id, now.as_unix_millis());
        Self {
            user_id,
            tramite_id,
            tramite_slug,
            kind,
            monto_centavos,
            external_ref,
            metadata: HashMap::new(),
        }
    }
}

/// The slice of a payment row returned by a terminal-status update.
///
/// Carries exactly what the reconciler needs to apply side effects: who paid,
/// for what, and under which kind.
#[derive(Debug, Clone)]
pub struct SettledPayment {
    pub id: PaymentId,
    pub user_id: UserId,
    pub tramite_id: Option<TramiteId>,
    pub kind: PaymentKind,
}
