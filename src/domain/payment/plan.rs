//! Plan catalog and pricing.
//!
//! Prices are fixed configuration constants in MXN centavos, not computed.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Price of unlocking a single procedure: $59 MXN.
pub const PRECIO_POR_TRAMITE_CENTAVOS: i64 = 59 * 100;

/// Price of the annual all-access plan: $349 MXN.
pub const PRECIO_ANUAL_CENTAVOS: i64 = 349 * 100;

/// Plan tier stored on a user's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    /// No paid access.
    Gratis,
    /// Paid for individual procedures only.
    PorTramite,
    /// Annual all-access subscription.
    Anual,
}

impl PlanTier {
    /// Database representation of the tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Gratis => "gratis",
            PlanTier::PorTramite => "por_tramite",
            PlanTier::Anual => "anual",
        }
    }
}

/// Plan state as stored on a user's profile: the tier plus its expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstadoPlan {
    pub tier: PlanTier,
    pub vence_en: Option<Timestamp>,
}

impl EstadoPlan {
    /// Whether the plan grants paid access at `now`.
    ///
    /// Per-procedure purchases never expire; the annual plan is active only
    /// up to its expiry. An annual tier with no expiry recorded is treated
    /// as expired.
    pub fn esta_activo(&self, now: Timestamp) -> bool {
        match self.tier {
            PlanTier::Gratis => false,
            PlanTier::PorTramite => true,
            PlanTier::Anual => self.vence_en.map_or(false, |v| v.is_after(&now)),
        }
    }
}

/// A purchasable plan: display data plus the price charged at checkout.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub id: &'static str,
    pub nombre: &'static str,
    pub precio_centavos: i64,
    pub descripcion: &'static str,
}

/// The per-procedure plan.
pub const PLAN_POR_TRAMITE: Plan = Plan {
    id: "por_tramite",
    nombre: "Solo este trámite",
    precio_centavos: PRECIO_POR_TRAMITE_CENTAVOS,
    descripcion: "Acceso permanente a la guía de este trámite.",
};

/// The annual all-access plan.
pub const PLAN_ANUAL: Plan = Plan {
    id: "suscripcion_anual",
    nombre: "Acceso anual completo",
    precio_centavos: PRECIO_ANUAL_CENTAVOS,
    descripcion: "Acceso a todos los trámites durante un año.",
};
