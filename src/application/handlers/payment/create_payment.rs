//! CreatePaymentHandler - Command handler for starting a purchase.
//!
//! Creates the pending payment row before the checkout preference is
//! requested. Once that row exists, failures are surfaced but the row is
//! retained: the external session may have partially succeeded, and the row
//! is the anchor for manual reconciliation.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::payment::{
    NewPayment, PaymentFlowError, PaymentKind, PRECIO_ANUAL_CENTAVOS, PRECIO_POR_TRAMITE_CENTAVOS,
};
use crate::ports::{BackUrls, CheckoutGateway, PaymentStore, PreferenceRequest, UnlockStore};

/// Command to create a payment and obtain a checkout session.
#[derive(Debug, Clone)]
pub struct CreatePaymentCommand {
    pub user_id: UserId,
    pub kind: PaymentKind,
    pub tramite_slug: Option<String>,
}

/// Result of a successful creation: what the client needs to redirect.
#[derive(Debug, Clone)]
pub struct CreatePaymentResult {
    pub preference_id: String,
    pub init_point: String,
}

/// Application base URL used to build redirect and notification URLs.
#[derive(Debug, Clone)]
pub struct RedirectUrls {
    base_url: String,
}

impl RedirectUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Post-checkout redirect targets, parameterized by procedure slug.
    fn back_urls(&self, slug: Option<&str>) -> BackUrls {
        let slug = slug.unwrap_or("");
        BackUrls {
            success: format!("{}/tramite/{}/documentos?pago=exitoso", self.base_url, slug),
            failure: format!("{}/tramite/{}/documentos?pago=fallido", self.base_url, slug),
            pending: format!("{}/tramite/{}/documentos?pago=pendiente", self.base_url, slug),
        }
    }

    /// The webhook endpoint MercadoPago notifies.
    fn notification_url(&self) -> String {
        format!("{}/api/pagos/webhook", self.base_url)
    }
}

/// Handler for creating payments.
pub struct CreatePaymentHandler {
    payments: Arc<dyn PaymentStore>,
    unlocks: Arc<dyn UnlockStore>,
    gateway: Arc<dyn CheckoutGateway>,
    urls: RedirectUrls,
}

impl CreatePaymentHandler {
    pub fn new(
        payments: Arc<dyn PaymentStore>,
        unlocks: Arc<dyn UnlockStore>,
        gateway: Arc<dyn CheckoutGateway>,
        urls: RedirectUrls,
    ) -> Self {
        Self {
            payments,
            unlocks,
            gateway,
            urls,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreatePaymentCommand,
    ) -> Result<CreatePaymentResult, PaymentFlowError> {
        let slug = cmd.tramite_slug.as_deref();

        // 1. Duplicate-purchase guard: never charge twice for the same tramite
        let tramite_id = match (cmd.kind, slug) {
            (PaymentKind::PorTramite, Some(slug)) => {
                let tramite_id = self.unlocks.find_tramite_by_slug(slug).await?;
                if let Some(id) = tramite_id {
                    if self.unlocks.is_unlocked(&cmd.user_id, id).await? {
                        return Err(PaymentFlowError::AlreadyUnlocked {
                            slug: slug.to_string(),
                        });
                    }
                }
                tramite_id
            }
            _ => None,
        };

        // 2. Price from the fixed catalog
        let monto_centavos = match cmd.kind {
            PaymentKind::PorTramite => PRECIO_POR_TRAMITE_CENTAVOS,
            PaymentKind::SuscripcionAnual => PRECIO_ANUAL_CENTAVOS,
        };

        // 3. Pending payment row, created before the external session exists
        let payment = NewPayment::new(
            cmd.user_id.clone(),
            cmd.kind,
            tramite_id,
            slug.map(str::to_string),
            monto_centavos,
            Timestamp::now(),
        );
        let external_ref = payment.external_ref.clone();
        let payment_id = self.payments.insert(payment).await?;

        // 4. Hosted checkout preference
        let title = match cmd.kind {
            PaymentKind::PorTramite => {
                format!("TrámiteSAT — {}", slug.unwrap_or("Trámite"))
            }
            PaymentKind::SuscripcionAnual => "TrámiteSAT — Suscripción Anual".to_string(),
        };

        let preference = self
            .gateway
            .create_preference(PreferenceRequest {
                title,
                unit_price: monto_centavos as f64 / 100.0,
                external_reference: external_ref,
                back_urls: self.urls.back_urls(slug),
                notification_url: self.urls.notification_url(),
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    payment_id = %payment_id,
                    user_id = %cmd.user_id,
                    error = %e,
                    "crear_pago_fallo"
                );
                PaymentFlowError::Gateway(e.to_string())
            })?;

        // 5. Best-effort: the webhook correlates by external_ref, so a missing
        //    preference id never fails the request
        if let Err(e) = self
            .payments
            .attach_preference_id(payment_id, &preference.id)
            .await
        {
            tracing::warn!(
                payment_id = %payment_id,
                preference_id = %preference.id,
                error = %e,
                "preference_id_no_guardado"
            );
        }

        tracing::info!(
            payment_id = %payment_id,
            user_id = %cmd.user_id,
            "preferencia_pago_creada"
        );

        Ok(CreatePaymentResult {
            preference_id: preference.id,
            init_point: preference.init_point,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, PaymentId, TramiteId};
    use crate::ports::{
        CheckoutPreference, GatewayError, GatewayPayment, GatewayPaymentStatus, UnlockInsert,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    // ══════════════════════════════════════════════════════════════
    // Test Infrastructure
    // ══════════════════════════════════════════════════════════════

    struct MockPaymentStore {
        inserted: Mutex<Vec<NewPayment>>,
        preference_ids: Mutex<Vec<(PaymentId, String)>>,
        fail_attach: bool,
    }

    impl MockPaymentStore {
        fn new() -> Self {
            Self {
                inserted: Mutex::new(Vec::new()),
                preference_ids: Mutex::new(Vec::new()),
                fail_attach: false,
            }
        }

        fn failing_attach() -> Self {
            Self {
                fail_attach: true,
                ..Self::new()
            }
        }

        fn insert_count(&self) -> usize {
            self.inserted.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PaymentStore for MockPaymentStore {
        async fn insert(&self, payment: NewPayment) -> Result<PaymentId, DomainError> {
            self.inserted.lock().unwrap().push(payment);
            Ok(PaymentId::new())
        }

        async fn attach_preference_id(
            &self,
            id: PaymentId,
            preference_id: &str,
        ) -> Result<(), DomainError> {
            if self.fail_attach {
                return Err(DomainError::database("write failed"));
            }
            self.preference_ids
                .lock()
                .unwrap()
                .push((id, preference_id.to_string()));
            Ok(())
        }

        async fn mark_terminal(
            &self,
            _external_ref: &str,
            _status: crate::domain::payment::PaymentStatus,
            _mp_payment_id: Option<&str>,
        ) -> Result<Option<crate::domain::payment::SettledPayment>, DomainError> {
            Ok(None)
        }
    }

    struct MockUnlockStore {
        tramite: Option<TramiteId>,
        unlocked: bool,
    }

    #[async_trait]
    impl UnlockStore for MockUnlockStore {
        async fn find_tramite_by_slug(
            &self,
            _slug: &str,
        ) -> Result<Option<TramiteId>, DomainError> {
            Ok(self.tramite)
        }

        async fn is_unlocked(
            &self,
            _user_id: &UserId,
            _tramite_id: TramiteId,
        ) -> Result<bool, DomainError> {
            Ok(self.unlocked)
        }

        async fn insert_unlock(
            &self,
            _user_id: &UserId,
            _tramite_id: TramiteId,
            _payment_id: PaymentId,
        ) -> Result<UnlockInsert, DomainError> {
            Ok(UnlockInsert::Inserted)
        }
    }

    struct MockGateway {
        requests: Mutex<Vec<PreferenceRequest>>,
        fail: bool,
    }

    impl MockGateway {
        fn new() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl CheckoutGateway for MockGateway {
        async fn create_preference(
            &self,
            request: PreferenceRequest,
        ) -> Result<CheckoutPreference, GatewayError> {
            if self.fail {
                return Err(GatewayError::Status { status: 502 });
            }
            self.requests.lock().unwrap().push(request);
            Ok(CheckoutPreference {
                id: "pref-123".to_string(),
                init_point: "https://mercadopago.com.mx/checkout/pref-123".to_string(),
            })
        }

        async fn get_payment(&self, _mp_payment_id: &str) -> Result<GatewayPayment, GatewayError> {
            Ok(GatewayPayment {
                status: GatewayPaymentStatus::Pending,
                external_reference: String::new(),
                transaction_amount: 0.0,
            })
        }
    }

    fn user() -> UserId {
        UserId::new("user-42").unwrap()
    }

    fn handler(
        payments: Arc<MockPaymentStore>,
        unlocks: MockUnlockStore,
        gateway: Arc<MockGateway>,
    ) -> CreatePaymentHandler {
        CreatePaymentHandler::new(
            payments,
            Arc::new(unlocks),
            gateway,
            RedirectUrls::new("https://tramitesat.mx/"),
        )
    }

    // ══════════════════════════════════════════════════════════════
    // Handler Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn creates_pending_payment_and_returns_preference() {
        let payments = Arc::new(MockPaymentStore::new());
        let gateway = Arc::new(MockGateway::new());
        let handler = handler(
            payments.clone(),
            MockUnlockStore {
                tramite: Some(TramiteId::new()),
                unlocked: false,
            },
            gateway.clone(),
        );

        let result = handler
            .handle(CreatePaymentCommand {
                user_id: user(),
                kind: PaymentKind::PorTramite,
                tramite_slug: Some("rfc-persona-fisica".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(result.preference_id, "pref-123");
        assert!(!result.init_point.is_empty());

        let inserted = payments.inserted.lock().unwrap();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].monto_centavos, 5900);
        assert!(inserted[0].external_ref.starts_with("user-42-"));
    }

    #[tokio::test]
    async fn rejects_already_unlocked_tramite_without_creating_payment() {
        let payments = Arc::new(MockPaymentStore::new());
        let handler = handler(
            payments.clone(),
            MockUnlockStore {
                tramite: Some(TramiteId::new()),
                unlocked: true,
            },
            Arc::new(MockGateway::new()),
        );

        let result = handler
            .handle(CreatePaymentCommand {
                user_id: user(),
                kind: PaymentKind::PorTramite,
                tramite_slug: Some("rfc-persona-fisica".to_string()),
            })
            .await;

        assert!(matches!(
            result,
            Err(PaymentFlowError::AlreadyUnlocked { .. })
        ));
        assert_eq!(payments.insert_count(), 0);
    }

    #[tokio::test]
    async fn annual_subscription_skips_unlock_guard() {
        let payments = Arc::new(MockPaymentStore::new());
        let handler = handler(
            payments.clone(),
            MockUnlockStore {
                tramite: None,
                unlocked: true, // would 409 a per-tramite purchase
            },
            Arc::new(MockGateway::new()),
        );

        let result = handler
            .handle(CreatePaymentCommand {
                user_id: user(),
                kind: PaymentKind::SuscripcionAnual,
                tramite_slug: None,
            })
            .await
            .unwrap();

        assert_eq!(result.preference_id, "pref-123");
        let inserted = payments.inserted.lock().unwrap();
        assert_eq!(inserted[0].monto_centavos, 34900);
        assert!(inserted[0].tramite_id.is_none());
    }

    #[tokio::test]
    async fn gateway_failure_keeps_pending_payment_row() {
        let payments = Arc::new(MockPaymentStore::new());
        let handler = handler(
            payments.clone(),
            MockUnlockStore {
                tramite: None,
                unlocked: false,
            },
            Arc::new(MockGateway::failing()),
        );

        let result = handler
            .handle(CreatePaymentCommand {
                user_id: user(),
                kind: PaymentKind::SuscripcionAnual,
                tramite_slug: None,
            })
            .await;

        assert!(matches!(result, Err(PaymentFlowError::Gateway(_))));
        // The pending row is retained for manual reconciliation
        assert_eq!(payments.insert_count(), 1);
    }

    #[tokio::test]
    async fn attach_preference_failure_does_not_fail_the_request() {
        let payments = Arc::new(MockPaymentStore::failing_attach());
        let handler = handler(
            payments,
            MockUnlockStore {
                tramite: None,
                unlocked: false,
            },
            Arc::new(MockGateway::new()),
        );

        let result = handler
            .handle(CreatePaymentCommand {
                user_id: user(),
                kind: PaymentKind::SuscripcionAnual,
                tramite_slug: None,
            })
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn preference_request_carries_redirects_and_notification_url() {
        let gateway = Arc::new(MockGateway::new());
        let handler = handler(
            Arc::new(MockPaymentStore::new()),
            MockUnlockStore {
                tramite: Some(TramiteId::new()),
                unlocked: false,
            },
            gateway.clone(),
        );

        handler
            .handle(CreatePaymentCommand {
                user_id: user(),
                kind: PaymentKind::PorTramite,
                tramite_slug: Some("efirma-renovacion".to_string()),
            })
            .await
            .unwrap();

        let requests = gateway.requests.lock().unwrap();
        let request = &requests[0];
        assert_eq!(request.unit_price, 59.0);
        assert_eq!(request.title, "TrámiteSAT — efirma-renovacion");
        assert_eq!(
            request.back_urls.success,
            "https://tramitesat.mx/tramite/efirma-renovacion/documentos?pago=exitoso"
        );
        assert_eq!(
            request.notification_url,
            "https://tramitesat.mx/api/pagos/webhook"
        );
    }

    #[tokio::test]
    async fn unknown_slug_still_creates_payment() {
        // The slug may reference a tramite not yet in the catalog; the
        // payment proceeds with a null tramite id.
        let payments = Arc::new(MockPaymentStore::new());
        let handler = handler(
            payments.clone(),
            MockUnlockStore {
                tramite: None,
                unlocked: false,
            },
            Arc::new(MockGateway::new()),
        );

        let result = handler
            .handle(CreatePaymentCommand {
                user_id: user(),
                kind: PaymentKind::PorTramite,
                tramite_slug: Some("tramite-nuevo".to_string()),
            })
            .await;

        assert!(result.is_ok());
        let inserted = payments.inserted.lock().unwrap();
        assert!(inserted[0].tramite_id.is_none());
        assert_eq!(inserted[0].tramite_slug.as_deref(), Some("tramite-nuevo"));
    }
}
