//! Ports - trait contracts for external collaborators.
//!
//! Adapters (Postgres, MercadoPago, mocks) implement these; the application
//! layer depends only on the traits.

mod checkout_gateway;
mod payment_store;
mod profile_store;
mod unlock_store;

pub use checkout_gateway::{
    BackUrls, CheckoutGateway, CheckoutPreference, GatewayError, GatewayPayment,
    GatewayPaymentStatus, PreferenceRequest,
};
pub use payment_store::PaymentStore;
pub use profile_store::ProfileStore;
pub use unlock_store::{UnlockInsert, UnlockStore};
