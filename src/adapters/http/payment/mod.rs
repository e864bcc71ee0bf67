//! Payment HTTP module: checkout creation and the MercadoPago webhook.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{AuthenticatedUser, PaymentAppState};
pub use routes::payment_router;
