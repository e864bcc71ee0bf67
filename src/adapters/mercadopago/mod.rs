//! MercadoPago adapter implementing the checkout gateway port.

mod client;
mod mock_gateway;

pub use client::{MercadoPagoClient, MercadoPagoClientConfig};
pub use mock_gateway::MockCheckoutGateway;
