//! Adapters implementing the ports against external infrastructure.

pub mod http;
pub mod mercadopago;
pub mod postgres;
