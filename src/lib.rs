//! TramiteSAT - Guided SAT administrative procedures
//!
//! This crate implements the payment and entitlement backend for the
//! TramiteSAT application: checkout preference creation against MercadoPago,
//! webhook reconciliation, and per-user procedure unlocking.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
