//! Payment command handlers.

mod create_payment;
mod process_webhook;

pub use create_payment::{
    CreatePaymentCommand, CreatePaymentHandler, CreatePaymentResult, RedirectUrls,
};
pub use process_webhook::{ProcessWebhookCommand, ProcessWebhookHandler, WebhookOutcome};
