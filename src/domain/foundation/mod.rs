//! Foundation types shared across the domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode};
pub use ids::{PaymentId, TramiteId, UserId};
pub use timestamp::Timestamp;
