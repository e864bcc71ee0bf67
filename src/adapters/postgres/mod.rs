//! PostgreSQL adapters implementing the persistence ports.

mod payment_store;
mod profile_store;
mod unlock_store;

pub use payment_store::PostgresPaymentStore;
pub use profile_store::PostgresProfileStore;
pub use unlock_store::PostgresUnlockStore;
