//! PostgreSQL adapters.

mod payment_store;
mod subscription_store;

pub use payment_store::PostgresPaymentStore;
pub use subscription_store::PostgresSubscriptionStore;
