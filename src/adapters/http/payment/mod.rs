//! Payment HTTP endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::PaymentAppState;
pub use routes::{payment_routes, webhook_routes};
