//! Payment use-case handlers.

mod create_payment;
mod get_payment;
mod process_webhook;

pub use create_payment::{CreatePaymentCommand, CreatePaymentHandler, CreatePaymentResult};
pub use get_payment::{GetPaymentHandler, GetPaymentQuery};
pub use process_webhook::{ProcessWebhookCommand, ProcessWebhookHandler, ProcessWebhookOutcome};
