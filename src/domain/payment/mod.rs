//! Payment domain module.
//!
//! Handles the payment transaction lifecycle and gateway webhook semantics.
//!
//! # Module Structure
//!
//! - `transaction` - PaymentTransaction aggregate entity
//! - `status` - PaymentStatus state machine
//! - `method` - PaymentMethod classification of gateway payment types
//! - `signature` - SHA-512 webhook signature verification
//! - `webhook` - Gateway webhook payload and status families

mod method;
mod signature;
mod status;
mod transaction;
mod webhook;

pub use method::PaymentMethod;
#[cfg(test)]
pub use signature::compute_test_signature;
pub use signature::SignatureVerifier;
pub use status::PaymentStatus;
pub use transaction::PaymentTransaction;
pub use webhook::MidtransWebhookPayload;
