//! Payment gateway port.
//!
//! The gateway hosts the checkout page; this port covers the single
//! server-side call the backend makes: creating a checkout session for a
//! pending payment.

use crate::domain::foundation::DomainError;
use crate::domain::payment::PaymentTransaction;
use async_trait::async_trait;

/// Checkout session issued by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    /// Token to embed in the client-side checkout widget.
    pub token: String,

    /// Hosted checkout page URL.
    pub redirect_url: String,
}

/// Port for the external payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a checkout session for a pending payment.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` on any upstream failure: timeouts, non-2xx
    /// responses, or undecodable bodies.
    async fn create_checkout_session(
        &self,
        payment: &PaymentTransaction,
        customer_email: Option<&str>,
    ) -> Result<CheckoutSession, DomainError>;
}
