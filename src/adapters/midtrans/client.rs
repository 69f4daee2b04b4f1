//! Midtrans Snap API client.
//!
//! Implements the `PaymentGateway` port against the Snap checkout API.
//! Authentication is HTTP Basic with the server key as username and an
//! empty password, per the Midtrans API contract.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::config::PaymentConfig;
use crate::domain::foundation::DomainError;
use crate::domain::payment::PaymentTransaction;
use crate::ports::{CheckoutSession, PaymentGateway};

use super::types::{
    CustomerDetails, Expiry, ItemDetail, SnapTransactionRequest, SnapTransactionResponse,
    TransactionDetails,
};

/// Product line shown on the gateway checkout page.
const ITEM_ID: &str = "PREMIUM_MONTHLY";
const ITEM_NAME: &str = "Premium Subscription - 1 Month";

/// Payment channels offered at checkout.
const ENABLED_PAYMENTS: &[&str] = &[
    "credit_card",
    "bank_transfer",
    "echannel",
    "gopay",
    "shopeepay",
    "qris",
    "cstore",
];

/// Hours the Snap checkout stays open, matching the payment window.
const EXPIRY_HOURS: u32 = 24;

/// Midtrans Snap API client.
pub struct MidtransSnapClient {
    server_key: SecretString,
    base_url: String,
    http_client: reqwest::Client,
}

impl MidtransSnapClient {
    /// Creates a client from payment configuration.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the HTTP client cannot be built.
    pub fn new(config: &PaymentConfig) -> Result<Self, DomainError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| DomainError::gateway(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            server_key: config.server_key.clone(),
            base_url: config.base_url.clone(),
            http_client,
        })
    }
}

#[async_trait]
impl PaymentGateway for MidtransSnapClient {
    async fn create_checkout_session(
        &self,
        payment: &PaymentTransaction,
        customer_email: Option<&str>,
    ) -> Result<CheckoutSession, DomainError> {
        let url = format!("{}/snap/v1/transactions", self.base_url);

        // Snap expects whole IDR units, not cents.
        let gross_amount = payment.amount.major_units();
        let request = SnapTransactionRequest {
            transaction_details: TransactionDetails {
                order_id: payment.order_id.clone(),
                gross_amount,
            },
            item_details: vec![ItemDetail {
                id: ITEM_ID.to_string(),
                price: gross_amount,
                quantity: 1,
                name: ITEM_NAME.to_string(),
            }],
            customer_details: customer_email.map(|email| CustomerDetails {
                email: email.to_string(),
            }),
            enabled_payments: ENABLED_PAYMENTS.to_vec(),
            expiry: Expiry {
                unit: "hours",
                duration: EXPIRY_HOURS,
            },
        };

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.server_key.expose_secret(), Some(""))
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::gateway(format!("Snap request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            debug!(order_id = %payment.order_id, %status, body, "Snap create transaction failed");
            return Err(DomainError::gateway(format!(
                "Snap API returned {}",
                status
            )));
        }

        let snap: SnapTransactionResponse = response
            .json()
            .await
            .map_err(|e| DomainError::gateway(format!("Failed to parse Snap response: {}", e)))?;

        Ok(CheckoutSession {
            token: snap.token,
            redirect_url: snap.redirect_url,
        })
    }
}
