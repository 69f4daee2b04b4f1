//! HTTP DTOs for payment endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::payment::{PaymentMethod, PaymentStatus, PaymentTransaction};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to create a subscription payment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePaymentRequest {
    /// Customer email forwarded to the gateway checkout page.
    #[serde(default)]
    pub email: Option<String>,
    /// Client-supplied key deduplicating retried create requests.
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// A payment transaction as exposed over the API.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentResponse {
    pub order_id: String,
    pub status: PaymentStatus,
    /// Decimal amount string, e.g. "25000.00".
    pub amount: String,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub snap_token: Option<String>,
    pub redirect_url: Option<String>,
    /// Payment deadline (RFC 3339).
    pub expires_at: String,
    /// Settlement time (RFC 3339), present once paid.
    pub paid_at: Option<String>,
}

impl From<PaymentTransaction> for PaymentResponse {
    fn from(payment: PaymentTransaction) -> Self {
        Self {
            order_id: payment.order_id,
            status: payment.status,
            amount: payment.amount.gross_amount(),
            currency: payment.currency,
            payment_method: payment.payment_method,
            snap_token: payment.snap_token,
            redirect_url: payment.redirect_url,
            expires_at: payment.expires_at.as_datetime().to_rfc3339(),
            paid_at: payment
                .paid_at
                .map(|t| t.as_datetime().to_rfc3339()),
        }
    }
}

/// Acknowledgement body for webhook deliveries.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAckResponse {
    pub status: &'static str,
}

impl WebhookAckResponse {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Money, PaymentId, Timestamp, UserId};

    #[test]
    fn payment_response_formats_amount_and_dates() {
        let payment = PaymentTransaction::create(
            PaymentId::new(),
            UserId::new(),
            "ORDER-abc-1".to_string(),
            Money::from_cents(2_500_000),
            "IDR",
            PaymentMethod::Other,
            Timestamp::now().add_hours(24),
        )
        .unwrap();

        let response = PaymentResponse::from(payment);
        assert_eq!(response.amount, "25000.00");
        assert_eq!(response.status, PaymentStatus::Pending);
        assert!(response.paid_at.is_none());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["payment_method"], "OTHER");
    }
}
