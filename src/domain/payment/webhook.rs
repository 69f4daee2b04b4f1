//! Gateway webhook payload.
//!
//! Field names mirror the Midtrans HTTP notification JSON. `gross_amount`
//! stays a raw string because the signature covers those exact bytes.

use serde::{Deserialize, Serialize};

/// Payment notification as delivered by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidtransWebhookPayload {
    /// Order id the merchant supplied at checkout creation.
    pub order_id: String,

    /// HTTP-style status code for the notification ("200", "201", "407"...).
    pub status_code: String,

    /// Amount as a decimal string, e.g. "25000.00". Signed verbatim.
    pub gross_amount: String,

    /// SHA-512 signature over order_id + status_code + gross_amount + key.
    pub signature_key: String,

    /// Settlement state: settlement, capture, pending, deny, cancel, expire.
    pub transaction_status: String,

    /// Gateway-assigned transaction id.
    pub transaction_id: String,

    /// Payment channel, e.g. "gopay", "bank_transfer".
    pub payment_type: String,

    /// When the gateway recorded the transaction.
    pub transaction_time: Option<String>,

    /// When funds settled; present for settlement notifications.
    pub settlement_time: Option<String>,

    /// Fraud screening verdict: accept, challenge, deny.
    pub fraud_status: Option<String>,

    /// ISO currency code.
    pub currency: Option<String>,
}

impl MidtransWebhookPayload {
    /// True if the notification reports settled money movement.
    ///
    /// `capture` only counts when fraud screening accepted the charge.
    pub fn indicates_success(&self) -> bool {
        match self.transaction_status.as_str() {
            "settlement" => true,
            "capture" => !matches!(self.fraud_status.as_deref(), Some("challenge") | Some("deny")),
            _ => false,
        }
    }

    /// True if the customer has not yet completed payment.
    ///
    /// A challenged capture is held as pending until manual review.
    pub fn indicates_pending(&self) -> bool {
        match self.transaction_status.as_str() {
            "pending" => true,
            "capture" => matches!(self.fraud_status.as_deref(), Some("challenge")),
            _ => false,
        }
    }

    /// True if the gateway denied the charge.
    pub fn indicates_failure(&self) -> bool {
        self.transaction_status == "deny"
            || (self.transaction_status == "capture"
                && matches!(self.fraud_status.as_deref(), Some("deny")))
    }

    /// True if the customer or an operator cancelled the charge.
    pub fn indicates_cancellation(&self) -> bool {
        self.transaction_status == "cancel"
    }

    /// True if the payment window lapsed.
    pub fn indicates_expiry(&self) -> bool {
        self.transaction_status == "expire"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(status: &str, fraud: Option<&str>) -> MidtransWebhookPayload {
        MidtransWebhookPayload {
            order_id: "ORDER-abc-1700000000000".to_string(),
            status_code: "200".to_string(),
            gross_amount: "25000.00".to_string(),
            signature_key: "sig".to_string(),
            transaction_status: status.to_string(),
            transaction_id: "gw-txn-1".to_string(),
            payment_type: "gopay".to_string(),
            transaction_time: Some("2026-08-30 10:00:00".to_string()),
            settlement_time: None,
            fraud_status: fraud.map(|s| s.to_string()),
            currency: Some("IDR".to_string()),
        }
    }

    #[test]
    fn settlement_indicates_success() {
        assert!(payload("settlement", None).indicates_success());
    }

    #[test]
    fn accepted_capture_indicates_success() {
        assert!(payload("capture", Some("accept")).indicates_success());
        assert!(payload("capture", None).indicates_success());
    }

    #[test]
    fn challenged_capture_is_pending_not_success() {
        let p = payload("capture", Some("challenge"));
        assert!(!p.indicates_success());
        assert!(p.indicates_pending());
        assert!(!p.indicates_failure());
    }

    #[test]
    fn denied_capture_is_failure() {
        let p = payload("capture", Some("deny"));
        assert!(!p.indicates_success());
        assert!(p.indicates_failure());
    }

    #[test]
    fn deny_is_failure() {
        assert!(payload("deny", None).indicates_failure());
    }

    #[test]
    fn cancel_and_expire_families() {
        assert!(payload("cancel", None).indicates_cancellation());
        assert!(payload("expire", None).indicates_expiry());
        assert!(!payload("expire", None).indicates_failure());
    }

    #[test]
    fn deserializes_gateway_json() {
        let json = r#"{
            "order_id": "ORDER-abc-1700000000000",
            "status_code": "200",
            "gross_amount": "25000.00",
            "signature_key": "deadbeef",
            "transaction_status": "settlement",
            "transaction_id": "9aed5972-5b6a-401e-894b-a32c91ed1a3a",
            "payment_type": "bank_transfer",
            "transaction_time": "2026-08-30 10:00:00",
            "settlement_time": "2026-08-30 10:05:00",
            "fraud_status": "accept",
            "currency": "IDR"
        }"#;

        let p: MidtransWebhookPayload = serde_json::from_str(json).unwrap();
        assert_eq!(p.order_id, "ORDER-abc-1700000000000");
        assert_eq!(p.gross_amount, "25000.00");
        assert!(p.indicates_success());
    }

    #[test]
    fn deserializes_without_optional_fields() {
        let json = r#"{
            "order_id": "ORDER-abc-1",
            "status_code": "407",
            "gross_amount": "25000.00",
            "signature_key": "deadbeef",
            "transaction_status": "expire",
            "transaction_id": "x",
            "payment_type": "bank_transfer"
        }"#;

        let p: MidtransWebhookPayload = serde_json::from_str(json).unwrap();
        assert!(p.indicates_expiry());
        assert!(p.settlement_time.is_none());
    }
}
