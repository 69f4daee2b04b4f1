//! PaymentTransaction aggregate entity.
//!
//! A PaymentTransaction represents one attempt to collect money through the
//! payment gateway. It is created Pending with a payment deadline and moves
//! to exactly one outcome state via webhook reconciliation.
//!
//! # Design Decisions
//!
//! - **Money in cents**: All monetary values stored as i64 cents (not floats)
//! - **Order id is the gateway key**: Webhooks correlate by order_id, never
//!   by the internal PaymentId
//! - **Invariants re-checked after every transition**: A transaction can
//!   never be observed in an inconsistent state

use crate::domain::foundation::{
    DomainError, ErrorCode, Money, PaymentId, StateMachine, Timestamp, UserId,
};
use serde::{Deserialize, Serialize};

use super::{PaymentMethod, PaymentStatus};

/// Payment transaction aggregate.
///
/// # Invariants
///
/// - `amount` is strictly positive
/// - `order_id` is non-empty and `ORDER-` prefixed
/// - status Success implies `paid_at` is set
/// - status Expired implies `expired_at` is set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTransaction {
    /// Unique identifier for this transaction.
    pub id: PaymentId,

    /// User who initiated the payment.
    pub user_id: UserId,

    /// Gateway order id, format `ORDER-{user-prefix}-{millis}`.
    pub order_id: String,

    /// Amount to collect, in cents.
    pub amount: Money,

    /// ISO currency code.
    pub currency: String,

    /// How the customer paid (or intends to pay).
    pub payment_method: PaymentMethod,

    /// Current status in the settlement lifecycle.
    pub status: PaymentStatus,

    /// Transaction id assigned by the gateway, once known.
    pub gateway_transaction_id: Option<String>,

    /// Checkout token issued by the gateway.
    pub snap_token: Option<String>,

    /// Hosted checkout page URL issued by the gateway.
    pub redirect_url: Option<String>,

    /// Fraud screening verdict reported by the gateway.
    pub fraud_status: Option<String>,

    /// Client-supplied key deduplicating create requests.
    pub idempotency_key: Option<String>,

    /// Last webhook notification received, verbatim, for audit.
    pub webhook_payload: Option<serde_json::Value>,

    /// Deadline after which the customer can no longer pay.
    pub expires_at: Timestamp,

    /// When the transaction was created.
    pub created_at: Timestamp,

    /// When the transaction was last updated.
    pub updated_at: Timestamp,

    /// When payment settled (set on Success).
    pub paid_at: Option<Timestamp>,

    /// When the payment window lapsed (set on Expired).
    pub expired_at: Option<Timestamp>,
}

impl PaymentTransaction {
    /// Create a new pending transaction.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the amount is not positive or the
    /// order id is malformed.
    pub fn create(
        id: PaymentId,
        user_id: UserId,
        order_id: String,
        amount: Money,
        currency: impl Into<String>,
        payment_method: PaymentMethod,
        expires_at: Timestamp,
    ) -> Result<Self, DomainError> {
        let now = Timestamp::now();
        let transaction = Self {
            id,
            user_id,
            order_id,
            amount,
            currency: currency.into(),
            payment_method,
            status: PaymentStatus::Pending,
            gateway_transaction_id: None,
            snap_token: None,
            redirect_url: None,
            fraud_status: None,
            idempotency_key: None,
            webhook_payload: None,
            expires_at,
            created_at: now,
            updated_at: now,
            paid_at: None,
            expired_at: None,
        };
        transaction.validate_invariants()?;
        Ok(transaction)
    }

    /// Attach the client's idempotency key to a freshly created transaction.
    pub fn with_idempotency_key(mut self, key: Option<String>) -> Self {
        self.idempotency_key = key;
        self
    }

    /// Builds a gateway order id for a user at a point in time.
    ///
    /// Format: `ORDER-{first-8-of-user-uuid}-{unix-millis}`.
    pub fn build_order_id(user_id: &UserId, at: &Timestamp) -> String {
        format!("ORDER-{}-{}", user_id.short_prefix(), at.as_unix_millis())
    }

    /// Attach the checkout session issued by the gateway.
    pub fn attach_checkout_session(&mut self, token: String, redirect_url: String) {
        self.snap_token = Some(token);
        self.redirect_url = Some(redirect_url);
        self.updated_at = Timestamp::now();
    }

    /// Mark this transaction as successfully settled.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn mark_success(
        &mut self,
        paid_at: Timestamp,
        gateway_transaction_id: Option<String>,
    ) -> Result<(), DomainError> {
        self.transition_to(PaymentStatus::Success)?;
        self.paid_at = Some(paid_at);
        if let Some(txn_id) = gateway_transaction_id {
            self.gateway_transaction_id = Some(txn_id);
        }
        self.updated_at = Timestamp::now();
        self.validate_invariants()
    }

    /// Mark this transaction as denied by the gateway.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn mark_failed(&mut self) -> Result<(), DomainError> {
        self.transition_to(PaymentStatus::Failed)?;
        self.updated_at = Timestamp::now();
        self.validate_invariants()
    }

    /// Mark this transaction as expired (payment window lapsed).
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn mark_expired(&mut self, expired_at: Timestamp) -> Result<(), DomainError> {
        self.transition_to(PaymentStatus::Expired)?;
        self.expired_at = Some(expired_at);
        self.updated_at = Timestamp::now();
        self.validate_invariants()
    }

    /// Mark this transaction as cancelled.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn mark_cancelled(&mut self) -> Result<(), DomainError> {
        self.transition_to(PaymentStatus::Cancelled)?;
        self.updated_at = Timestamp::now();
        self.validate_invariants()
    }

    /// Store the raw webhook notification for audit.
    pub fn record_webhook_payload(&mut self, payload: serde_json::Value) {
        self.webhook_payload = Some(payload);
        self.updated_at = Timestamp::now();
    }

    /// Record the fraud screening verdict from the gateway.
    pub fn record_fraud_status(&mut self, fraud_status: Option<String>) {
        if fraud_status.is_some() {
            self.fraud_status = fraud_status;
            self.updated_at = Timestamp::now();
        }
    }

    /// Returns true once the payment has left Pending.
    pub fn is_final(&self) -> bool {
        self.status.is_final()
    }

    /// Returns true if the payment settled: status Success with a
    /// recorded settlement time.
    pub fn is_successful(&self) -> bool {
        self.status == PaymentStatus::Success && self.paid_at.is_some()
    }

    /// Returns true while the customer can still pay.
    pub fn is_payment_window_open(&self, now: &Timestamp) -> bool {
        self.status == PaymentStatus::Pending && now.is_before(&self.expires_at)
    }

    /// Transition to a new status using the state machine.
    fn transition_to(&mut self, target: PaymentStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Cannot transition payment from {:?} to {:?}",
                    self.status, target
                ),
            )
        })?;
        Ok(())
    }

    /// Check structural invariants that must hold in every state.
    fn validate_invariants(&self) -> Result<(), DomainError> {
        self.amount
            .require_positive("amount")
            .map_err(|e| DomainError::validation("amount", e.to_string()))?;

        if self.order_id.is_empty() {
            return Err(DomainError::validation("order_id", "Order id cannot be empty"));
        }
        if !self.order_id.starts_with("ORDER-") {
            return Err(DomainError::validation(
                "order_id",
                "Order id must start with ORDER-",
            ));
        }

        if self.status == PaymentStatus::Success && self.paid_at.is_none() {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "Successful payment must record paid_at",
            ));
        }
        if self.status == PaymentStatus::Expired && self.expired_at.is_none() {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "Expired payment must record expired_at",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user_id() -> UserId {
        "550e8400-e29b-41d4-a716-446655440000".parse().unwrap()
    }

    fn pending_transaction() -> PaymentTransaction {
        let user_id = test_user_id();
        let now = Timestamp::now();
        PaymentTransaction::create(
            PaymentId::new(),
            user_id,
            PaymentTransaction::build_order_id(&user_id, &now),
            Money::from_major_units(25000),
            "IDR",
            PaymentMethod::Ewallet,
            now.add_hours(24),
        )
        .unwrap()
    }

    // Construction tests

    #[test]
    fn create_starts_pending() {
        let txn = pending_transaction();
        assert_eq!(txn.status, PaymentStatus::Pending);
        assert!(txn.paid_at.is_none());
        assert!(txn.expired_at.is_none());
        assert!(txn.snap_token.is_none());
    }

    #[test]
    fn create_rejects_non_positive_amount() {
        let user_id = test_user_id();
        let now = Timestamp::now();
        let result = PaymentTransaction::create(
            PaymentId::new(),
            user_id,
            PaymentTransaction::build_order_id(&user_id, &now),
            Money::from_cents(0),
            "IDR",
            PaymentMethod::Other,
            now.add_hours(24),
        );
        assert!(result.is_err());
    }

    #[test]
    fn create_rejects_malformed_order_id() {
        let result = PaymentTransaction::create(
            PaymentId::new(),
            test_user_id(),
            "INVOICE-123".to_string(),
            Money::from_major_units(25000),
            "IDR",
            PaymentMethod::Other,
            Timestamp::now().add_hours(24),
        );
        assert!(result.is_err());
    }

    #[test]
    fn build_order_id_uses_user_prefix_and_millis() {
        let user_id = test_user_id();
        let ts = Timestamp::from_unix_millis(1_700_000_000_000).unwrap();
        let order_id = PaymentTransaction::build_order_id(&user_id, &ts);
        assert_eq!(order_id, "ORDER-550e8400-1700000000000");
    }

    // Lifecycle transition tests

    #[test]
    fn pending_can_succeed() {
        let mut txn = pending_transaction();
        let paid_at = Timestamp::now();

        let result = txn.mark_success(paid_at, Some("gw-txn-1".to_string()));
        assert!(result.is_ok());
        assert_eq!(txn.status, PaymentStatus::Success);
        assert_eq!(txn.paid_at, Some(paid_at));
        assert_eq!(txn.gateway_transaction_id, Some("gw-txn-1".to_string()));
        assert!(txn.is_successful());
    }

    #[test]
    fn pending_can_fail() {
        let mut txn = pending_transaction();
        assert!(txn.mark_failed().is_ok());
        assert_eq!(txn.status, PaymentStatus::Failed);
    }

    #[test]
    fn pending_can_expire_and_then_cancel() {
        let mut txn = pending_transaction();
        assert!(txn.mark_expired(Timestamp::now()).is_ok());
        assert_eq!(txn.status, PaymentStatus::Expired);
        assert!(txn.expired_at.is_some());

        assert!(txn.mark_cancelled().is_ok());
        assert_eq!(txn.status, PaymentStatus::Cancelled);
    }

    #[test]
    fn success_cannot_be_overwritten() {
        let mut txn = pending_transaction();
        txn.mark_success(Timestamp::now(), None).unwrap();

        assert!(txn.mark_failed().is_err());
        assert!(txn.mark_cancelled().is_err());
        assert!(txn.mark_expired(Timestamp::now()).is_err());
        assert_eq!(txn.status, PaymentStatus::Success);
    }

    #[test]
    fn expired_cannot_succeed() {
        let mut txn = pending_transaction();
        txn.mark_expired(Timestamp::now()).unwrap();

        let result = txn.mark_success(Timestamp::now(), None);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().code, ErrorCode::InvalidStateTransition);
        assert_eq!(txn.status, PaymentStatus::Expired);
    }

    #[test]
    fn cancelled_is_terminal() {
        let mut txn = pending_transaction();
        txn.mark_cancelled().unwrap();

        assert!(txn.mark_success(Timestamp::now(), None).is_err());
        assert!(txn.mark_failed().is_err());
    }

    // Helper tests

    #[test]
    fn attach_checkout_session_records_token_and_url() {
        let mut txn = pending_transaction();
        txn.attach_checkout_session(
            "snap-token".to_string(),
            "https://app.sandbox.midtrans.com/snap/v2/vtweb/snap-token".to_string(),
        );
        assert_eq!(txn.snap_token.as_deref(), Some("snap-token"));
        assert!(txn.redirect_url.is_some());
    }

    #[test]
    fn payment_window_closes_at_deadline() {
        let txn = pending_transaction();
        let now = Timestamp::now();
        assert!(txn.is_payment_window_open(&now));

        let after_deadline = now.add_hours(25);
        assert!(!txn.is_payment_window_open(&after_deadline));
    }

    #[test]
    fn payment_window_is_closed_once_final() {
        let mut txn = pending_transaction();
        txn.mark_failed().unwrap();
        assert!(!txn.is_payment_window_open(&Timestamp::now()));
    }

    #[test]
    fn with_idempotency_key_attaches_key() {
        let txn = pending_transaction().with_idempotency_key(Some("client-key-1".to_string()));
        assert_eq!(txn.idempotency_key.as_deref(), Some("client-key-1"));
        assert!(pending_transaction().idempotency_key.is_none());
    }

    #[test]
    fn record_webhook_payload_stores_raw_notification() {
        let mut txn = pending_transaction();
        txn.record_webhook_payload(serde_json::json!({
            "transaction_status": "settlement",
            "order_id": txn.order_id,
        }));
        let stored = txn.webhook_payload.unwrap();
        assert_eq!(stored["transaction_status"], "settlement");
    }

    #[test]
    fn is_successful_requires_paid_at() {
        let mut txn = pending_transaction();
        txn.mark_success(Timestamp::now(), None).unwrap();
        assert!(txn.is_successful());

        // A row patched to Success without a settlement time does not count.
        txn.paid_at = None;
        assert!(!txn.is_successful());
    }

    #[test]
    fn record_fraud_status_keeps_existing_when_absent() {
        let mut txn = pending_transaction();
        txn.record_fraud_status(Some("accept".to_string()));
        txn.record_fraud_status(None);
        assert_eq!(txn.fraud_status.as_deref(), Some("accept"));
    }
}
