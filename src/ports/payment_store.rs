//! Payment store port.
//!
//! Defines the contract for persisting PaymentTransaction aggregates and
//! for the row-locked unit of work used by webhook processing.
//!
//! # Webhook transactions
//!
//! Concurrent duplicate deliveries of the same notification must serialize
//! on the payment row: `begin_webhook` locks the row (`SELECT ... FOR
//! UPDATE` in the Postgres adapter) and hands back a [`WebhookTxn`]. The
//! second delivery blocks until the first commits, then observes the final
//! status and backs off as a duplicate.

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::payment::PaymentTransaction;
use async_trait::async_trait;

/// Row-locked unit of work over a single payment.
///
/// Dropping the handle without calling `save_and_commit` rolls back and
/// releases the lock.
#[async_trait]
pub trait WebhookTxn: Send {
    /// The locked payment, mutable in place.
    fn payment(&mut self) -> &mut PaymentTransaction;

    /// Persist the (possibly modified) payment and commit the transaction.
    async fn save_and_commit(self: Box<Self>) -> Result<(), DomainError>;

    /// Commit without writing, releasing the lock.
    ///
    /// Used for duplicate deliveries and pending no-ops.
    async fn commit_unchanged(self: Box<Self>) -> Result<(), DomainError>;
}

/// Store port for PaymentTransaction persistence.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Insert a new payment transaction.
    ///
    /// # Errors
    ///
    /// - `DuplicatePayment` if the order id already exists
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, payment: &PaymentTransaction) -> Result<(), DomainError>;

    /// Update an existing payment transaction.
    ///
    /// # Errors
    ///
    /// - `PaymentNotFound` if the transaction doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, payment: &PaymentTransaction) -> Result<(), DomainError>;

    /// Find a payment by its gateway order id.
    async fn find_by_order_id(
        &self,
        order_id: &str,
    ) -> Result<Option<PaymentTransaction>, DomainError>;

    /// Find the user's payment carrying this client idempotency key.
    ///
    /// The key is the primary defense against double-submission: a retry
    /// with the same key returns the original transaction whatever its
    /// status, settled included.
    async fn find_by_idempotency_key(
        &self,
        user_id: &UserId,
        key: &str,
    ) -> Result<Option<PaymentTransaction>, DomainError>;

    /// Find the user's most recent payment still inside its payment window.
    ///
    /// Used for idempotent payment creation: an open pending payment is
    /// returned instead of creating a new checkout.
    async fn find_open_pending_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<PaymentTransaction>, DomainError>;

    /// True if the user has ever completed a successful payment.
    async fn has_successful_payment(&self, user_id: &UserId) -> Result<bool, DomainError>;

    /// Open a row-locked transaction over the payment with this order id.
    ///
    /// Returns `None` if no payment exists for the order id.
    async fn begin_webhook(
        &self,
        order_id: &str,
    ) -> Result<Option<Box<dyn WebhookTxn>>, DomainError>;
}
