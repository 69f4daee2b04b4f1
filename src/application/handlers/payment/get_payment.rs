//! GetPaymentHandler - owner-scoped payment lookup.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::payment::PaymentTransaction;
use crate::ports::PaymentStore;

/// Query for a single payment by gateway order id.
#[derive(Debug, Clone)]
pub struct GetPaymentQuery {
    pub order_id: String,
    /// The requesting user; only the owner may read a payment.
    pub user_id: UserId,
}

/// Handler for reading a payment's current state.
pub struct GetPaymentHandler {
    payments: Arc<dyn PaymentStore>,
}

impl GetPaymentHandler {
    pub fn new(payments: Arc<dyn PaymentStore>) -> Self {
        Self { payments }
    }

    /// # Errors
    ///
    /// - `PaymentNotFound` if no payment has this order id
    /// - `Forbidden` if the payment belongs to another user
    pub async fn handle(&self, query: GetPaymentQuery) -> Result<PaymentTransaction, DomainError> {
        let payment = self
            .payments
            .find_by_order_id(&query.order_id)
            .await?
            .ok_or_else(|| DomainError::payment_not_found(&query.order_id))?;

        if payment.user_id != query.user_id {
            return Err(DomainError::forbidden(
                "payment belongs to a different user",
            ));
        }

        Ok(payment)
    }
}
