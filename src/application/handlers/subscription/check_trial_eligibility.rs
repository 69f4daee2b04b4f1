//! CheckTrialEligibilityHandler - one trial per user, ever.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::subscription::{SubscriptionPlan, SubscriptionStatus};
use crate::ports::{PaymentStore, SubscriptionStore};

const ALL_STATUSES: [SubscriptionStatus; 3] = [
    SubscriptionStatus::Active,
    SubscriptionStatus::Cancelled,
    SubscriptionStatus::Expired,
];

/// Handler answering whether a user may start a free trial.
///
/// A user is ineligible once they have ever held a trial, ever held a
/// premium subscription, or ever completed a successful payment. Cancelled
/// and expired rows count: cancelling a trial does not earn a second one.
pub struct CheckTrialEligibilityHandler {
    subscriptions: Arc<dyn SubscriptionStore>,
    payments: Arc<dyn PaymentStore>,
}

impl CheckTrialEligibilityHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionStore>, payments: Arc<dyn PaymentStore>) -> Self {
        Self {
            subscriptions,
            payments,
        }
    }

    pub async fn check(&self, user_id: &UserId) -> Result<bool, DomainError> {
        if self
            .subscriptions
            .has_had_plan(user_id, SubscriptionPlan::Trial, &ALL_STATUSES)
            .await?
        {
            return Ok(false);
        }

        if self
            .subscriptions
            .has_had_plan(user_id, SubscriptionPlan::Premium, &ALL_STATUSES)
            .await?
        {
            return Ok(false);
        }

        if self.payments.has_successful_payment(user_id).await? {
            return Ok(false);
        }

        Ok(true)
    }
}
