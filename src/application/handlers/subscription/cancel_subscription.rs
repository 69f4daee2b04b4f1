//! CancelSubscriptionHandler - user-initiated cancellation.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::subscription::Subscription;
use crate::ports::{BusinessEvent, EventPublisher, SubscriptionStore};

/// Handler that cancels the user's active subscription.
pub struct CancelSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionStore>,
    events: Arc<dyn EventPublisher>,
}

impl CancelSubscriptionHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionStore>, events: Arc<dyn EventPublisher>) -> Self {
        Self {
            subscriptions,
            events,
        }
    }

    /// # Errors
    ///
    /// - `SubscriptionNotFound` if the user has no active subscription
    pub async fn handle(&self, user_id: UserId) -> Result<Subscription, DomainError> {
        let mut subscription = self
            .subscriptions
            .find_active_by_user(&user_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::SubscriptionNotFound,
                    "no active subscription to cancel",
                )
            })?;

        subscription.cancel(Timestamp::now())?;
        self.subscriptions.update(&subscription).await?;
        info!(user_id = %user_id, plan = %subscription.plan, "subscription cancelled");

        let event = BusinessEvent::new(
            "subscription.cancelled",
            json!({
                "subscription_id": subscription.id.to_string(),
                "user_id": user_id.to_string(),
                "plan": subscription.plan.to_string(),
            }),
        );
        if let Err(e) = self.events.publish(event).await {
            warn!(user_id = %user_id, error = %e, "failed to publish subscription.cancelled");
        }

        Ok(subscription)
    }
}
