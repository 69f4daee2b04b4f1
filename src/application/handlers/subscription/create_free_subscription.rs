//! CreateFreeSubscriptionHandler - the default open-ended free plan.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::domain::foundation::{DomainError, SubscriptionId, UserId};
use crate::domain::subscription::Subscription;
use crate::ports::{BusinessEvent, EventPublisher, SubscriptionStore};

/// Handler that ensures a user has a subscription row.
///
/// New accounts get an open-ended free subscription. The operation is
/// idempotent: a user who already holds any active subscription keeps it.
pub struct CreateFreeSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionStore>,
    events: Arc<dyn EventPublisher>,
}

impl CreateFreeSubscriptionHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionStore>, events: Arc<dyn EventPublisher>) -> Self {
        Self {
            subscriptions,
            events,
        }
    }

    pub async fn handle(&self, user_id: UserId) -> Result<Subscription, DomainError> {
        if let Some(existing) = self.subscriptions.find_active_by_user(&user_id).await? {
            return Ok(existing);
        }

        let subscription = Subscription::create_free(SubscriptionId::new(), user_id);
        self.subscriptions.insert(&subscription).await?;
        info!(user_id = %user_id, "free subscription created");

        let event = BusinessEvent::new(
            "subscription.created",
            json!({
                "subscription_id": subscription.id.to_string(),
                "user_id": user_id.to_string(),
                "plan": subscription.plan.to_string(),
            }),
        );
        if let Err(e) = self.events.publish(event).await {
            warn!(user_id = %user_id, error = %e, "failed to publish subscription.created");
        }

        Ok(subscription)
    }
}
