//! ActivateSubscriptionHandler - grants or extends premium access after a
//! successful payment.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::domain::foundation::{DomainError, PaymentId, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::Subscription;
use crate::ports::{BusinessEvent, EventPublisher, SubscriptionStore};

/// Provider name recorded on activated subscriptions.
const PROVIDER: &str = "MIDTRANS";

/// What activation did for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// No active subscription existed; a new premium row was created.
    Created,
    /// An active premium subscription was extended.
    Extended,
    /// An active trial or free subscription was replaced by premium.
    Upgraded,
}

/// Handler that activates or extends a user's premium subscription.
///
/// Invoked by webhook processing once a payment settles. Extension always
/// lands in the future: a subscription whose deadline has already lapsed
/// is extended from now, not from the stale deadline.
pub struct ActivateSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionStore>,
    events: Arc<dyn EventPublisher>,
}

impl ActivateSubscriptionHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionStore>, events: Arc<dyn EventPublisher>) -> Self {
        Self {
            subscriptions,
            events,
        }
    }

    pub async fn activate(
        &self,
        user_id: UserId,
        payment_id: PaymentId,
        days: i64,
    ) -> Result<ActivationOutcome, DomainError> {
        let now = Timestamp::now();

        let outcome = match self.subscriptions.find_active_by_user(&user_id).await? {
            Some(mut current) if current.is_premium() => {
                current.extend_by(days, now)?;
                current.record_provider_reference(PROVIDER, payment_id.to_string());
                self.subscriptions.update(&current).await?;
                info!(
                    user_id = %user_id,
                    ended_at = ?current.ended_at,
                    "premium subscription extended"
                );
                self.publish(
                    "subscription.extended",
                    &current,
                    json!({
                        "subscription_id": current.id.to_string(),
                        "user_id": user_id.to_string(),
                        "days": days,
                    }),
                )
                .await;
                ActivationOutcome::Extended
            }
            Some(mut current) => {
                // Trial or free: close it out and start a fresh premium row.
                current.cancel(now)?;
                self.subscriptions.update(&current).await?;
                let mut premium =
                    Subscription::create_premium(SubscriptionId::new(), user_id, days);
                premium.record_provider_reference(PROVIDER, payment_id.to_string());
                self.subscriptions.insert(&premium).await?;
                info!(
                    user_id = %user_id,
                    replaced_plan = %current.plan,
                    "subscription upgraded to premium"
                );
                self.publish_activated(&premium, days).await;
                ActivationOutcome::Upgraded
            }
            None => {
                let mut premium =
                    Subscription::create_premium(SubscriptionId::new(), user_id, days);
                premium.record_provider_reference(PROVIDER, payment_id.to_string());
                self.subscriptions.insert(&premium).await?;
                info!(user_id = %user_id, "premium subscription created");
                self.publish_activated(&premium, days).await;
                ActivationOutcome::Created
            }
        };

        Ok(outcome)
    }

    async fn publish_activated(&self, subscription: &Subscription, days: i64) {
        self.publish(
            "subscription.activated",
            subscription,
            json!({
                "subscription_id": subscription.id.to_string(),
                "user_id": subscription.user_id.to_string(),
                "days": days,
            }),
        )
        .await;
    }

    async fn publish(&self, name: &str, subscription: &Subscription, payload: serde_json::Value) {
        if let Err(e) = self.events.publish(BusinessEvent::new(name, payload)).await {
            warn!(
                subscription_id = %subscription.id,
                error = %e,
                "failed to publish {name}"
            );
        }
    }
}
