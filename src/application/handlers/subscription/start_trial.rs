//! StartTrialHandler - begins the one-time 14-day trial.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::application::handlers::subscription::CheckTrialEligibilityHandler;
use crate::domain::foundation::{DomainError, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::Subscription;
use crate::ports::{BusinessEvent, EventPublisher, SubscriptionStore};

/// Trial length in days.
const TRIAL_DAYS: i64 = 14;

/// Handler that starts a trial for an eligible user.
pub struct StartTrialHandler {
    subscriptions: Arc<dyn SubscriptionStore>,
    eligibility: Arc<CheckTrialEligibilityHandler>,
    events: Arc<dyn EventPublisher>,
}

impl StartTrialHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionStore>,
        eligibility: Arc<CheckTrialEligibilityHandler>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            subscriptions,
            eligibility,
            events,
        }
    }

    /// # Errors
    ///
    /// - `Forbidden` if the user is not trial-eligible
    pub async fn start(&self, user_id: UserId) -> Result<Subscription, DomainError> {
        if !self.eligibility.check(&user_id).await? {
            return Err(DomainError::forbidden("user is not eligible for a trial"));
        }

        // An open-ended free row makes way for the trial.
        if let Some(mut current) = self.subscriptions.find_active_by_user(&user_id).await? {
            current.cancel(Timestamp::now())?;
            self.subscriptions.update(&current).await?;
        }

        let trial = Subscription::create_trial(SubscriptionId::new(), user_id, TRIAL_DAYS);
        self.subscriptions.insert(&trial).await?;
        info!(user_id = %user_id, ended_at = ?trial.ended_at, "trial started");

        let event = BusinessEvent::new(
            "trial.started",
            json!({
                "subscription_id": trial.id.to_string(),
                "user_id": user_id.to_string(),
                "days": TRIAL_DAYS,
            }),
        );
        if let Err(e) = self.events.publish(event).await {
            warn!(user_id = %user_id, error = %e, "failed to publish trial.started");
        }

        Ok(trial)
    }
}
