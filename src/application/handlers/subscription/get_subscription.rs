//! GetSubscriptionHandler - current subscription with derived flags.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::subscription::Subscription;
use crate::ports::SubscriptionStore;

/// The user's current subscription plus the flags clients branch on.
#[derive(Debug, Clone)]
pub struct SubscriptionView {
    pub subscription: Subscription,
    pub is_premium: bool,
    pub is_trial: bool,
    pub days_remaining: u32,
}

/// Handler for reading the user's active subscription.
pub struct GetSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionStore>,
}

impl GetSubscriptionHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionStore>) -> Self {
        Self { subscriptions }
    }

    /// Returns `None` when the user holds no active subscription.
    pub async fn handle(&self, user_id: &UserId) -> Result<Option<SubscriptionView>, DomainError> {
        let now = Timestamp::now();
        let subscription = self.subscriptions.find_active_by_user(user_id).await?;
        Ok(subscription.map(|subscription| SubscriptionView {
            is_premium: subscription.is_premium(),
            is_trial: subscription.is_trial(),
            days_remaining: subscription.days_remaining(&now),
            subscription,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SubscriptionId;
    use crate::domain::subscription::{SubscriptionPlan, SubscriptionStatus};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockSubscriptionStore {
        subscriptions: Mutex<Vec<Subscription>>,
    }

    #[async_trait]
    impl SubscriptionStore for MockSubscriptionStore {
        async fn insert(&self, subscription: &Subscription) -> Result<(), DomainError> {
            self.subscriptions.lock().unwrap().push(subscription.clone());
            Ok(())
        }

        async fn update(&self, _subscription: &Subscription) -> Result<(), DomainError> {
            Ok(())
        }

        async fn find_active_by_user(
            &self,
            user_id: &UserId,
        ) -> Result<Option<Subscription>, DomainError> {
            let now = Timestamp::now();
            let subscriptions = self.subscriptions.lock().unwrap();
            Ok(subscriptions
                .iter()
                .find(|s| &s.user_id == user_id && s.is_active(&now))
                .cloned())
        }

        async fn has_had_plan(
            &self,
            _user_id: &UserId,
            _plan: SubscriptionPlan,
            _statuses: &[SubscriptionStatus],
        ) -> Result<bool, DomainError> {
            Ok(false)
        }

        async fn expire_due(&self, _now: &Timestamp) -> Result<u64, DomainError> {
            Ok(0)
        }
    }

    fn handler(existing: Vec<Subscription>) -> GetSubscriptionHandler {
        GetSubscriptionHandler::new(Arc::new(MockSubscriptionStore {
            subscriptions: Mutex::new(existing),
        }))
    }

    #[tokio::test]
    async fn premium_view_carries_flags_and_days() {
        let user_id = UserId::new();
        let premium = Subscription::create_premium(SubscriptionId::new(), user_id, 30);
        let handler = handler(vec![premium]);

        let view = handler.handle(&user_id).await.unwrap().unwrap();

        assert!(view.is_premium);
        assert!(!view.is_trial);
        assert!((29..=30).contains(&view.days_remaining));
    }

    #[tokio::test]
    async fn trial_view_is_trial_not_premium() {
        let user_id = UserId::new();
        let trial = Subscription::create_trial(SubscriptionId::new(), user_id, 14);
        let handler = handler(vec![trial]);

        let view = handler.handle(&user_id).await.unwrap().unwrap();

        assert!(!view.is_premium);
        assert!(view.is_trial);
    }

    #[tokio::test]
    async fn no_active_subscription_yields_none() {
        let handler = handler(vec![]);

        assert!(handler.handle(&UserId::new()).await.unwrap().is_none());
    }
}
