//! HTTP DTOs for subscription endpoints.

use serde::Serialize;

use crate::application::handlers::subscription::SubscriptionView;
use crate::domain::subscription::{Subscription, SubscriptionPlan, SubscriptionStatus};

/// Response for the current subscription, or the free default when the
/// user holds no active row.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    pub is_premium: bool,
    pub is_trial: bool,
    pub days_remaining: u32,
    /// Start of the current subscription (RFC 3339).
    pub started_at: Option<String>,
    /// Entitlement deadline (RFC 3339); null for open-ended plans.
    pub ended_at: Option<String>,
}

impl SubscriptionResponse {
    /// The view a user without any subscription row gets.
    pub fn free_default() -> Self {
        Self {
            plan: SubscriptionPlan::Free,
            status: SubscriptionStatus::Active,
            is_premium: false,
            is_trial: false,
            days_remaining: 0,
            started_at: None,
            ended_at: None,
        }
    }
}

impl From<SubscriptionView> for SubscriptionResponse {
    fn from(view: SubscriptionView) -> Self {
        Self {
            plan: view.subscription.plan,
            status: view.subscription.status,
            is_premium: view.is_premium,
            is_trial: view.is_trial,
            days_remaining: view.days_remaining,
            started_at: Some(view.subscription.started_at.as_datetime().to_rfc3339()),
            ended_at: view
                .subscription
                .ended_at
                .map(|t| t.as_datetime().to_rfc3339()),
        }
    }
}

impl From<Subscription> for SubscriptionResponse {
    fn from(subscription: Subscription) -> Self {
        let now = crate::domain::foundation::Timestamp::now();
        Self {
            plan: subscription.plan,
            status: subscription.status,
            is_premium: subscription.is_premium(),
            is_trial: subscription.is_trial(),
            days_remaining: subscription.days_remaining(&now),
            started_at: Some(subscription.started_at.as_datetime().to_rfc3339()),
            ended_at: subscription.ended_at.map(|t| t.as_datetime().to_rfc3339()),
        }
    }
}
