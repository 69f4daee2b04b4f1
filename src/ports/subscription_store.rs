//! Subscription store port.

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::subscription::{Subscription, SubscriptionPlan, SubscriptionStatus};
use async_trait::async_trait;

/// Store port for Subscription persistence and lifecycle queries.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Insert a new subscription row.
    async fn insert(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Update an existing subscription row.
    ///
    /// # Errors
    ///
    /// - `SubscriptionNotFound` if the row doesn't exist
    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Find the user's current active subscription, if any.
    ///
    /// "Active" means status Active and ended_at either open or in the
    /// future. When multiple rows qualify the most recently started wins.
    async fn find_active_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, DomainError>;

    /// True if the user has ever held a subscription on the given plan in
    /// any of the given statuses.
    ///
    /// Used for trial eligibility: one trial per user, ever.
    async fn has_had_plan(
        &self,
        user_id: &UserId,
        plan: SubscriptionPlan,
        statuses: &[SubscriptionStatus],
    ) -> Result<bool, DomainError>;

    /// Expire every active subscription whose deadline has passed.
    ///
    /// Returns the number of rows expired.
    async fn expire_due(&self, now: &Timestamp) -> Result<u64, DomainError>;
}
