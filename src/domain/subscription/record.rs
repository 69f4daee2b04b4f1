//! Subscription aggregate entity.
//!
//! A Subscription is one entitlement period for a user. Activation after a
//! successful payment either extends the user's current premium row or
//! replaces whatever non-premium row is active.
//!
//! # Design Decisions
//!
//! - **Open-ended free rows**: `ended_at = None` means no deadline (free plan)
//! - **Extension clamps to now**: extending a lapsed-but-still-ACTIVE row
//!   starts the new period from now, never from the stale ended_at

use crate::domain::foundation::{
    DomainError, ErrorCode, StateMachine, SubscriptionId, Timestamp, UserId,
};
use serde::{Deserialize, Serialize};

use super::{SubscriptionPlan, SubscriptionStatus};

/// Subscription aggregate - one entitlement period for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Unique identifier for this subscription.
    pub id: SubscriptionId,

    /// User who owns this subscription.
    pub user_id: UserId,

    /// Plan determining feature access.
    pub plan: SubscriptionPlan,

    /// Current lifecycle status.
    pub status: SubscriptionStatus,

    /// When the entitlement began.
    pub started_at: Timestamp,

    /// When the entitlement ends. None = open-ended (free plan).
    pub ended_at: Option<Timestamp>,

    /// Payment provider that funded this entitlement, e.g. "MIDTRANS".
    pub provider: Option<String>,

    /// Provider-side reference: the id of the payment that last
    /// activated or extended this row.
    pub provider_reference_id: Option<String>,

    /// When the subscription row was created.
    pub created_at: Timestamp,

    /// When the subscription row was last updated.
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Create an open-ended free subscription.
    pub fn create_free(id: SubscriptionId, user_id: UserId) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            user_id,
            plan: SubscriptionPlan::Free,
            status: SubscriptionStatus::Active,
            started_at: now,
            ended_at: None,
            provider: None,
            provider_reference_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a trial subscription running for the given number of days.
    pub fn create_trial(id: SubscriptionId, user_id: UserId, days: i64) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            user_id,
            plan: SubscriptionPlan::Trial,
            status: SubscriptionStatus::Active,
            started_at: now,
            ended_at: Some(now.add_days(days)),
            provider: None,
            provider_reference_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a premium subscription running for the given number of days.
    pub fn create_premium(id: SubscriptionId, user_id: UserId, days: i64) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            user_id,
            plan: SubscriptionPlan::Premium,
            status: SubscriptionStatus::Active,
            started_at: now,
            ended_at: Some(now.add_days(days)),
            provider: None,
            provider_reference_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record the payment that funded this entitlement.
    pub fn record_provider_reference(
        &mut self,
        provider: impl Into<String>,
        reference: impl Into<String>,
    ) {
        self.provider = Some(provider.into());
        self.provider_reference_id = Some(reference.into());
        self.updated_at = Timestamp::now();
    }

    /// Check if this subscription is currently in effect.
    pub fn is_active(&self, now: &Timestamp) -> bool {
        if self.status != SubscriptionStatus::Active {
            return false;
        }
        match &self.ended_at {
            Some(end) => end.is_after(now),
            None => true,
        }
    }

    /// Returns true for a premium-plan subscription.
    pub fn is_premium(&self) -> bool {
        self.plan == SubscriptionPlan::Premium
    }

    /// Returns true for a trial-plan subscription.
    pub fn is_trial(&self) -> bool {
        self.plan == SubscriptionPlan::Trial
    }

    /// Extend the entitlement by the given number of days.
    ///
    /// The new deadline is `max(ended_at, now) + days`: a row that already
    /// lapsed extends from now, so the buyer always receives the full
    /// purchased period.
    ///
    /// # Errors
    ///
    /// Returns error if the subscription is not Active or has no deadline.
    pub fn extend_by(&mut self, days: i64, now: Timestamp) -> Result<(), DomainError> {
        if self.status != SubscriptionStatus::Active {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot extend subscription in {:?} status", self.status),
            ));
        }
        let base = match &self.ended_at {
            Some(end) => end.later_of(&now),
            None => {
                return Err(DomainError::new(
                    ErrorCode::InvalidStateTransition,
                    "Cannot extend an open-ended subscription",
                ))
            }
        };
        self.ended_at = Some(base.add_days(days));
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Cancel this subscription, closing the entitlement at `now`.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn cancel(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Cancelled)?;
        self.ended_at = Some(now);
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Mark this subscription as expired.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn expire(&mut self) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Expired)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Days remaining in the entitlement, 0 if lapsed or open-ended.
    pub fn days_remaining(&self, now: &Timestamp) -> u32 {
        match &self.ended_at {
            Some(end) if end.is_after(now) => end.duration_since(now).num_days().max(0) as u32,
            _ => 0,
        }
    }

    /// Transition to a new status using the state machine.
    fn transition_to(&mut self, target: SubscriptionStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Cannot transition subscription from {:?} to {:?}",
                    self.status, target
                ),
            )
        })?;
        Ok(())
    }
}
