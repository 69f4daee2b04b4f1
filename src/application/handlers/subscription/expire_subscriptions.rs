//! ExpireSubscriptionsHandler - periodic deadline sweep.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::SubscriptionStore;

/// Handler that expires every active subscription past its deadline.
///
/// Intended to run on a periodic schedule. The sweep is a single bulk
/// statement in the store, so a large backlog does not hold row locks
/// one at a time.
pub struct ExpireSubscriptionsHandler {
    subscriptions: Arc<dyn SubscriptionStore>,
}

impl ExpireSubscriptionsHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionStore>) -> Self {
        Self { subscriptions }
    }

    /// Returns the number of subscriptions expired.
    pub async fn handle(&self) -> Result<u64, DomainError> {
        let now = Timestamp::now();
        let expired = self.subscriptions.expire_due(&now).await?;
        if expired > 0 {
            info!(expired, "expired lapsed subscriptions");
        }
        Ok(expired)
    }
}
