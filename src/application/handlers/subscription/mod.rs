//! Subscription use-case handlers.

mod activate_subscription;
mod cancel_subscription;
mod check_trial_eligibility;
mod create_free_subscription;
mod expire_subscriptions;
mod get_subscription;
mod start_trial;

pub use activate_subscription::{ActivateSubscriptionHandler, ActivationOutcome};
pub use cancel_subscription::CancelSubscriptionHandler;
pub use check_trial_eligibility::CheckTrialEligibilityHandler;
pub use create_free_subscription::CreateFreeSubscriptionHandler;
pub use expire_subscriptions::ExpireSubscriptionsHandler;
pub use get_subscription::{GetSubscriptionHandler, SubscriptionView};
pub use start_trial::StartTrialHandler;
