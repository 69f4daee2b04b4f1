//! Axum router configuration for subscription endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    cancel_subscription, create_free_subscription, get_subscription, start_trial,
    SubscriptionAppState,
};

/// Create the subscription API router.
///
/// # Routes (all require authentication)
/// - `GET /me` - Current subscription with derived flags
/// - `DELETE /me` - Cancel the active subscription
/// - `POST /trial` - Start the one-time 14-day trial
/// - `POST /free` - Ensure a subscription row exists (free default)
pub fn subscription_routes() -> Router<SubscriptionAppState> {
    Router::new()
        .route("/me", get(get_subscription).delete(cancel_subscription))
        .route("/trial", post(start_trial))
        .route("/free", post(create_free_subscription))
}
