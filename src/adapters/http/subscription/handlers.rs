//! HTTP handlers for subscription endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::application::handlers::subscription::{
    CancelSubscriptionHandler, CheckTrialEligibilityHandler, CreateFreeSubscriptionHandler,
    GetSubscriptionHandler, StartTrialHandler,
};
use crate::ports::{EventPublisher, PaymentStore, SubscriptionStore};

use super::super::{ApiError, AuthenticatedUser};
use super::dto::SubscriptionResponse;

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for subscription routes.
#[derive(Clone)]
pub struct SubscriptionAppState {
    pub subscriptions: Arc<dyn SubscriptionStore>,
    pub payments: Arc<dyn PaymentStore>,
    pub events: Arc<dyn EventPublisher>,
}

impl SubscriptionAppState {
    pub fn get_subscription_handler(&self) -> GetSubscriptionHandler {
        GetSubscriptionHandler::new(self.subscriptions.clone())
    }

    pub fn start_trial_handler(&self) -> StartTrialHandler {
        let eligibility = Arc::new(CheckTrialEligibilityHandler::new(
            self.subscriptions.clone(),
            self.payments.clone(),
        ));
        StartTrialHandler::new(self.subscriptions.clone(), eligibility, self.events.clone())
    }

    pub fn create_free_handler(&self) -> CreateFreeSubscriptionHandler {
        CreateFreeSubscriptionHandler::new(self.subscriptions.clone(), self.events.clone())
    }

    pub fn cancel_handler(&self) -> CancelSubscriptionHandler {
        CancelSubscriptionHandler::new(self.subscriptions.clone(), self.events.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/subscriptions/me - Current subscription with derived flags
///
/// A user without any subscription row sees the free default rather than
/// a 404: every account is implicitly on the free plan.
pub async fn get_subscription(
    State(state): State<SubscriptionAppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.get_subscription_handler();
    let view = handler.handle(&user.user_id).await?;

    let response = view
        .map(SubscriptionResponse::from)
        .unwrap_or_else(SubscriptionResponse::free_default);

    Ok(Json(response))
}

/// POST /api/subscriptions/trial - Start the one-time 14-day trial
pub async fn start_trial(
    State(state): State<SubscriptionAppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.start_trial_handler();
    let trial = handler.start(user.user_id).await?;

    Ok((StatusCode::CREATED, Json(SubscriptionResponse::from(trial))))
}

/// POST /api/subscriptions/free - Ensure the user has a subscription row
pub async fn create_free_subscription(
    State(state): State<SubscriptionAppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.create_free_handler();
    let subscription = handler.handle(user.user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubscriptionResponse::from(subscription)),
    ))
}

/// DELETE /api/subscriptions/me - Cancel the active subscription
pub async fn cancel_subscription(
    State(state): State<SubscriptionAppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.cancel_handler();
    handler.handle(user.user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
