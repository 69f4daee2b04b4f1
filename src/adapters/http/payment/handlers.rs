//! HTTP handlers for payment endpoints.
//!
//! These handlers connect axum routes to application layer command/query
//! handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::application::handlers::payment::{
    CreatePaymentCommand, CreatePaymentHandler, CreatePaymentResult, GetPaymentHandler,
    GetPaymentQuery, ProcessWebhookCommand, ProcessWebhookHandler,
};
use crate::application::handlers::subscription::ActivateSubscriptionHandler;
use crate::domain::payment::{MidtransWebhookPayload, SignatureVerifier};
use crate::ports::{EventPublisher, Metrics, PaymentGateway, PaymentStore, SubscriptionStore};

use super::super::{ApiError, AuthenticatedUser};
use super::dto::{CreatePaymentRequest, PaymentResponse, WebhookAckResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for payment routes.
///
/// Cloned per request; all dependencies are Arc-wrapped.
#[derive(Clone)]
pub struct PaymentAppState {
    pub payments: Arc<dyn PaymentStore>,
    pub subscriptions: Arc<dyn SubscriptionStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub verifier: Arc<SignatureVerifier>,
    pub events: Arc<dyn EventPublisher>,
    pub metrics: Arc<dyn Metrics>,
}

impl PaymentAppState {
    /// Create handlers on demand from the shared state.
    pub fn create_payment_handler(&self) -> CreatePaymentHandler {
        CreatePaymentHandler::new(
            self.payments.clone(),
            self.gateway.clone(),
            self.events.clone(),
            self.metrics.clone(),
        )
    }

    pub fn get_payment_handler(&self) -> GetPaymentHandler {
        GetPaymentHandler::new(self.payments.clone())
    }

    pub fn process_webhook_handler(&self) -> ProcessWebhookHandler {
        let activation = Arc::new(ActivateSubscriptionHandler::new(
            self.subscriptions.clone(),
            self.events.clone(),
        ));
        ProcessWebhookHandler::new(
            self.payments.clone(),
            self.verifier.clone(),
            activation,
            self.events.clone(),
            self.metrics.clone(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/payments - Create (or return the open) subscription payment
pub async fn create_payment(
    State(state): State<PaymentAppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.create_payment_handler();
    let cmd = CreatePaymentCommand {
        user_id: user.user_id,
        email: request.email,
        idempotency_key: request.idempotency_key,
    };

    let result = handler.handle(cmd).await?;

    let (status, payment) = match result {
        CreatePaymentResult::Created(payment) => (StatusCode::CREATED, payment),
        CreatePaymentResult::Existing(payment) => (StatusCode::OK, payment),
    };

    Ok((status, Json(PaymentResponse::from(payment))))
}

/// GET /api/payments/:order_id - Get the caller's payment by order id
pub async fn get_payment(
    State(state): State<PaymentAppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.get_payment_handler();
    let query = GetPaymentQuery {
        order_id,
        user_id: user.user_id,
    };

    let payment = handler.handle(query).await?;

    Ok(Json(PaymentResponse::from(payment)))
}

/// POST /api/webhooks/midtrans - Handle gateway payment notifications
///
/// No authentication header here; the payload carries its own SHA-512
/// signature. Duplicate deliveries are acknowledged with 200 so the
/// gateway stops retrying.
pub async fn handle_midtrans_webhook(
    State(state): State<PaymentAppState>,
    Json(payload): Json<MidtransWebhookPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.process_webhook_handler();
    handler.handle(ProcessWebhookCommand { payload }).await?;

    Ok((StatusCode::OK, Json(WebhookAckResponse::ok())))
}
