//! Axum router configuration for payment endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{create_payment, get_payment, handle_midtrans_webhook, PaymentAppState};

/// Create the payment API router.
///
/// # Routes
///
/// ## User Endpoints (require authentication)
/// - `POST /` - Create a subscription payment (idempotent per user)
/// - `GET /:order_id` - Get the caller's payment by order id
pub fn payment_routes() -> Router<PaymentAppState> {
    Router::new()
        .route("/", post(create_payment))
        .route("/:order_id", get(get_payment))
}

/// Create the gateway webhook router.
///
/// Separate from the payment routes because webhook deliveries carry no
/// user authentication; they are verified by signature.
///
/// # Routes
/// - `POST /midtrans` - Handle Midtrans payment notifications
pub fn webhook_routes() -> Router<PaymentAppState> {
    Router::new().route("/midtrans", post(handle_midtrans_webhook))
}
