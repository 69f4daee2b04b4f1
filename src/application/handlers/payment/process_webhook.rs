//! ProcessWebhookHandler - verifies and applies gateway payment
//! notifications.
//!
//! Processing is idempotent: duplicate deliveries of a notification for an
//! already-final payment commit nothing and report `Duplicate`. Concurrent
//! duplicates serialize on the payment row via [`WebhookTxn`].

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDateTime;
use serde_json::json;
use tracing::{info, warn};

use crate::application::handlers::subscription::ActivateSubscriptionHandler;
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::domain::payment::{
    MidtransWebhookPayload, PaymentMethod, PaymentStatus, SignatureVerifier,
};
use crate::ports::{counters, timers, BusinessEvent, EventPublisher, Metrics, PaymentStore};

/// Days of premium access granted per settled monthly payment.
const ACTIVATION_DAYS: i64 = 30;

/// Format the gateway uses for transaction_time and settlement_time.
const GATEWAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Command carrying a parsed webhook payload.
#[derive(Debug, Clone)]
pub struct ProcessWebhookCommand {
    pub payload: MidtransWebhookPayload,
}

/// What processing did with the notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessWebhookOutcome {
    /// The payment transitioned to a new status.
    Updated {
        order_id: String,
        status: PaymentStatus,
    },
    /// The notification carried no transition (still pending).
    Unchanged,
    /// The payment was already final; nothing happened.
    Duplicate,
}

/// Handler for gateway webhook notifications.
pub struct ProcessWebhookHandler {
    payments: Arc<dyn PaymentStore>,
    verifier: Arc<SignatureVerifier>,
    activation: Arc<ActivateSubscriptionHandler>,
    events: Arc<dyn EventPublisher>,
    metrics: Arc<dyn Metrics>,
}

impl ProcessWebhookHandler {
    pub fn new(
        payments: Arc<dyn PaymentStore>,
        verifier: Arc<SignatureVerifier>,
        activation: Arc<ActivateSubscriptionHandler>,
        events: Arc<dyn EventPublisher>,
        metrics: Arc<dyn Metrics>,
    ) -> Self {
        Self {
            payments,
            verifier,
            activation,
            events,
            metrics,
        }
    }

    pub async fn handle(
        &self,
        cmd: ProcessWebhookCommand,
    ) -> Result<ProcessWebhookOutcome, DomainError> {
        let started = Instant::now();
        let result = self.execute(&cmd.payload).await;
        let outcome = if result.is_ok() { "success" } else { "error" };
        self.metrics
            .record_duration(timers::WEBHOOK_PROCESS_DURATION, outcome, started.elapsed());
        result
    }

    async fn execute(
        &self,
        payload: &MidtransWebhookPayload,
    ) -> Result<ProcessWebhookOutcome, DomainError> {
        // 1. Verify the signature before touching any state. The
        //    gross_amount string is used verbatim: the gateway signed those
        //    exact bytes.
        if !self.verifier.verify(
            &payload.order_id,
            &payload.status_code,
            &payload.gross_amount,
            &payload.signature_key,
        ) {
            warn!(order_id = %payload.order_id, "webhook signature verification failed");
            self.metrics.increment(counters::WEBHOOK_INVALID_SIGNATURE);
            return Err(DomainError::new(
                ErrorCode::InvalidSignature,
                "webhook signature verification failed",
            ));
        }

        // 2. Lock the payment row for the duration of processing.
        let mut txn = self
            .payments
            .begin_webhook(&payload.order_id)
            .await?
            .ok_or_else(|| DomainError::payment_not_found(&payload.order_id))?;

        // 3. A final payment ignores further notifications.
        if txn.payment().is_final() {
            info!(
                order_id = %payload.order_id,
                status = %txn.payment().status,
                "duplicate webhook for final payment ignored"
            );
            txn.commit_unchanged().await?;
            return Ok(ProcessWebhookOutcome::Duplicate);
        }

        // 4. Store the raw notification for audit before any branching.
        let raw = serde_json::to_value(payload).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to serialize webhook payload: {}", e),
            )
        })?;
        txn.payment().record_webhook_payload(raw);

        // 5. Pending notifications carry no status transition; the gateway
        //    transaction id is recorded so the payment can be looked up at
        //    the gateway while it waits.
        if payload.indicates_pending() {
            let payment = txn.payment();
            payment.gateway_transaction_id = Some(payload.transaction_id.clone());
            payment.record_fraud_status(payload.fraud_status.clone());
            txn.save_and_commit().await?;
            self.finish(payload, None).await;
            return Ok(ProcessWebhookOutcome::Unchanged);
        }

        // 6. Apply the transition and commit.
        let payment = txn.payment();
        payment.record_fraud_status(payload.fraud_status.clone());
        if payload.indicates_success() {
            payment.payment_method = PaymentMethod::from_gateway_type(&payload.payment_type);
            payment.mark_success(
                settlement_timestamp(payload),
                Some(payload.transaction_id.clone()),
            )?;
        } else if payload.indicates_failure() {
            payment.mark_failed()?;
        } else if payload.indicates_cancellation() {
            payment.mark_cancelled()?;
        } else if payload.indicates_expiry() {
            payment.mark_expired(Timestamp::now())?;
        } else {
            // Dropping the txn rolls back and releases the lock.
            return Err(DomainError::validation(
                "transaction_status",
                format!("unknown transaction status: {}", payload.transaction_status),
            ));
        }

        let payment_id = payment.id;
        let user_id = payment.user_id;
        let status = payment.status;
        txn.save_and_commit().await?;

        // 7. Settled payments activate or extend the subscription, with the
        //    payment id kept as the provider back-reference. The payment
        //    commit already happened, so an activation failure is recorded
        //    but never fails the webhook.
        if status == PaymentStatus::Success {
            if let Err(e) = self
                .activation
                .activate(user_id, payment_id, ACTIVATION_DAYS)
                .await
            {
                warn!(
                    order_id = %payload.order_id,
                    error = %e,
                    "subscription activation failed after settled payment"
                );
                self.metrics
                    .increment(counters::SUBSCRIPTION_ACTIVATION_FAILED);
            }
        }

        info!(
            order_id = %payload.order_id,
            status = %status,
            transaction_status = %payload.transaction_status,
            "webhook processed"
        );
        self.finish(payload, Some(status)).await;

        Ok(ProcessWebhookOutcome::Updated {
            order_id: payload.order_id.clone(),
            status,
        })
    }

    async fn finish(&self, payload: &MidtransWebhookPayload, status: Option<PaymentStatus>) {
        let event = BusinessEvent::new(
            "payment.webhook_processed",
            json!({
                "order_id": payload.order_id,
                "transaction_status": payload.transaction_status,
                "status": status.map(|s| s.to_string()),
            }),
        );
        if let Err(e) = self.events.publish(event).await {
            warn!(order_id = %payload.order_id, error = %e, "failed to publish payment.webhook_processed");
        }
        self.metrics.increment(counters::WEBHOOK_PROCESSED_TOTAL);
    }
}

/// When the payment settled, per the gateway's clock.
///
/// Falls back to now when settlement_time is absent or malformed.
fn settlement_timestamp(payload: &MidtransWebhookPayload) -> Timestamp {
    payload
        .settlement_time
        .as_deref()
        .and_then(|s| NaiveDateTime::parse_from_str(s, GATEWAY_TIME_FORMAT).ok())
        .map(|dt| Timestamp::from_datetime(dt.and_utc()))
        .unwrap_or_else(Timestamp::now)
}
