//! Metrics port - counters and durations for operational monitoring.

use std::time::Duration;

/// Port for recording operational counters and timings.
///
/// Implementations must be cheap: handlers record on hot paths (every
/// webhook delivery).
pub trait Metrics: Send + Sync {
    /// Increment a named counter by one.
    fn increment(&self, counter: &str);

    /// Record how long an operation took, tagged with its outcome
    /// ("success" or "error").
    fn record_duration(&self, timer: &str, outcome: &str, elapsed: Duration);
}

/// Counter names used across the application layer.
pub mod counters {
    pub const WEBHOOK_INVALID_SIGNATURE: &str = "webhook.invalid_signature";
    pub const WEBHOOK_PROCESSED_TOTAL: &str = "webhook.processed.total";
    pub const PAYMENT_CREATED_TOTAL: &str = "payment.created.total";
    pub const SUBSCRIPTION_ACTIVATION_FAILED: &str = "subscription.activation.failed";
}

/// Timer names used across the application layer.
pub mod timers {
    pub const PAYMENT_CREATE_DURATION: &str = "payment.create.duration";
    pub const WEBHOOK_PROCESS_DURATION: &str = "webhook.process.duration";
}
