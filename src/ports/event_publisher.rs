//! EventPublisher port - Interface for publishing business events.
//!
//! Events are observational: handlers publish them after state changes
//! for audit logging and downstream consumers. Publication failures are
//! logged by callers, never allowed to fail the originating operation.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::foundation::{DomainError, Timestamp};

/// A business event with a stable name and a JSON payload.
#[derive(Debug, Clone)]
pub struct BusinessEvent {
    /// Dotted event name, e.g. `payment.created`.
    pub name: String,

    /// Event payload (ids, statuses, amounts).
    pub payload: Value,

    /// When the event occurred.
    pub occurred_at: Timestamp,
}

impl BusinessEvent {
    /// Creates a new event occurring now.
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
            occurred_at: Timestamp::now(),
        }
    }
}

/// Port for publishing business events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    ///
    /// Delivery is at-least-once; consumers must tolerate duplicates.
    async fn publish(&self, event: BusinessEvent) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // Compile-time check that the trait is object-safe
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn EventPublisher) {}

    #[test]
    fn business_event_carries_name_and_payload() {
        let event = BusinessEvent::new("payment.created", json!({"order_id": "ORDER-abc-1"}));
        assert_eq!(event.name, "payment.created");
        assert_eq!(event.payload["order_id"], "ORDER-abc-1");
    }
}
