//! Observability adapters backed by `tracing`.
//!
//! Business events and counters are emitted as structured log records.
//! A log pipeline (or a future metrics backend) picks them up downstream;
//! the application layer only sees the ports.

mod event_log;
mod metrics_log;

pub use event_log::TracingEventPublisher;
pub use metrics_log::TracingMetrics;
