//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `PaymentStore` - Payment transaction persistence and the row-locked
//!   webhook unit of work (`WebhookTxn`)
//! - `SubscriptionStore` - Subscription persistence and lifecycle queries
//!
//! ## Integration Ports
//!
//! - `PaymentGateway` - Checkout session creation at the payment gateway
//! - `EventPublisher` - Business event publication (fire-and-forget)
//! - `Metrics` - Counter increments for operational monitoring

mod event_publisher;
mod metrics;
mod payment_gateway;
mod payment_store;
mod subscription_store;

pub use event_publisher::{BusinessEvent, EventPublisher};
pub use metrics::{counters, timers, Metrics};
pub use payment_gateway::{CheckoutSession, PaymentGateway};
pub use payment_store::{PaymentStore, WebhookTxn};
pub use subscription_store::SubscriptionStore;
