//! Subscription domain module.
//!
//! Handles subscription plans, lifecycle status, and period arithmetic.
//!
//! # Module Structure
//!
//! - `record` - Subscription aggregate entity
//! - `plan` - SubscriptionPlan levels
//! - `status` - SubscriptionStatus state machine

mod plan;
mod record;
mod status;

pub use plan::SubscriptionPlan;
pub use record::Subscription;
pub use status::SubscriptionStatus;
