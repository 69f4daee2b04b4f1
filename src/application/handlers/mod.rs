//! Use-case handlers grouped by aggregate.

pub mod payment;
pub mod subscription;
