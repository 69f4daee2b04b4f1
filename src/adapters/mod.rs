//! Adapter implementations of the application ports.

pub mod http;
pub mod midtrans;
pub mod observability;
pub mod postgres;
