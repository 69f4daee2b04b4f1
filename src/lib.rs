//! Spendtrack - Payment and subscription backend.
//!
//! This crate implements the payment transaction lifecycle, gateway webhook
//! reconciliation, and subscription activation for the Spendtrack service.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
