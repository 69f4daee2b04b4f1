//! Midtrans Snap API adapter.

mod client;
mod types;

pub use client::MidtransSnapClient;
