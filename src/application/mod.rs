//! Application layer - use-case command and query handlers.

pub mod handlers;
