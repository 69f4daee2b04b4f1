//! HTTP adapters (axum).

mod auth;
mod error;
pub mod payment;
pub mod subscription;

pub use auth::{AuthenticatedUser, AuthenticationRequired};
pub use error::{ApiError, ErrorResponse};
