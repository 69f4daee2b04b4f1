//! Money value object.
//!
//! All monetary values are stored as i64 cents (never floats). The gateway
//! signs amounts as strings like "25000.00", so the exact string rendering
//! matters and lives here.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// A monetary amount in integer cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money from integer cents.
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Creates a Money from whole currency units (e.g. 25000 IDR).
    pub fn from_major_units(units: i64) -> Self {
        Self(units * 100)
    }

    /// Returns the amount in cents.
    pub fn as_cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit part of the amount.
    pub fn major_units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns true if the amount is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Validates that the amount is strictly positive.
    pub fn require_positive(&self, field: &str) -> Result<(), ValidationError> {
        if self.is_positive() {
            Ok(())
        } else {
            Err(ValidationError::not_positive(field, self.0))
        }
    }

    /// Renders the amount in the gateway's gross_amount format: "25000.00".
    ///
    /// This string participates in webhook signature computation, so it must
    /// be stable: whole units, a dot, and exactly two cent digits.
    pub fn gross_amount(&self) -> String {
        format!("{}.{:02}", self.0 / 100, (self.0 % 100).abs())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.gross_amount())
    }
}
