//! Payment status state machine.
//!
//! Defines all possible payment transaction states and valid transitions
//! according to the gateway settlement lifecycle.

use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};
use serde::{Deserialize, Serialize};

/// Payment transaction status.
///
/// Represents where a transaction sits in the gateway settlement
/// lifecycle. A transaction is created Pending and reaches exactly
/// one outcome state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Awaiting customer action or gateway settlement.
    Pending,

    /// Settled or captured. Money moved. Terminal and exclusive:
    /// nothing else may become Success, and Success never changes.
    Success,

    /// Denied by the gateway or fraud screening. Terminal.
    Failed,

    /// Customer never paid before the deadline. May still be
    /// administratively cancelled.
    Expired,

    /// Cancelled by the customer or by an operator. Terminal.
    Cancelled,
}

impl PaymentStatus {
    /// Returns true once the payment has left Pending.
    ///
    /// A webhook arriving for a final payment is a duplicate delivery
    /// and must be acknowledged without changing state. Note that
    /// Expired counts as final here even though the state machine still
    /// permits Expired -> Cancelled for operator cleanup.
    pub fn is_final(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    /// Database and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Success => "SUCCESS",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Expired => "EXPIRED",
            PaymentStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "SUCCESS" => Ok(PaymentStatus::Success),
            "FAILED" => Ok(PaymentStatus::Failed),
            "EXPIRED" => Ok(PaymentStatus::Expired),
            "CANCELLED" => Ok(PaymentStatus::Cancelled),
            other => Err(ValidationError::invalid_format(
                "payment_status",
                format!("unknown status: {other}"),
            )),
        }
    }
}

impl StateMachine for PaymentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, target),
            // From PENDING
            (Pending, Success)
                | (Pending, Failed)
                | (Pending, Expired)
                | (Pending, Cancelled)
            // From EXPIRED
                | (Expired, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PaymentStatus::*;
        match self {
            Pending => vec![Success, Failed, Expired, Cancelled],
            Expired => vec![Cancelled],
            Success => vec![],
            Failed => vec![],
            Cancelled => vec![],
        }
    }
}
