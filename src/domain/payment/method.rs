//! Payment method classification.

use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;
use serde::{Deserialize, Serialize};

/// Payment method as recorded on a transaction.
///
/// Derived from the gateway's free-form `payment_type` string. Unknown
/// types collapse to `Other` rather than failing the webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    CreditCard,
    BankTransfer,
    Ewallet,
    ConvenienceStore,
    Kredivo,
    Akulaku,
    Other,
}

impl PaymentMethod {
    /// Maps a gateway `payment_type` string to a method.
    pub fn from_gateway_type(payment_type: &str) -> Self {
        match payment_type {
            "credit_card" => PaymentMethod::CreditCard,
            "bank_transfer" | "echannel" => PaymentMethod::BankTransfer,
            "gopay" | "shopeepay" | "qris" => PaymentMethod::Ewallet,
            "cstore" => PaymentMethod::ConvenienceStore,
            "kredivo" => PaymentMethod::Kredivo,
            "akulaku" => PaymentMethod::Akulaku,
            _ => PaymentMethod::Other,
        }
    }

    /// Database and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "CREDIT_CARD",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
            PaymentMethod::Ewallet => "EWALLET",
            PaymentMethod::ConvenienceStore => "CONVENIENCE_STORE",
            PaymentMethod::Kredivo => "KREDIVO",
            PaymentMethod::Akulaku => "AKULAKU",
            PaymentMethod::Other => "OTHER",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREDIT_CARD" => Ok(PaymentMethod::CreditCard),
            "BANK_TRANSFER" => Ok(PaymentMethod::BankTransfer),
            "EWALLET" => Ok(PaymentMethod::Ewallet),
            "CONVENIENCE_STORE" => Ok(PaymentMethod::ConvenienceStore),
            "KREDIVO" => Ok(PaymentMethod::Kredivo),
            "AKULAKU" => Ok(PaymentMethod::Akulaku),
            "OTHER" => Ok(PaymentMethod::Other),
            other => Err(ValidationError::invalid_format(
                "payment_method",
                format!("unknown method: {other}"),
            )),
        }
    }
}
