//! Subscription plan levels.

use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;
use serde::{Deserialize, Serialize};

/// Subscription plan determining feature access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionPlan {
    /// Default plan, open-ended, no paid features.
    Free,

    /// One-time evaluation period with premium features.
    Trial,

    /// Paid plan purchased through the gateway.
    Premium,
}

impl SubscriptionPlan {
    /// Returns true for plans that unlock premium features.
    pub fn grants_premium(&self) -> bool {
        matches!(self, SubscriptionPlan::Trial | SubscriptionPlan::Premium)
    }

    /// Database and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Free => "FREE",
            SubscriptionPlan::Trial => "TRIAL",
            SubscriptionPlan::Premium => "PREMIUM",
        }
    }
}

impl fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionPlan {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FREE" => Ok(SubscriptionPlan::Free),
            "TRIAL" => Ok(SubscriptionPlan::Trial),
            "PREMIUM" => Ok(SubscriptionPlan::Premium),
            other => Err(ValidationError::invalid_format(
                "subscription_plan",
                format!("unknown plan: {other}"),
            )),
        }
    }
}
