//! Midtrans Snap API wire types.

use serde::{Deserialize, Serialize};

/// Request body for `POST /snap/v1/transactions`.
#[derive(Debug, Serialize)]
pub struct SnapTransactionRequest {
    pub transaction_details: TransactionDetails,
    pub item_details: Vec<ItemDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_details: Option<CustomerDetails>,
    pub enabled_payments: Vec<&'static str>,
    pub expiry: Expiry,
}

/// Order id and total, in whole IDR units.
#[derive(Debug, Serialize)]
pub struct TransactionDetails {
    pub order_id: String,
    pub gross_amount: i64,
}

#[derive(Debug, Serialize)]
pub struct ItemDetail {
    pub id: String,
    pub price: i64,
    pub quantity: u32,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CustomerDetails {
    pub email: String,
}

/// Checkout expiry window.
#[derive(Debug, Serialize)]
pub struct Expiry {
    pub unit: &'static str,
    pub duration: u32,
}

/// Successful response from the Snap API.
#[derive(Debug, Deserialize)]
pub struct SnapTransactionResponse {
    pub token: String,
    pub redirect_url: String,
}
