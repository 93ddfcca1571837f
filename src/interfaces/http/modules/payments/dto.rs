//! Payment DTOs
//!
//! Amounts cross the API in major currency units. Several operations
//! report their outcome as a provider status string ("success",
//! "insufficient-balance", refund messages); those pass through verbatim
//! in `status`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::services::{PaymentIntentHandle, TransactionRecord};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateIntentRequest {
    /// Top-up amount in major currency units
    #[validate(range(min = 0.0, message = "amount must not be negative"))]
    pub amount: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IntentDto {
    pub client_secret: String,
    pub intent_id: String,
}

impl From<PaymentIntentHandle> for IntentDto {
    fn from(handle: PaymentIntentHandle) -> Self {
        Self {
            client_secret: handle.client_secret,
            intent_id: handle.intent_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentStatusDto {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceDto {
    /// Balance in major currency units
    pub balance: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionDto {
    pub id: String,
    /// "customer_balance_transaction" or "charge"
    pub object: String,
    /// Amount in major currency units
    pub amount: f64,
    pub currency: String,
    pub description: Option<String>,
    /// Creation time, epoch seconds
    pub created: i64,
    pub status: Option<String>,
}

impl From<TransactionRecord> for TransactionDto {
    fn from(record: TransactionRecord) -> Self {
        Self {
            id: record.id,
            object: record.object,
            amount: record.amount,
            currency: record.currency,
            description: record.description,
            created: record.created,
            status: record.status,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PayRequest {
    /// Amount to debit, in major currency units
    #[validate(range(min = 0.0, message = "amount must not be negative"))]
    pub amount: f64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CardRefundRequest {
    #[validate(length(min = 1, message = "charge id is required"))]
    pub charge_id: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BalanceRefundRequest {
    #[validate(length(min = 1, message = "transaction id is required"))]
    pub transaction_id: String,
}
