//! Outbound ports: payment provider and mail
//!
//! The payment provider is an external hosted ledger reached over its public
//! REST API. This module defines the slice of that contract the application
//! uses: customers keyed by email, a per-customer balance-transaction ledger,
//! payment intents, charges and refunds. Amounts are minor currency units
//! throughout; timestamps are provider epoch seconds.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

/// Error returned by the payment provider client
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The referenced object does not exist (`resource_missing`)
    #[error("No such resource: {0}")]
    ResourceMissing(String),

    /// Any other provider-side or transport failure
    #[error("Provider request failed: {0}")]
    Request(String),
}

impl ProviderError {
    pub fn is_resource_missing(&self) -> bool {
        matches!(self, Self::ResourceMissing(_))
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Provider customer record
#[derive(Debug, Clone)]
pub struct Customer {
    pub id: String,
    pub email: String,
    /// Current balance in minor currency units
    pub balance: i64,
}

/// Provider-side handle for an attempted/pending card payment
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    /// Provider status string, e.g. "succeeded", "processing"
    pub status: String,
    /// Amount in minor currency units
    pub amount: i64,
    pub customer_id: String,
    /// ID of the most recent charge, once one exists
    pub latest_charge: Option<String>,
}

/// A completed card payment record
#[derive(Debug, Clone, Default)]
pub struct Charge {
    pub id: String,
    /// Amount in minor currency units
    pub amount: i64,
    pub currency: String,
    pub description: Option<String>,
    pub status: String,
    /// Creation time, epoch seconds
    pub created: i64,
    pub metadata: HashMap<String, String>,
}

/// An entry in the per-customer balance ledger (signed minor units)
#[derive(Debug, Clone)]
pub struct BalanceTransaction {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub description: Option<String>,
    /// Creation time, epoch seconds
    pub created: i64,
    pub metadata: HashMap<String, String>,
}

/// Parameters for appending a ledger entry
#[derive(Debug, Clone)]
pub struct NewBalanceTransaction {
    pub amount: i64,
    pub currency: String,
    pub description: String,
    pub metadata: HashMap<String, String>,
}

/// A provider-level refund of a charge
#[derive(Debug, Clone)]
pub struct Refund {
    pub id: String,
    pub status: String,
}

/// Payment provider API, as used by [`PaymentService`](crate::application::PaymentService).
///
/// Credentials live inside the implementation; callers never touch keys.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// First customer matching the email, if any
    async fn find_customer_by_email(&self, email: &str) -> ProviderResult<Option<Customer>>;

    async fn create_customer(&self, email: &str) -> ProviderResult<Customer>;

    async fn retrieve_customer(&self, customer_id: &str) -> ProviderResult<Customer>;

    /// Create a payment intent with automatic payment-method selection
    /// and a receipt sent to the customer email.
    async fn create_payment_intent(
        &self,
        customer: &Customer,
        amount: i64,
        currency: &str,
    ) -> ProviderResult<PaymentIntent>;

    async fn retrieve_payment_intent(&self, intent_id: &str) -> ProviderResult<PaymentIntent>;

    async fn retrieve_charge(&self, charge_id: &str) -> ProviderResult<Charge>;

    async fn list_charges(&self, customer_id: &str) -> ProviderResult<Vec<Charge>>;

    async fn update_charge_description(
        &self,
        charge_id: &str,
        description: &str,
    ) -> ProviderResult<Charge>;

    async fn update_charge_metadata(
        &self,
        charge_id: &str,
        metadata: HashMap<String, String>,
    ) -> ProviderResult<Charge>;

    async fn create_balance_transaction(
        &self,
        customer_id: &str,
        params: NewBalanceTransaction,
    ) -> ProviderResult<BalanceTransaction>;

    async fn list_balance_transactions(
        &self,
        customer_id: &str,
    ) -> ProviderResult<Vec<BalanceTransaction>>;

    async fn retrieve_balance_transaction(
        &self,
        customer_id: &str,
        transaction_id: &str,
    ) -> ProviderResult<BalanceTransaction>;

    async fn create_refund(&self, charge_id: &str) -> ProviderResult<Refund>;
}

/// Outbound mail. Fire and forget, best effort: implementations log
/// failures and never surface them to callers.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_payment_confirmation(&self, to: &str);
}
