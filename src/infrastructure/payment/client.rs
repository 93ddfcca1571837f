//! HTTP client for the hosted payment provider
//!
//! Speaks the provider's REST dialect: form-encoded writes, JSON reads,
//! bearer authentication with the secret key. The key is owned by the
//! client instance; nothing in the process holds it globally.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::application::ports::{
    BalanceTransaction, Charge, Customer, NewBalanceTransaction, PaymentIntent, PaymentProvider,
    ProviderError, ProviderResult, Refund,
};
use crate::config::PaymentConfig;

pub struct StripeGatewayClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl StripeGatewayClient {
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ProviderResult<T> {
        debug!("GET {}", path);
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        decode_response(response).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> ProviderResult<T> {
        debug!("POST {}", path);
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .form(form)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        decode_response(response).await
    }
}

async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> ProviderResult<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::Request(e.to_string()))?;

    if status.is_success() {
        serde_json::from_str(&body).map_err(|e| ProviderError::Request(e.to_string()))
    } else {
        Err(error_from_body(status, &body))
    }
}

fn error_from_body(status: StatusCode, body: &str) -> ProviderError {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if envelope.error.code.as_deref() == Some("resource_missing") {
            return ProviderError::ResourceMissing(
                envelope.error.message.unwrap_or_else(|| "resource_missing".to_string()),
            );
        }
        if let Some(message) = envelope.error.message {
            return ProviderError::Request(format!("{}: {}", status, message));
        }
    }
    ProviderError::Request(format!("{}: {}", status, body))
}

// ── Wire types ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListObject<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct CustomerObject {
    id: String,
    email: Option<String>,
    #[serde(default)]
    balance: i64,
}

impl From<CustomerObject> for Customer {
    fn from(c: CustomerObject) -> Self {
        Customer {
            id: c.id,
            email: c.email.unwrap_or_default(),
            balance: c.balance,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PaymentIntentObject {
    id: String,
    client_secret: String,
    status: String,
    amount: i64,
    customer: Option<String>,
    latest_charge: Option<String>,
}

impl From<PaymentIntentObject> for PaymentIntent {
    fn from(p: PaymentIntentObject) -> Self {
        PaymentIntent {
            id: p.id,
            client_secret: p.client_secret,
            status: p.status,
            amount: p.amount,
            customer_id: p.customer.unwrap_or_default(),
            latest_charge: p.latest_charge,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChargeObject {
    id: String,
    amount: i64,
    currency: String,
    description: Option<String>,
    status: String,
    created: i64,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

impl From<ChargeObject> for Charge {
    fn from(c: ChargeObject) -> Self {
        Charge {
            id: c.id,
            amount: c.amount,
            currency: c.currency,
            description: c.description,
            status: c.status,
            created: c.created,
            metadata: c.metadata,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BalanceTransactionObject {
    id: String,
    amount: i64,
    currency: String,
    description: Option<String>,
    created: i64,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

impl From<BalanceTransactionObject> for BalanceTransaction {
    fn from(tx: BalanceTransactionObject) -> Self {
        BalanceTransaction {
            id: tx.id,
            amount: tx.amount,
            currency: tx.currency,
            description: tx.description,
            created: tx.created,
            metadata: tx.metadata,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RefundObject {
    id: String,
    status: String,
}

// ── PaymentProvider impl ────────────────────────────────────────

#[async_trait]
impl PaymentProvider for StripeGatewayClient {
    async fn find_customer_by_email(&self, email: &str) -> ProviderResult<Option<Customer>> {
        let list: ListObject<CustomerObject> = self
            .get("/customers", &[("email", email), ("limit", "1")])
            .await?;
        Ok(list.data.into_iter().next().map(Customer::from))
    }

    async fn create_customer(&self, email: &str) -> ProviderResult<Customer> {
        let customer: CustomerObject = self
            .post("/customers", &[("email".to_string(), email.to_string())])
            .await?;
        Ok(customer.into())
    }

    async fn retrieve_customer(&self, customer_id: &str) -> ProviderResult<Customer> {
        let customer: CustomerObject = self
            .get(&format!("/customers/{}", customer_id), &[])
            .await?;
        Ok(customer.into())
    }

    async fn create_payment_intent(
        &self,
        customer: &Customer,
        amount: i64,
        currency: &str,
    ) -> ProviderResult<PaymentIntent> {
        let form = vec![
            ("amount".to_string(), amount.to_string()),
            ("currency".to_string(), currency.to_string()),
            ("customer".to_string(), customer.id.clone()),
            ("receipt_email".to_string(), customer.email.clone()),
            (
                "automatic_payment_methods[enabled]".to_string(),
                "true".to_string(),
            ),
        ];
        let intent: PaymentIntentObject = self.post("/payment_intents", &form).await?;
        Ok(intent.into())
    }

    async fn retrieve_payment_intent(&self, intent_id: &str) -> ProviderResult<PaymentIntent> {
        let intent: PaymentIntentObject = self
            .get(&format!("/payment_intents/{}", intent_id), &[])
            .await?;
        Ok(intent.into())
    }

    async fn retrieve_charge(&self, charge_id: &str) -> ProviderResult<Charge> {
        let charge: ChargeObject = self.get(&format!("/charges/{}", charge_id), &[]).await?;
        Ok(charge.into())
    }

    async fn list_charges(&self, customer_id: &str) -> ProviderResult<Vec<Charge>> {
        let list: ListObject<ChargeObject> = self
            .get("/charges", &[("customer", customer_id)])
            .await?;
        Ok(list.data.into_iter().map(Charge::from).collect())
    }

    async fn update_charge_description(
        &self,
        charge_id: &str,
        description: &str,
    ) -> ProviderResult<Charge> {
        let form = vec![("description".to_string(), description.to_string())];
        let charge: ChargeObject = self.post(&format!("/charges/{}", charge_id), &form).await?;
        Ok(charge.into())
    }

    async fn update_charge_metadata(
        &self,
        charge_id: &str,
        metadata: HashMap<String, String>,
    ) -> ProviderResult<Charge> {
        let form: Vec<(String, String)> = metadata
            .into_iter()
            .map(|(k, v)| (format!("metadata[{}]", k), v))
            .collect();
        let charge: ChargeObject = self.post(&format!("/charges/{}", charge_id), &form).await?;
        Ok(charge.into())
    }

    async fn create_balance_transaction(
        &self,
        customer_id: &str,
        params: NewBalanceTransaction,
    ) -> ProviderResult<BalanceTransaction> {
        let mut form = vec![
            ("amount".to_string(), params.amount.to_string()),
            ("currency".to_string(), params.currency),
            ("description".to_string(), params.description),
        ];
        form.extend(
            params
                .metadata
                .into_iter()
                .map(|(k, v)| (format!("metadata[{}]", k), v)),
        );
        let tx: BalanceTransactionObject = self
            .post(
                &format!("/customers/{}/balance_transactions", customer_id),
                &form,
            )
            .await?;
        Ok(tx.into())
    }

    async fn list_balance_transactions(
        &self,
        customer_id: &str,
    ) -> ProviderResult<Vec<BalanceTransaction>> {
        let list: ListObject<BalanceTransactionObject> = self
            .get(
                &format!("/customers/{}/balance_transactions", customer_id),
                &[],
            )
            .await?;
        Ok(list.data.into_iter().map(BalanceTransaction::from).collect())
    }

    async fn retrieve_balance_transaction(
        &self,
        customer_id: &str,
        transaction_id: &str,
    ) -> ProviderResult<BalanceTransaction> {
        let tx: BalanceTransactionObject = self
            .get(
                &format!(
                    "/customers/{}/balance_transactions/{}",
                    customer_id, transaction_id
                ),
                &[],
            )
            .await?;
        Ok(tx.into())
    }

    async fn create_refund(&self, charge_id: &str) -> ProviderResult<Refund> {
        let form = vec![("charge".to_string(), charge_id.to_string())];
        let refund: RefundObject = self.post("/refunds", &form).await?;
        Ok(Refund {
            id: refund.id,
            status: refund.status,
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────
