//! Payment service: card top-ups, balance ledger and refunds
//!
//! Wraps the hosted payment provider. Funds are added to a per-customer
//! balance through card payments (payment intents), then spent on parking
//! spots by debiting that balance. Refunds reverse the linked ledger entry
//! before refunding the card charge.
//!
//! Refund idempotency uses the structured `refund_of` metadata key on ledger
//! entries; the human-readable description is informational only.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info};

use crate::application::ports::{Customer, Mailer, NewBalanceTransaction, PaymentProvider};
use crate::domain::{DomainError, DomainResult};

/// Charge description marking a refunded charge
const REFUNDED_MARKER: &str = "refunded";
/// Charge metadata key linking a charge to the ledger entry it funded
const BALANCE_TRANSACTION_KEY: &str = "balance_transaction_id";
/// Ledger metadata key linking a refund entry to the entry it reverses
const REFUND_OF_KEY: &str = "refund_of";
/// Minimum card top-up in major currency units
const MIN_TOP_UP: f64 = 2.0;

/// Client-facing handle for a created payment intent
#[derive(Debug, Clone)]
pub struct PaymentIntentHandle {
    pub client_secret: String,
    pub intent_id: String,
}

/// One entry of the merged transaction history (ledger entries + charges)
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub id: String,
    /// Provider object kind: "customer_balance_transaction" or "charge"
    pub object: String,
    /// Amount in major currency units
    pub amount: f64,
    pub currency: String,
    pub description: Option<String>,
    /// Creation time, epoch seconds
    pub created: i64,
    /// Charge status; `None` for ledger entries
    pub status: Option<String>,
}

/// Payment gateway adapter
pub struct PaymentService {
    provider: Arc<dyn PaymentProvider>,
    mailer: Arc<dyn Mailer>,
    currency: String,
}

impl PaymentService {
    pub fn new(
        provider: Arc<dyn PaymentProvider>,
        mailer: Arc<dyn Mailer>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            mailer,
            currency: currency.into(),
        }
    }

    // ── Card top-up ────────────────────────────────────────────

    /// Create a payment intent for `amount` major units on the customer's
    /// card, creating the provider customer on first use.
    pub async fn create_payment_intent(
        &self,
        email: &str,
        amount: f64,
    ) -> DomainResult<PaymentIntentHandle> {
        if email.trim().is_empty() {
            return Err(DomainError::Payment("User email is required.".to_string()));
        }
        if amount < MIN_TOP_UP {
            return Err(DomainError::Payment(
                "Amount must be greater than 2.".to_string(),
            ));
        }

        let customer = self.get_or_create_customer(email).await.map_err(|e| {
            error!("Error creating payment intent: {}", e);
            DomainError::Payment("Error processing payment.".to_string())
        })?;

        let intent = self
            .provider
            .create_payment_intent(&customer, to_minor(amount), &self.currency)
            .await
            .map_err(|e| {
                error!("Error creating payment intent: {}", e);
                DomainError::Payment("Error processing payment.".to_string())
            })?;

        info!("Payment intent created: {}", intent.id);
        Ok(PaymentIntentHandle {
            client_secret: intent.client_secret,
            intent_id: intent.id,
        })
    }

    /// Resolve the outcome of a payment intent.
    ///
    /// On `succeeded` the charged amount is credited to the customer balance,
    /// the charge is tagged with the new ledger entry ID and a confirmation
    /// mail is sent. Every provider status is passed through unchanged; a
    /// provider error yields the sentinel `"payment-error"`.
    pub async fn handle_payment_result(&self, intent_id: &str) -> DomainResult<String> {
        let intent = match self.provider.retrieve_payment_intent(intent_id).await {
            Ok(intent) => intent,
            Err(e) => {
                error!("Error retrieving payment intent: {}", e);
                return Ok("payment-error".to_string());
            }
        };

        let Some(charge_id) = intent.latest_charge.clone() else {
            error!("Payment intent {} has no charge yet", intent_id);
            return Ok("payment-error".to_string());
        };

        let customer_email = match self.provider.retrieve_customer(&intent.customer_id).await {
            Ok(customer) => customer.email,
            Err(e) => {
                error!("Error retrieving customer email: {}", e);
                return Ok("payment-error".to_string());
            }
        };

        let amount_major = to_major(intent.amount);
        info!(
            intent_id,
            status = %intent.status,
            customer_email = %customer_email,
            amount = amount_major,
            "Payment result received"
        );

        match intent.status.as_str() {
            "succeeded" => {
                info!("Payment successful");
                self.mailer.send_payment_confirmation(&customer_email).await;

                if let Err(e) = self
                    .credit_balance(&customer_email, intent.amount, &charge_id)
                    .await
                {
                    if let DomainError::Payment(msg) = &e {
                        error!("Error crediting customer balance: {}", msg);
                        return Ok("payment-error".to_string());
                    }
                    return Err(e);
                }
            }
            "processing" => info!("Payment is processing"),
            "requires_action" => info!("Payment requires action"),
            "canceled" => info!("Payment canceled"),
            "requires_capture" => info!("Payment requires capture"),
            "requires_confirmation" => info!("Payment requires confirmation"),
            "requires_payment_method" => info!("Payment requires payment method"),
            other => info!("Payment status unknown: {}", other),
        }

        Ok(intent.status)
    }

    /// Append the funds to the customer ledger and tag the charge with the
    /// resulting ledger entry ID.
    async fn credit_balance(
        &self,
        customer_email: &str,
        amount: i64,
        charge_id: &str,
    ) -> DomainResult<()> {
        let customer = self
            .provider
            .find_customer_by_email(customer_email)
            .await
            .map_err(|e| DomainError::Payment(e.to_string()))?
            .ok_or_else(|| DomainError::NotFound {
                entity: "Customer",
                field: "email",
                value: customer_email.to_string(),
            })?;

        let balance_tx = self
            .provider
            .create_balance_transaction(
                &customer.id,
                NewBalanceTransaction {
                    amount,
                    currency: self.currency.clone(),
                    description: format!("Funds added {}", to_major(amount)),
                    metadata: HashMap::new(),
                },
            )
            .await
            .map_err(|e| DomainError::Payment(e.to_string()))?;

        let metadata = HashMap::from([(BALANCE_TRANSACTION_KEY.to_string(), balance_tx.id)]);
        self.provider
            .update_charge_metadata(charge_id, metadata)
            .await
            .map_err(|e| DomainError::Payment(e.to_string()))?;
        Ok(())
    }

    // ── Balance and history ────────────────────────────────────

    /// Current balance of the customer, in major currency units
    pub async fn retrieve_customer_balance(&self, email: &str) -> DomainResult<f64> {
        let customer = self.require_customer(email).await?;
        Ok(to_major(customer.balance))
    }

    /// Ledger entries and charges merged into one list, newest first
    pub async fn get_transactions_history(
        &self,
        email: &str,
    ) -> DomainResult<Vec<TransactionRecord>> {
        let customer = self.require_customer(email).await?;

        let balance_transactions = self
            .provider
            .list_balance_transactions(&customer.id)
            .await
            .map_err(|e| {
                DomainError::Payment(format!("Error retrieving customer transactions: {}", e))
            })?;
        let charges = self.provider.list_charges(&customer.id).await.map_err(|e| {
            DomainError::Payment(format!("Error retrieving customer transactions: {}", e))
        })?;

        let mut records: Vec<TransactionRecord> = balance_transactions
            .into_iter()
            .map(|tx| TransactionRecord {
                id: tx.id,
                object: "customer_balance_transaction".to_string(),
                amount: to_major(tx.amount),
                currency: tx.currency,
                description: tx.description,
                created: tx.created,
                status: None,
            })
            .collect();
        records.extend(charges.into_iter().map(|charge| TransactionRecord {
            id: charge.id,
            object: "charge".to_string(),
            amount: to_major(charge.amount),
            currency: charge.currency,
            description: charge.description,
            created: charge.created,
            status: Some(charge.status),
        }));

        records.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(records)
    }

    // ── Spending ───────────────────────────────────────────────

    /// Debit the customer balance by `amount` major units.
    ///
    /// Returns `"insufficient-balance"` without touching the ledger when the
    /// balance does not cover the amount, `"success"` otherwise.
    pub async fn pay_for_parking_spot(&self, email: &str, amount: f64) -> DomainResult<String> {
        let customer = self.require_customer(email).await?;

        let current_balance = to_major(customer.balance);
        if current_balance - amount < 0.0 {
            return Ok("insufficient-balance".to_string());
        }

        self.provider
            .create_balance_transaction(
                &customer.id,
                NewBalanceTransaction {
                    amount: -to_minor(amount),
                    currency: self.currency.clone(),
                    description: "Payment for parking spot".to_string(),
                    metadata: HashMap::new(),
                },
            )
            .await
            .map_err(|e| {
                DomainError::Payment(format!(
                    "Error creating customer balance transaction for parking spot: {}",
                    e
                ))
            })?;

        Ok("success".to_string())
    }

    // ── Refunds ────────────────────────────────────────────────

    /// Refund a card charge: reverse the linked ledger entry, create the
    /// provider refund and mark the charge refunded.
    ///
    /// A charge can be refunded at most once; all business-rule violations
    /// are returned as descriptive result strings.
    pub async fn create_card_payment_refund(
        &self,
        charge_id: &str,
        email: &str,
    ) -> DomainResult<String> {
        let charge = match self.provider.retrieve_charge(charge_id).await {
            Ok(charge) => charge,
            Err(e) if e.is_resource_missing() => {
                return Ok("The charge with the specified ID does not exist.".to_string());
            }
            Err(e) => return Err(DomainError::Payment(e.to_string())),
        };

        if charge.description.as_deref() == Some(REFUNDED_MARKER) {
            return Ok("This charge has already been refunded.".to_string());
        }

        let balance_transaction_id = charge
            .metadata
            .get(BALANCE_TRANSACTION_KEY)
            .map(|s| s.trim())
            .unwrap_or("");
        if balance_transaction_id.is_empty() {
            return Ok("Invalid balance transaction ID.".to_string());
        }

        let response = self
            .refund_customer_balance_transaction(balance_transaction_id, email)
            .await?;
        if response != "success" {
            return Ok(format!(
                "Error refunding the associated balance transaction: {}",
                response
            ));
        }

        let refund = self
            .provider
            .create_refund(charge_id)
            .await
            .map_err(|e| DomainError::Payment(e.to_string()))?;

        self.provider
            .update_charge_description(charge_id, REFUNDED_MARKER)
            .await
            .map_err(|e| DomainError::Payment(e.to_string()))?;

        info!(charge_id, status = %refund.status, "Card payment refunded");
        Ok(refund.status)
    }

    /// Reverse one ledger entry by appending its negation.
    ///
    /// Guards against refunding twice and against refunding a refund, using
    /// the `refund_of` metadata key as the idempotency link. Returns
    /// `"success"` or a descriptive failure string.
    pub async fn refund_customer_balance_transaction(
        &self,
        transaction_id: &str,
        email: &str,
    ) -> DomainResult<String> {
        match self.try_refund_balance_transaction(transaction_id, email).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!("Error refunding customer balance transaction: {}", e);
                Ok(format!(
                    "Error refunding customer balance transaction: {}",
                    e
                ))
            }
        }
    }

    async fn try_refund_balance_transaction(
        &self,
        transaction_id: &str,
        email: &str,
    ) -> Result<String, crate::application::ports::ProviderError> {
        if transaction_id.trim().is_empty() {
            return Ok("Invalid transaction ID.".to_string());
        }

        let Some(customer) = self.provider.find_customer_by_email(email).await? else {
            return Ok(format!("No customer found with email: {}", email));
        };

        let ledger = self.provider.list_balance_transactions(&customer.id).await?;
        let already_refunded = ledger
            .iter()
            .any(|tx| tx.metadata.get(REFUND_OF_KEY).map(String::as_str) == Some(transaction_id));
        if already_refunded {
            return Ok("A refund has already been issued for this transaction.".to_string());
        }

        let transaction = match self
            .provider
            .retrieve_balance_transaction(&customer.id, transaction_id)
            .await
        {
            Ok(tx) => tx,
            Err(e) if e.is_resource_missing() => {
                return Ok(
                    "The balance transaction with the specified ID does not exist.".to_string(),
                );
            }
            Err(e) => return Err(e),
        };

        if transaction.metadata.contains_key(REFUND_OF_KEY) {
            return Ok("This transaction is a refund.".to_string());
        }

        self.provider
            .create_balance_transaction(
                &customer.id,
                NewBalanceTransaction {
                    amount: -transaction.amount,
                    currency: transaction.currency.clone(),
                    description: format!("Refund for transaction: {}", transaction_id),
                    metadata: HashMap::from([(
                        REFUND_OF_KEY.to_string(),
                        transaction_id.to_string(),
                    )]),
                },
            )
            .await?;

        info!(transaction_id, "Balance transaction refunded");
        Ok("success".to_string())
    }

    // ── Helpers ────────────────────────────────────────────────

    async fn get_or_create_customer(
        &self,
        email: &str,
    ) -> Result<Customer, crate::application::ports::ProviderError> {
        match self.provider.find_customer_by_email(email).await? {
            Some(customer) => Ok(customer),
            None => self.provider.create_customer(email).await,
        }
    }

    async fn require_customer(&self, email: &str) -> DomainResult<Customer> {
        self.provider
            .find_customer_by_email(email)
            .await
            .map_err(|e| DomainError::Payment(e.to_string()))?
            .ok_or_else(|| DomainError::NotFound {
                entity: "Customer",
                field: "email",
                value: email.to_string(),
            })
    }
}

fn to_minor(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

fn to_major(amount: i64) -> f64 {
    amount as f64 / 100.0
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        BalanceTransaction, Charge, PaymentIntent, ProviderError, ProviderResult, Refund,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct ProviderState {
        customers: Vec<Customer>,
        intents: Vec<PaymentIntent>,
        charges: Vec<Charge>,
        // customer id -> ledger
        ledgers: HashMap<String, Vec<BalanceTransaction>>,
        refunds: Vec<Refund>,
    }

    /// In-memory stand-in for the hosted provider
    #[derive(Default)]
    struct FakeProvider {
        state: Mutex<ProviderState>,
        clock: AtomicI64,
        fail_all: std::sync::atomic::AtomicBool,
    }

    impl FakeProvider {
        fn tick(&self) -> i64 {
            self.clock.fetch_add(1, Ordering::SeqCst) + 1
        }

        fn check_up(&self) -> ProviderResult<()> {
            if self.fail_all.load(Ordering::SeqCst) {
                Err(ProviderError::Request("provider down".to_string()))
            } else {
                Ok(())
            }
        }

        fn seed_customer(&self, email: &str, balance: i64) -> String {
            let mut state = self.state.lock().unwrap();
            let id = format!("cus_{}", state.customers.len() + 1);
            state.customers.push(Customer {
                id: id.clone(),
                email: email.to_string(),
                balance,
            });
            state.ledgers.insert(id.clone(), Vec::new());
            id
        }

        fn seed_charge(&self, id: &str, amount: i64, metadata: HashMap<String, String>) {
            let created = self.tick();
            let mut state = self.state.lock().unwrap();
            state.charges.push(Charge {
                id: id.to_string(),
                amount,
                currency: "ron".to_string(),
                description: None,
                status: "succeeded".to_string(),
                created,
                metadata,
            });
        }

        fn seed_intent(&self, intent: PaymentIntent) {
            self.state.lock().unwrap().intents.push(intent);
        }

        fn ledger_len(&self, customer_id: &str) -> usize {
            self.state.lock().unwrap().ledgers[customer_id].len()
        }

        fn balance_of(&self, customer_id: &str) -> i64 {
            let state = self.state.lock().unwrap();
            state
                .customers
                .iter()
                .find(|c| c.id == customer_id)
                .unwrap()
                .balance
        }
    }

    #[async_trait]
    impl PaymentProvider for FakeProvider {
        async fn find_customer_by_email(&self, email: &str) -> ProviderResult<Option<Customer>> {
            self.check_up()?;
            let state = self.state.lock().unwrap();
            Ok(state.customers.iter().find(|c| c.email == email).cloned())
        }

        async fn create_customer(&self, email: &str) -> ProviderResult<Customer> {
            self.check_up()?;
            let id = self.seed_customer(email, 0);
            let state = self.state.lock().unwrap();
            Ok(state.customers.iter().find(|c| c.id == id).cloned().unwrap())
        }

        async fn retrieve_customer(&self, customer_id: &str) -> ProviderResult<Customer> {
            self.check_up()?;
            let state = self.state.lock().unwrap();
            state
                .customers
                .iter()
                .find(|c| c.id == customer_id)
                .cloned()
                .ok_or_else(|| ProviderError::ResourceMissing(customer_id.to_string()))
        }

        async fn create_payment_intent(
            &self,
            customer: &Customer,
            amount: i64,
            _currency: &str,
        ) -> ProviderResult<PaymentIntent> {
            self.check_up()?;
            let mut state = self.state.lock().unwrap();
            let id = format!("pi_{}", state.intents.len() + 1);
            let intent = PaymentIntent {
                id: id.clone(),
                client_secret: format!("{}_secret", id),
                status: "requires_payment_method".to_string(),
                amount,
                customer_id: customer.id.clone(),
                latest_charge: None,
            };
            state.intents.push(intent.clone());
            Ok(intent)
        }

        async fn retrieve_payment_intent(&self, intent_id: &str) -> ProviderResult<PaymentIntent> {
            self.check_up()?;
            let state = self.state.lock().unwrap();
            state
                .intents
                .iter()
                .find(|i| i.id == intent_id)
                .cloned()
                .ok_or_else(|| ProviderError::ResourceMissing(intent_id.to_string()))
        }

        async fn retrieve_charge(&self, charge_id: &str) -> ProviderResult<Charge> {
            self.check_up()?;
            let state = self.state.lock().unwrap();
            state
                .charges
                .iter()
                .find(|c| c.id == charge_id)
                .cloned()
                .ok_or_else(|| ProviderError::ResourceMissing(charge_id.to_string()))
        }

        async fn list_charges(&self, _customer_id: &str) -> ProviderResult<Vec<Charge>> {
            self.check_up()?;
            Ok(self.state.lock().unwrap().charges.clone())
        }

        async fn update_charge_description(
            &self,
            charge_id: &str,
            description: &str,
        ) -> ProviderResult<Charge> {
            self.check_up()?;
            let mut state = self.state.lock().unwrap();
            let charge = state
                .charges
                .iter_mut()
                .find(|c| c.id == charge_id)
                .ok_or_else(|| ProviderError::ResourceMissing(charge_id.to_string()))?;
            charge.description = Some(description.to_string());
            Ok(charge.clone())
        }

        async fn update_charge_metadata(
            &self,
            charge_id: &str,
            metadata: HashMap<String, String>,
        ) -> ProviderResult<Charge> {
            self.check_up()?;
            let mut state = self.state.lock().unwrap();
            let charge = state
                .charges
                .iter_mut()
                .find(|c| c.id == charge_id)
                .ok_or_else(|| ProviderError::ResourceMissing(charge_id.to_string()))?;
            charge.metadata.extend(metadata);
            Ok(charge.clone())
        }

        async fn create_balance_transaction(
            &self,
            customer_id: &str,
            params: NewBalanceTransaction,
        ) -> ProviderResult<BalanceTransaction> {
            self.check_up()?;
            let created = self.tick();
            let mut state = self.state.lock().unwrap();
            let ledger = state
                .ledgers
                .get_mut(customer_id)
                .ok_or_else(|| ProviderError::ResourceMissing(customer_id.to_string()))?;
            let tx = BalanceTransaction {
                id: format!("cbtxn_{}_{}", customer_id, ledger.len() + 1),
                amount: params.amount,
                currency: params.currency,
                description: Some(params.description),
                created,
                metadata: params.metadata,
            };
            ledger.push(tx.clone());
            let customer = state
                .customers
                .iter_mut()
                .find(|c| c.id == customer_id)
                .unwrap();
            customer.balance += tx.amount;
            Ok(tx)
        }

        async fn list_balance_transactions(
            &self,
            customer_id: &str,
        ) -> ProviderResult<Vec<BalanceTransaction>> {
            self.check_up()?;
            let state = self.state.lock().unwrap();
            Ok(state.ledgers.get(customer_id).cloned().unwrap_or_default())
        }

        async fn retrieve_balance_transaction(
            &self,
            customer_id: &str,
            transaction_id: &str,
        ) -> ProviderResult<BalanceTransaction> {
            self.check_up()?;
            let state = self.state.lock().unwrap();
            state
                .ledgers
                .get(customer_id)
                .and_then(|l| l.iter().find(|tx| tx.id == transaction_id))
                .cloned()
                .ok_or_else(|| ProviderError::ResourceMissing(transaction_id.to_string()))
        }

        async fn create_refund(&self, charge_id: &str) -> ProviderResult<Refund> {
            self.check_up()?;
            let mut state = self.state.lock().unwrap();
            let refund = Refund {
                id: format!("re_{}", state.refunds.len() + 1),
                status: "succeeded".to_string(),
            };
            let _ = charge_id;
            state.refunds.push(refund.clone());
            Ok(refund)
        }
    }

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send_payment_confirmation(&self, to: &str) {
            self.sent.lock().unwrap().push(to.to_string());
        }
    }

    fn service(provider: Arc<FakeProvider>, mailer: Arc<RecordingMailer>) -> PaymentService {
        PaymentService::new(provider, mailer, "ron")
    }

    #[tokio::test]
    async fn intent_rejects_small_amounts() {
        let svc = service(Arc::default(), Arc::default());
        for amount in [0.0, 1.0, 1.99] {
            let err = svc
                .create_payment_intent("ana@example.com", amount)
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::Payment(_)), "amount {}", amount);
        }
    }

    #[tokio::test]
    async fn intent_rejects_missing_email() {
        let svc = service(Arc::default(), Arc::default());
        let err = svc.create_payment_intent("  ", 10.0).await.unwrap_err();
        assert!(matches!(err, DomainError::Payment(_)));
    }

    #[tokio::test]
    async fn intent_creates_customer_on_first_use() {
        let provider = Arc::new(FakeProvider::default());
        let svc = service(provider.clone(), Arc::default());

        let handle = svc
            .create_payment_intent("ana@example.com", 25.0)
            .await
            .unwrap();
        assert!(handle.client_secret.ends_with("_secret"));

        let state = provider.state.lock().unwrap();
        assert_eq!(state.customers.len(), 1);
        // 25 major units -> 2500 minor units
        assert_eq!(state.intents[0].amount, 2500);
    }

    #[tokio::test]
    async fn succeeded_result_credits_balance_and_tags_charge() {
        let provider = Arc::new(FakeProvider::default());
        let mailer = Arc::new(RecordingMailer::default());
        let cus = provider.seed_customer("ana@example.com", 0);
        provider.seed_charge("ch_1", 2500, HashMap::new());
        provider.seed_intent(PaymentIntent {
            id: "pi_1".to_string(),
            client_secret: "pi_1_secret".to_string(),
            status: "succeeded".to_string(),
            amount: 2500,
            customer_id: cus.clone(),
            latest_charge: Some("ch_1".to_string()),
        });

        let svc = service(provider.clone(), mailer.clone());
        let status = svc.handle_payment_result("pi_1").await.unwrap();
        assert_eq!(status, "succeeded");

        assert_eq!(provider.balance_of(&cus), 2500);
        assert_eq!(
            mailer.sent.lock().unwrap().as_slice(),
            &["ana@example.com".to_string()]
        );
        let state = provider.state.lock().unwrap();
        let charge = state.charges.iter().find(|c| c.id == "ch_1").unwrap();
        let tagged = charge.metadata.get("balance_transaction_id").unwrap();
        assert!(state.ledgers[&cus].iter().any(|tx| &tx.id == tagged));
    }

    #[tokio::test]
    async fn non_success_statuses_pass_through() {
        let provider = Arc::new(FakeProvider::default());
        let cus = provider.seed_customer("ana@example.com", 0);
        for (i, status) in [
            "processing",
            "requires_action",
            "canceled",
            "requires_capture",
            "requires_confirmation",
            "requires_payment_method",
            "weird_future_status",
        ]
        .iter()
        .enumerate()
        {
            let id = format!("pi_{}", i);
            provider.seed_charge(&format!("ch_{}", i), 500, HashMap::new());
            provider.seed_intent(PaymentIntent {
                id: id.clone(),
                client_secret: format!("{}_secret", id),
                status: status.to_string(),
                amount: 500,
                customer_id: cus.clone(),
                latest_charge: Some(format!("ch_{}", i)),
            });
        }

        let mailer = Arc::new(RecordingMailer::default());
        let svc = service(provider.clone(), mailer.clone());
        for (i, status) in [
            "processing",
            "requires_action",
            "canceled",
            "requires_capture",
            "requires_confirmation",
            "requires_payment_method",
            "weird_future_status",
        ]
        .iter()
        .enumerate()
        {
            let got = svc.handle_payment_result(&format!("pi_{}", i)).await.unwrap();
            assert_eq!(&got, status);
        }
        // nothing credited, nothing mailed
        assert_eq!(provider.balance_of(&cus), 0);
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn provider_error_yields_sentinel_status() {
        let provider = Arc::new(FakeProvider::default());
        provider.fail_all.store(true, Ordering::SeqCst);
        let svc = service(provider, Arc::default());
        let status = svc.handle_payment_result("pi_nope").await.unwrap();
        assert_eq!(status, "payment-error");
    }

    #[tokio::test]
    async fn balance_is_reported_in_major_units() {
        let provider = Arc::new(FakeProvider::default());
        provider.seed_customer("ana@example.com", 1234);
        let svc = service(provider, Arc::default());
        let balance = svc.retrieve_customer_balance("ana@example.com").await.unwrap();
        assert!((balance - 12.34).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn balance_for_unknown_customer_is_not_found() {
        let svc = service(Arc::default(), Arc::default());
        let err = svc
            .retrieve_customer_balance("ghost@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn history_merges_and_sorts_newest_first() {
        let provider = Arc::new(FakeProvider::default());
        let cus = provider.seed_customer("ana@example.com", 0);
        let svc = service(provider.clone(), Arc::default());

        // interleave ledger entries and charges over the fake clock
        svc.pay_for_parking_spot("ana@example.com", 0.0).await.unwrap();
        provider.seed_charge("ch_1", 1000, HashMap::new());
        svc.pay_for_parking_spot("ana@example.com", 0.0).await.unwrap();
        provider.seed_charge("ch_2", 2000, HashMap::new());

        let history = svc.get_transactions_history("ana@example.com").await.unwrap();
        assert_eq!(history.len(), 4);
        assert!(history
            .windows(2)
            .all(|pair| pair[0].created >= pair[1].created));
        assert!(history.iter().any(|r| r.object == "charge"));
        assert!(history
            .iter()
            .any(|r| r.object == "customer_balance_transaction"));
        // charges carry a status, ledger entries do not
        for record in &history {
            assert_eq!(record.status.is_some(), record.object == "charge");
        }
        let _ = cus;
    }

    #[tokio::test]
    async fn insufficient_balance_leaves_ledger_untouched() {
        let provider = Arc::new(FakeProvider::default());
        let cus = provider.seed_customer("ana@example.com", 500); // 5.00
        let svc = service(provider.clone(), Arc::default());

        let result = svc.pay_for_parking_spot("ana@example.com", 5.01).await.unwrap();
        assert_eq!(result, "insufficient-balance");
        assert_eq!(provider.ledger_len(&cus), 0);
        assert_eq!(provider.balance_of(&cus), 500);
    }

    #[tokio::test]
    async fn successful_payment_debits_balance() {
        let provider = Arc::new(FakeProvider::default());
        let cus = provider.seed_customer("ana@example.com", 500);
        let svc = service(provider.clone(), Arc::default());

        let result = svc.pay_for_parking_spot("ana@example.com", 5.0).await.unwrap();
        assert_eq!(result, "success");
        assert_eq!(provider.balance_of(&cus), 0);
        assert_eq!(provider.ledger_len(&cus), 1);
    }

    #[tokio::test]
    async fn card_refund_happy_path_then_idempotent() {
        let provider = Arc::new(FakeProvider::default());
        let mailer = Arc::new(RecordingMailer::default());
        let cus = provider.seed_customer("ana@example.com", 0);
        provider.seed_charge("ch_1", 2500, HashMap::new());
        provider.seed_intent(PaymentIntent {
            id: "pi_1".to_string(),
            client_secret: "pi_1_secret".to_string(),
            status: "succeeded".to_string(),
            amount: 2500,
            customer_id: cus.clone(),
            latest_charge: Some("ch_1".to_string()),
        });

        let svc = service(provider.clone(), mailer);
        svc.handle_payment_result("pi_1").await.unwrap();
        assert_eq!(provider.balance_of(&cus), 2500);

        let status = svc
            .create_card_payment_refund("ch_1", "ana@example.com")
            .await
            .unwrap();
        assert_eq!(status, "succeeded");
        // ledger reversed and charge marked
        assert_eq!(provider.balance_of(&cus), 0);
        {
            let state = provider.state.lock().unwrap();
            let charge = state.charges.iter().find(|c| c.id == "ch_1").unwrap();
            assert_eq!(charge.description.as_deref(), Some("refunded"));
        }

        let second = svc
            .create_card_payment_refund("ch_1", "ana@example.com")
            .await
            .unwrap();
        assert_eq!(second, "This charge has already been refunded.");
        assert_eq!(provider.balance_of(&cus), 0);
    }

    #[tokio::test]
    async fn card_refund_rejects_missing_charge_and_missing_link() {
        let provider = Arc::new(FakeProvider::default());
        provider.seed_customer("ana@example.com", 0);
        provider.seed_charge("ch_unlinked", 2500, HashMap::new());
        provider.seed_charge(
            "ch_blank",
            2500,
            HashMap::from([("balance_transaction_id".to_string(), "  ".to_string())]),
        );
        let svc = service(provider, Arc::default());

        let missing = svc
            .create_card_payment_refund("ch_ghost", "ana@example.com")
            .await
            .unwrap();
        assert_eq!(missing, "The charge with the specified ID does not exist.");

        let unlinked = svc
            .create_card_payment_refund("ch_unlinked", "ana@example.com")
            .await
            .unwrap();
        assert_eq!(unlinked, "Invalid balance transaction ID.");

        let blank = svc
            .create_card_payment_refund("ch_blank", "ana@example.com")
            .await
            .unwrap();
        assert_eq!(blank, "Invalid balance transaction ID.");
    }

    #[tokio::test]
    async fn balance_refund_guards_double_refund() {
        let provider = Arc::new(FakeProvider::default());
        let cus = provider.seed_customer("ana@example.com", 1000);
        let svc = service(provider.clone(), Arc::default());

        svc.pay_for_parking_spot("ana@example.com", 10.0).await.unwrap();
        let tx_id = {
            let state = provider.state.lock().unwrap();
            state.ledgers[&cus][0].id.clone()
        };

        let first = svc
            .refund_customer_balance_transaction(&tx_id, "ana@example.com")
            .await
            .unwrap();
        assert_eq!(first, "success");
        assert_eq!(provider.balance_of(&cus), 1000); // -1000 then +1000

        let second = svc
            .refund_customer_balance_transaction(&tx_id, "ana@example.com")
            .await
            .unwrap();
        assert_eq!(
            second,
            "A refund has already been issued for this transaction."
        );
        assert_eq!(provider.ledger_len(&cus), 2);
    }

    #[tokio::test]
    async fn balance_refund_never_refunds_a_refund() {
        let provider = Arc::new(FakeProvider::default());
        let cus = provider.seed_customer("ana@example.com", 1000);
        let svc = service(provider.clone(), Arc::default());

        svc.pay_for_parking_spot("ana@example.com", 10.0).await.unwrap();
        let tx_id = {
            let state = provider.state.lock().unwrap();
            state.ledgers[&cus][0].id.clone()
        };
        svc.refund_customer_balance_transaction(&tx_id, "ana@example.com")
            .await
            .unwrap();
        let refund_tx_id = {
            let state = provider.state.lock().unwrap();
            state.ledgers[&cus][1].id.clone()
        };

        let result = svc
            .refund_customer_balance_transaction(&refund_tx_id, "ana@example.com")
            .await
            .unwrap();
        assert_eq!(result, "This transaction is a refund.");
        assert_eq!(provider.ledger_len(&cus), 2);
    }

    #[tokio::test]
    async fn balance_refund_reports_missing_pieces() {
        let provider = Arc::new(FakeProvider::default());
        provider.seed_customer("ana@example.com", 0);
        let svc = service(provider, Arc::default());

        assert_eq!(
            svc.refund_customer_balance_transaction("", "ana@example.com")
                .await
                .unwrap(),
            "Invalid transaction ID."
        );
        assert_eq!(
            svc.refund_customer_balance_transaction("cbtxn_x", "ghost@example.com")
                .await
                .unwrap(),
            "No customer found with email: ghost@example.com"
        );
        assert_eq!(
            svc.refund_customer_balance_transaction("cbtxn_x", "ana@example.com")
                .await
                .unwrap(),
            "The balance transaction with the specified ID does not exist."
        );
    }
}
