//! Shared test setup: in-memory fake providers and an app builder.
//!
//! The fakes implement the three provider traits over hash maps, with
//! just enough failure injection to exercise the orchestrators' error and
//! compensation paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use serde_json::Value;
use uuid::Uuid;

use horizon::api::{routes, AppState};
use horizon::providers::aggregation::{
    AggregationProvider, LinkedAccount, ProviderTransaction, TokenExchange,
};
use horizon::providers::identity::{IdentityProvider, ProviderAccount, ProviderSession};
use horizon::providers::payments::{NewPaymentsCustomer, PaymentsProvider};
use horizon::providers::ProviderError;
use horizon::{AccountSelectionPolicy, Config};

// =========================================================================
// Fake identity/document store
// =========================================================================

#[derive(Default)]
pub struct FakeIdentity {
    /// account id -> (email, password, name)
    accounts: Mutex<HashMap<String, (String, String, String)>>,
    /// session secret -> account id
    sessions: Mutex<HashMap<String, String>>,
    /// (collection, document id) -> document (with $id)
    documents: Mutex<HashMap<(String, String), Value>>,
    /// When set, document creation in this collection fails.
    fail_create_in: Mutex<Option<String>>,
}

impl FakeIdentity {
    pub fn fail_document_creation_in(&self, collection: &str) {
        *self.fail_create_in.lock().unwrap() = Some(collection.to_string());
    }

    pub fn account_count(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }

    pub fn documents_in(&self, collection: &str) -> Vec<Value> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .filter(|((c, _), _)| c == collection)
            .map(|(_, doc)| doc.clone())
            .collect()
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<ProviderAccount, ProviderError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.values().any(|(e, _, _)| e == email) {
            return Err(ProviderError::Status {
                status: 409,
                body: "account already exists".to_string(),
            });
        }
        let id = Uuid::new_v4().to_string();
        accounts.insert(
            id.clone(),
            (email.to_string(), password.to_string(), name.to_string()),
        );
        Ok(ProviderAccount {
            id,
            email: email.to_string(),
            name: name.to_string(),
        })
    }

    async fn delete_account(&self, account_id: &str) -> Result<(), ProviderError> {
        self.accounts.lock().unwrap().remove(account_id);
        Ok(())
    }

    async fn create_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, ProviderError> {
        let accounts = self.accounts.lock().unwrap();
        let account_id = accounts
            .iter()
            .find(|(_, (e, p, _))| e == email && p == password)
            .map(|(id, _)| id.clone())
            .ok_or(ProviderError::Status {
                status: 401,
                body: "invalid credentials".to_string(),
            })?;
        drop(accounts);

        let secret = Uuid::new_v4().to_string();
        self.sessions
            .lock()
            .unwrap()
            .insert(secret.clone(), account_id);
        Ok(ProviderSession {
            id: Uuid::new_v4().to_string(),
            secret,
        })
    }

    async fn delete_session(&self, session_token: &str) -> Result<(), ProviderError> {
        self.sessions.lock().unwrap().remove(session_token);
        Ok(())
    }

    async fn get_account(&self, session_token: &str) -> Result<ProviderAccount, ProviderError> {
        let sessions = self.sessions.lock().unwrap();
        let account_id = sessions
            .get(session_token)
            .cloned()
            .ok_or(ProviderError::Status {
                status: 401,
                body: "no session".to_string(),
            })?;
        drop(sessions);

        let accounts = self.accounts.lock().unwrap();
        let (email, _, name) = accounts.get(&account_id).cloned().ok_or(
            ProviderError::Status {
                status: 404,
                body: "account gone".to_string(),
            },
        )?;
        Ok(ProviderAccount {
            id: account_id,
            email,
            name,
        })
    }

    async fn create_document(
        &self,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Value, ProviderError> {
        if self.fail_create_in.lock().unwrap().as_deref() == Some(collection_id) {
            return Err(ProviderError::Status {
                status: 500,
                body: "document store unavailable".to_string(),
            });
        }
        let mut doc = data;
        doc["$id"] = Value::String(document_id.to_string());
        self.documents
            .lock()
            .unwrap()
            .insert((collection_id.to_string(), document_id.to_string()), doc.clone());
        Ok(doc)
    }

    async fn get_document(
        &self,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Option<Value>, ProviderError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .get(&(collection_id.to_string(), document_id.to_string()))
            .cloned())
    }

    async fn list_documents(
        &self,
        collection_id: &str,
        filters: &[(&str, &str)],
    ) -> Result<Vec<Value>, ProviderError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|((c, _), _)| c == collection_id)
            .filter(|(_, doc)| {
                filters
                    .iter()
                    .all(|(field, value)| doc.get(*field).and_then(Value::as_str) == Some(*value))
            })
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    async fn delete_document(
        &self,
        collection_id: &str,
        document_id: &str,
    ) -> Result<(), ProviderError> {
        self.documents
            .lock()
            .unwrap()
            .remove(&(collection_id.to_string(), document_id.to_string()));
        Ok(())
    }
}

// =========================================================================
// Fake aggregation provider
// =========================================================================

#[derive(Default)]
pub struct FakeAggregation {
    /// access token -> accounts
    accounts: Mutex<HashMap<String, Vec<LinkedAccount>>>,
    /// access token -> transactions
    transactions: Mutex<HashMap<String, Vec<ProviderTransaction>>>,
}

impl FakeAggregation {
    /// Access token the fake derives for a public token.
    pub fn access_token_for(public_token: &str) -> String {
        format!("access-{}", public_token)
    }

    /// Register an item's accounts (and optional transactions) so a link
    /// flow for `public_token` finds them.
    pub fn seed_item(
        &self,
        public_token: &str,
        accounts: Vec<LinkedAccount>,
        transactions: Vec<ProviderTransaction>,
    ) {
        let token = Self::access_token_for(public_token);
        self.accounts.lock().unwrap().insert(token.clone(), accounts);
        self.transactions.lock().unwrap().insert(token, transactions);
    }
}

#[async_trait]
impl AggregationProvider for FakeAggregation {
    async fn create_link_token(
        &self,
        client_user_id: &str,
        _client_name: &str,
    ) -> Result<String, ProviderError> {
        Ok(format!("link-{}", client_user_id))
    }

    async fn exchange_public_token(
        &self,
        public_token: &str,
    ) -> Result<TokenExchange, ProviderError> {
        Ok(TokenExchange {
            access_token: Self::access_token_for(public_token),
            item_id: format!("item-{}", public_token),
        })
    }

    async fn get_accounts(
        &self,
        access_token: &str,
    ) -> Result<Vec<LinkedAccount>, ProviderError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .get(access_token)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_processor_token(
        &self,
        _access_token: &str,
        account_id: &str,
    ) -> Result<String, ProviderError> {
        Ok(format!("processor-{}", account_id))
    }

    async fn get_transactions(
        &self,
        access_token: &str,
    ) -> Result<Vec<ProviderTransaction>, ProviderError> {
        Ok(self
            .transactions
            .lock()
            .unwrap()
            .get(access_token)
            .cloned()
            .unwrap_or_default())
    }
}

// =========================================================================
// Fake payments provider
// =========================================================================

#[derive(Default)]
pub struct FakePayments {
    customers: Mutex<Vec<String>>,
    active_funding_sources: Mutex<Vec<String>>,
    removed_funding_sources: Mutex<Vec<String>>,
    /// (source, destination, amount, idempotency key)
    transfers: Mutex<Vec<(String, String, String, String)>>,
    fail_customers: AtomicBool,
    fail_transfers: AtomicBool,
    timeout_transfers: AtomicBool,
}

impl FakePayments {
    pub fn fail_customer_creation(&self) {
        self.fail_customers.store(true, Ordering::SeqCst);
    }

    pub fn fail_transfers(&self) {
        self.fail_transfers.store(true, Ordering::SeqCst);
    }

    pub fn timeout_transfers(&self) {
        self.timeout_transfers.store(true, Ordering::SeqCst);
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers.lock().unwrap().len()
    }

    pub fn active_funding_sources(&self) -> Vec<String> {
        self.active_funding_sources.lock().unwrap().clone()
    }

    pub fn removed_funding_sources(&self) -> Vec<String> {
        self.removed_funding_sources.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentsProvider for FakePayments {
    async fn create_customer(
        &self,
        _customer: &NewPaymentsCustomer,
    ) -> Result<String, ProviderError> {
        if self.fail_customers.load(Ordering::SeqCst) {
            return Err(ProviderError::Status {
                status: 400,
                body: "customer rejected".to_string(),
            });
        }
        let mut customers = self.customers.lock().unwrap();
        let url = format!("https://pay.test/customers/cust-{}", customers.len() + 1);
        customers.push(url.clone());
        Ok(url)
    }

    async fn create_funding_source(
        &self,
        customer_id: &str,
        _processor_token: &str,
        _bank_name: &str,
    ) -> Result<String, ProviderError> {
        let mut sources = self.active_funding_sources.lock().unwrap();
        let url = format!(
            "https://pay.test/funding-sources/{}-fs-{}",
            customer_id,
            sources.len() + 1
        );
        sources.push(url.clone());
        Ok(url)
    }

    async fn remove_funding_source(
        &self,
        funding_source_url: &str,
    ) -> Result<(), ProviderError> {
        self.active_funding_sources
            .lock()
            .unwrap()
            .retain(|url| url != funding_source_url);
        self.removed_funding_sources
            .lock()
            .unwrap()
            .push(funding_source_url.to_string());
        Ok(())
    }

    async fn create_transfer(
        &self,
        source_funding_source_url: &str,
        destination_funding_source_url: &str,
        amount: &str,
        idempotency_key: &str,
    ) -> Result<String, ProviderError> {
        if self.timeout_transfers.load(Ordering::SeqCst) {
            return Err(ProviderError::Timeout);
        }
        if self.fail_transfers.load(Ordering::SeqCst) {
            return Err(ProviderError::Status {
                status: 400,
                body: "transfer rejected".to_string(),
            });
        }
        let mut transfers = self.transfers.lock().unwrap();
        transfers.push((
            source_funding_source_url.to_string(),
            destination_funding_source_url.to_string(),
            amount.to_string(),
            idempotency_key.to_string(),
        ));
        Ok(format!("https://pay.test/transfers/tr-{}", transfers.len()))
    }
}

// =========================================================================
// App builder
// =========================================================================

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        identity_endpoint: "https://identity.test/v1".to_string(),
        identity_project: "horizon-test".to_string(),
        identity_api_key: "test-key".to_string(),
        identity_database_id: "horizon".to_string(),
        users_collection_id: "users".to_string(),
        banks_collection_id: "banks".to_string(),
        transactions_collection_id: "transactions".to_string(),
        aggregation_endpoint: "https://aggregation.test".to_string(),
        aggregation_client_id: "client".to_string(),
        aggregation_secret: "secret".to_string(),
        payments_endpoint: "https://pay.test".to_string(),
        payments_api_key: "pay-key".to_string(),
        shareable_id_secret: "share-secret".to_string(),
        provider_timeout: Duration::from_secs(5),
        cookie_secure: false,
        account_selection_policy: AccountSelectionPolicy::FirstOnly,
        route_cache_ttl: Duration::from_secs(30),
        transactions_page_size: 10,
    }
}

pub struct TestApp {
    pub app: Router,
    pub identity: Arc<FakeIdentity>,
    pub aggregation: Arc<FakeAggregation>,
    pub payments: Arc<FakePayments>,
}

pub fn setup() -> TestApp {
    let identity = Arc::new(FakeIdentity::default());
    let aggregation = Arc::new(FakeAggregation::default());
    let payments = Arc::new(FakePayments::default());

    let state = AppState::new(
        Arc::new(test_config()),
        identity.clone(),
        aggregation.clone(),
        payments.clone(),
    );

    TestApp {
        app: routes::create_router(state),
        identity,
        aggregation,
        payments,
    }
}

/// A one-account checking item for seeding the fake aggregator.
pub fn checking_account(account_id: &str, name: &str, balance: &str) -> LinkedAccount {
    use horizon::providers::aggregation::AccountBalances;

    LinkedAccount {
        account_id: account_id.to_string(),
        name: name.to_string(),
        official_name: Some(format!("{} Checking", name)),
        mask: Some("0000".to_string()),
        account_type: "depository".to_string(),
        subtype: Some("checking".to_string()),
        balances: AccountBalances {
            available: Some(balance.parse().unwrap()),
            current: Some(balance.parse().unwrap()),
        },
    }
}

/// `count` provider transactions in a deterministic order.
pub fn sample_transactions(count: usize) -> Vec<ProviderTransaction> {
    use chrono::NaiveDate;

    (0..count)
        .map(|i| ProviderTransaction {
            transaction_id: format!("txn-{:03}", i),
            name: format!("Purchase {}", i),
            amount: rust_decimal::Decimal::new(100 + i as i64, 2),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            category: Some("Shops".to_string()),
            pending: false,
            payment_channel: Some("online".to_string()),
        })
        .collect()
}
