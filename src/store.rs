//! Document repositories
//!
//! Typed access to the three hosted collections (`users`, `banks`,
//! `transactions`). Every durable record Horizon owns goes through here;
//! the handlers never touch raw document JSON.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::config::Config;
use crate::domain::{document_data, BankRecord, TransactionRecord, UserProfile};
use crate::error::{AppError, AppResult};
use crate::providers::{IdentityProvider, Provider};

#[derive(Clone)]
pub struct Documents {
    identity: Arc<dyn IdentityProvider>,
    users_collection: String,
    banks_collection: String,
    transactions_collection: String,
}

impl Documents {
    pub fn new(identity: Arc<dyn IdentityProvider>, config: &Config) -> Self {
        Self {
            identity,
            users_collection: config.users_collection_id.clone(),
            banks_collection: config.banks_collection_id.clone(),
            transactions_collection: config.transactions_collection_id.clone(),
        }
    }

    fn decode<T: DeserializeOwned>(doc: Value) -> AppResult<T> {
        serde_json::from_value(doc)
            .map_err(|e| AppError::Internal(format!("malformed document: {}", e)))
    }

    fn external(e: crate::providers::ProviderError) -> AppError {
        AppError::external(Provider::Identity, e)
    }

    // ---------------------------------------------------------------------
    // users
    // ---------------------------------------------------------------------

    /// Persist a profile document keyed by the identity account id.
    pub async fn create_user_profile(&self, profile: &UserProfile) -> AppResult<UserProfile> {
        let data = document_data(profile)
            .map_err(|e| AppError::Internal(format!("serialize profile: {}", e)))?;
        let doc = self
            .identity
            .create_document(&self.users_collection, &profile.id, data)
            .await
            .map_err(Self::external)?;
        Self::decode(doc)
    }

    pub async fn get_user_profile(&self, user_id: &str) -> AppResult<Option<UserProfile>> {
        let doc = self
            .identity
            .get_document(&self.users_collection, user_id)
            .await
            .map_err(Self::external)?;
        doc.map(Self::decode).transpose()
    }

    // ---------------------------------------------------------------------
    // banks
    // ---------------------------------------------------------------------

    /// Persist a bank record under a fresh document id.
    pub async fn create_bank(&self, record: &BankRecord) -> AppResult<BankRecord> {
        let data = document_data(record)
            .map_err(|e| AppError::Internal(format!("serialize bank record: {}", e)))?;
        let doc = self
            .identity
            .create_document(&self.banks_collection, &Uuid::new_v4().to_string(), data)
            .await
            .map_err(Self::external)?;
        Self::decode(doc)
    }

    pub async fn get_bank(&self, bank_id: &str) -> AppResult<Option<BankRecord>> {
        let doc = self
            .identity
            .get_document(&self.banks_collection, bank_id)
            .await
            .map_err(Self::external)?;
        doc.map(Self::decode).transpose()
    }

    /// Resolve a bank record by the aggregator account id stored on it.
    pub async fn find_bank_by_account_id(
        &self,
        account_id: &str,
    ) -> AppResult<Option<BankRecord>> {
        let docs = self
            .identity
            .list_documents(&self.banks_collection, &[("account_id", account_id)])
            .await
            .map_err(Self::external)?;
        docs.into_iter().next().map(Self::decode).transpose()
    }

    pub async fn list_banks_for_user(&self, user_id: &str) -> AppResult<Vec<BankRecord>> {
        let docs = self
            .identity
            .list_documents(&self.banks_collection, &[("user_id", user_id)])
            .await
            .map_err(Self::external)?;
        docs.into_iter().map(Self::decode).collect()
    }

    // ---------------------------------------------------------------------
    // transactions
    // ---------------------------------------------------------------------

    pub async fn create_transaction(
        &self,
        record: &TransactionRecord,
    ) -> AppResult<TransactionRecord> {
        let data = document_data(record)
            .map_err(|e| AppError::Internal(format!("serialize transaction: {}", e)))?;
        let doc = self
            .identity
            .create_document(
                &self.transactions_collection,
                &Uuid::new_v4().to_string(),
                data,
            )
            .await
            .map_err(Self::external)?;
        Self::decode(doc)
    }

    /// Look up an existing transaction by the idempotency key it was
    /// submitted under.
    pub async fn find_transaction_by_correlation_id(
        &self,
        correlation_id: &str,
    ) -> AppResult<Option<TransactionRecord>> {
        let docs = self
            .identity
            .list_documents(
                &self.transactions_collection,
                &[("correlation_id", correlation_id)],
            )
            .await
            .map_err(Self::external)?;
        docs.into_iter().next().map(Self::decode).transpose()
    }
}
