//! Account-linking handler
//!
//! Turns the browser-side link flow's public token into persisted bank
//! records: token exchange, account metadata, processor token, funding
//! source, record. Every step can fail; the invariant is that a bank
//! record exists only if its funding source does, and a funding source
//! without a record gets removed again.

use std::sync::Arc;

use crate::cache::{overview_key, RouteCache};
use crate::config::AccountSelectionPolicy;
use crate::domain::{BankRecord, ShareableIdCodec, UserProfile};
use crate::error::{AppError, AppResult};
use crate::providers::aggregation::LinkedAccount;
use crate::providers::{AggregationProvider, PaymentsProvider, Provider};
use crate::store::Documents;

use super::{LinkAccountCommand, LinkAccountResult, LinkedBank};

pub struct LinkHandler {
    aggregation: Arc<dyn AggregationProvider>,
    payments: Arc<dyn PaymentsProvider>,
    documents: Documents,
    codec: ShareableIdCodec,
    policy: AccountSelectionPolicy,
    cache: RouteCache,
}

impl LinkHandler {
    pub fn new(
        aggregation: Arc<dyn AggregationProvider>,
        payments: Arc<dyn PaymentsProvider>,
        documents: Documents,
        codec: ShareableIdCodec,
        policy: AccountSelectionPolicy,
        cache: RouteCache,
    ) -> Self {
        Self {
            aggregation,
            payments,
            documents,
            codec,
            policy,
            cache,
        }
    }

    /// Issue a link token for the browser-side widget.
    pub async fn create_link_token(&self, user: &UserProfile) -> AppResult<String> {
        self.aggregation
            .create_link_token(&user.id, &user.full_name())
            .await
            .map_err(|e| AppError::external(Provider::Aggregation, e))
    }

    /// Exchange the public token and register every selected account.
    pub async fn execute(
        &self,
        command: LinkAccountCommand,
        user: &UserProfile,
    ) -> AppResult<LinkAccountResult> {
        command.validate()?;

        let exchange = self
            .aggregation
            .exchange_public_token(&command.public_token)
            .await
            .map_err(|e| AppError::external(Provider::Aggregation, e))?;

        let accounts = self
            .aggregation
            .get_accounts(&exchange.access_token)
            .await
            .map_err(|e| AppError::external(Provider::Aggregation, e))?;

        let selected: Vec<LinkedAccount> = match self.policy {
            AccountSelectionPolicy::FirstOnly => accounts.into_iter().take(1).collect(),
            AccountSelectionPolicy::All => accounts,
        };
        if selected.is_empty() {
            return Err(AppError::not_found("account", exchange.item_id.clone()));
        }

        let mut linked = Vec::with_capacity(selected.len());
        for account in &selected {
            let bank = self
                .link_one(user, &exchange.access_token, &exchange.item_id, account)
                .await?;
            linked.push(LinkedBank {
                bank_id: bank.id,
                item_id: bank.item_id,
                account_id: bank.account_id,
                bank_name: account.name.clone(),
                shareable_id: bank.shareable_id,
            });
        }

        self.cache.invalidate(&overview_key(&user.id)).await;

        tracing::info!(user_id = %user.id, count = linked.len(), "bank accounts linked");

        Ok(LinkAccountResult { linked })
    }

    /// Register one account: processor token, funding source, bank record.
    /// If persisting the record fails after the funding source was created,
    /// the funding source is removed again.
    async fn link_one(
        &self,
        user: &UserProfile,
        access_token: &str,
        item_id: &str,
        account: &LinkedAccount,
    ) -> AppResult<BankRecord> {
        let processor_token = self
            .aggregation
            .create_processor_token(access_token, &account.account_id)
            .await
            .map_err(|e| AppError::external(Provider::Aggregation, e))?;

        let funding_source_url = self
            .payments
            .create_funding_source(&user.payments_customer_id, &processor_token, &account.name)
            .await
            .map_err(|e| AppError::external(Provider::Payments, e))?;

        let record = BankRecord {
            id: String::new(),
            user_id: user.id.clone(),
            item_id: item_id.to_string(),
            account_id: account.account_id.clone(),
            access_token: access_token.to_string(),
            funding_source_url: funding_source_url.clone(),
            shareable_id: self.codec.encode(&account.account_id),
        };

        match self.documents.create_bank(&record).await {
            Ok(record) => Ok(record),
            Err(persist_err) => {
                // Funding source exists but no record points at it; undo it
                // rather than leaving the orphan.
                match self.payments.remove_funding_source(&funding_source_url).await {
                    Ok(()) => Err(AppError::partial_failure(
                        "link_account",
                        format!(
                            "bank record not persisted, funding source removed: {}",
                            persist_err
                        ),
                    )),
                    Err(remove_err) => Err(AppError::partial_failure(
                        "link_account",
                        format!(
                            "bank record not persisted ({}) and funding source {} could not be removed: {}",
                            persist_err, funding_source_url, remove_err
                        ),
                    )),
                }
            }
        }
    }
}
