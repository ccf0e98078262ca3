//! Account handler
//!
//! Read side of the dashboard: the accounts overview (every linked bank
//! with live balances and the totals the home page shows) and a single
//! account's detail with its paginated transaction list. These are display
//! reads: a bank whose aggregator call fails is skipped with a warning
//! instead of failing the whole page.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cache::{overview_key, RouteCache};
use crate::domain::{paginate, BankRecord, Page, UserProfile};
use crate::error::{AppError, AppResult};
use crate::providers::aggregation::ProviderTransaction;
use crate::providers::{AggregationProvider, Provider};
use crate::store::Documents;

/// One linked bank with live data, API-safe (no access token).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSummary {
    pub bank_id: String,
    pub item_id: String,
    pub account_id: String,
    pub name: String,
    pub official_name: Option<String>,
    pub mask: Option<String>,
    pub account_type: String,
    pub subtype: Option<String>,
    pub current_balance: Option<Decimal>,
    pub available_balance: Option<Decimal>,
    pub shareable_id: String,
}

/// The dashboard overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountsOverview {
    pub accounts: Vec<AccountSummary>,
    pub total_banks: usize,
    pub total_current_balance: Decimal,
}

/// A single account plus one page of its transactions.
#[derive(Debug, Clone, Serialize)]
pub struct AccountDetail {
    pub account: AccountSummary,
    pub transactions: Page<ProviderTransaction>,
}

pub struct AccountHandler {
    aggregation: Arc<dyn AggregationProvider>,
    documents: Documents,
    cache: RouteCache,
    page_size: usize,
}

impl AccountHandler {
    pub fn new(
        aggregation: Arc<dyn AggregationProvider>,
        documents: Documents,
        cache: RouteCache,
        page_size: usize,
    ) -> Self {
        Self {
            aggregation,
            documents,
            cache,
            page_size,
        }
    }

    /// Overview of every linked bank, served through the route cache.
    pub async fn get_accounts(&self, user: &UserProfile) -> AppResult<AccountsOverview> {
        let key = overview_key(&user.id);
        if let Some(cached) = self.cache.get(&key).await {
            if let Ok(overview) = serde_json::from_value::<AccountsOverview>(cached) {
                return Ok(overview);
            }
        }

        let banks = self.documents.list_banks_for_user(&user.id).await?;

        let mut accounts = Vec::with_capacity(banks.len());
        for bank in &banks {
            match self.summarize(bank).await {
                Ok(summary) => accounts.push(summary),
                Err(e) => {
                    // Display read: degrade to the banks we can show.
                    tracing::warn!(bank_id = %bank.id, error = %e, "skipping bank in overview");
                }
            }
        }

        let total_current_balance = accounts
            .iter()
            .filter_map(|a| a.current_balance)
            .sum::<Decimal>();

        let overview = AccountsOverview {
            total_banks: accounts.len(),
            total_current_balance,
            accounts,
        };

        if let Ok(value) = serde_json::to_value(&overview) {
            self.cache.insert(key, value).await;
        }

        Ok(overview)
    }

    /// One bank's live data plus the requested transaction page.
    pub async fn get_account(
        &self,
        user: &UserProfile,
        bank_id: &str,
        page: usize,
    ) -> AppResult<AccountDetail> {
        let bank = self
            .documents
            .get_bank(bank_id)
            .await?
            .filter(|bank| bank.user_id == user.id)
            .ok_or_else(|| AppError::not_found("bank", bank_id.to_string()))?;

        let account = self.summarize(&bank).await?;

        let transactions = self
            .aggregation
            .get_transactions(&bank.access_token)
            .await
            .map_err(|e| AppError::external(Provider::Aggregation, e))?;

        Ok(AccountDetail {
            account,
            transactions: paginate(&transactions, page, self.page_size),
        })
    }

    async fn summarize(&self, bank: &BankRecord) -> AppResult<AccountSummary> {
        let accounts = self
            .aggregation
            .get_accounts(&bank.access_token)
            .await
            .map_err(|e| AppError::external(Provider::Aggregation, e))?;

        let account = accounts
            .into_iter()
            .find(|a| a.account_id == bank.account_id)
            .ok_or_else(|| AppError::not_found("account", bank.account_id.clone()))?;

        Ok(AccountSummary {
            bank_id: bank.id.clone(),
            item_id: bank.item_id.clone(),
            account_id: account.account_id,
            name: account.name,
            official_name: account.official_name,
            mask: account.mask,
            account_type: account.account_type,
            subtype: account.subtype,
            current_balance: account.balances.current,
            available_balance: account.balances.available,
            shareable_id: bank.shareable_id.clone(),
        })
    }
}
