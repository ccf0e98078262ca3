//! Bank-data aggregation client
//!
//! Client for the account-aggregation provider: link-token issuance, the
//! public-token exchange that turns a browser-side link flow into a durable
//! access token, account metadata, processor tokens for the payments
//! provider, and the transaction feed. Every call authenticates with the
//! client id/secret pair in the request body, the way the provider's REST
//! API expects.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::Config;
use crate::providers::{decode_response, http_client, ProviderError};

/// Result of exchanging a short-lived public token.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchange {
    pub access_token: String,
    pub item_id: String,
}

/// Balances reported for a linked account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalances {
    pub available: Option<Decimal>,
    pub current: Option<Decimal>,
}

/// A single account within a linked item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedAccount {
    pub account_id: String,
    pub name: String,
    #[serde(default)]
    pub official_name: Option<String>,
    #[serde(default)]
    pub mask: Option<String>,
    #[serde(rename = "type")]
    pub account_type: String,
    #[serde(default)]
    pub subtype: Option<String>,
    pub balances: AccountBalances,
}

/// One transaction from the aggregator's feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderTransaction {
    pub transaction_id: String,
    pub name: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(default)]
    pub category: Option<String>,
    pub pending: bool,
    #[serde(default)]
    pub payment_channel: Option<String>,
}

/// Operations Horizon needs from the aggregation provider.
#[async_trait]
pub trait AggregationProvider: Send + Sync {
    /// Issue a link token for the browser-side link flow.
    async fn create_link_token(
        &self,
        client_user_id: &str,
        client_name: &str,
    ) -> Result<String, ProviderError>;

    async fn exchange_public_token(
        &self,
        public_token: &str,
    ) -> Result<TokenExchange, ProviderError>;

    async fn get_accounts(&self, access_token: &str)
        -> Result<Vec<LinkedAccount>, ProviderError>;

    /// Processor token scoped to the payments provider.
    async fn create_processor_token(
        &self,
        access_token: &str,
        account_id: &str,
    ) -> Result<String, ProviderError>;

    /// Full transaction list for the item. The provider offers no
    /// server-side pagination in this flow; Horizon pages the result.
    async fn get_transactions(
        &self,
        access_token: &str,
    ) -> Result<Vec<ProviderTransaction>, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct LinkTokenResponse {
    link_token: String,
}

#[derive(Debug, Deserialize)]
struct AccountsResponse {
    accounts: Vec<LinkedAccount>,
}

#[derive(Debug, Deserialize)]
struct ProcessorTokenResponse {
    processor_token: String,
}

#[derive(Debug, Deserialize)]
struct TransactionsResponse {
    transactions: Vec<ProviderTransaction>,
}

/// HTTP client for the hosted aggregation provider.
pub struct HostedAggregationClient {
    http: reqwest::Client,
    endpoint: String,
    client_id: String,
    secret: String,
}

impl HostedAggregationClient {
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        Ok(Self {
            http: http_client(config.provider_timeout)?,
            endpoint: config.aggregation_endpoint.trim_end_matches('/').to_string(),
            client_id: config.aggregation_client_id.clone(),
            secret: config.aggregation_secret.clone(),
        })
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        mut body: serde_json::Value,
    ) -> Result<T, ProviderError> {
        body["client_id"] = json!(self.client_id);
        body["secret"] = json!(self.secret);

        let response = self
            .http
            .post(format!("{}{}", self.endpoint, path))
            .json(&body)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;
        decode_response(response).await
    }
}

#[async_trait]
impl AggregationProvider for HostedAggregationClient {
    async fn create_link_token(
        &self,
        client_user_id: &str,
        client_name: &str,
    ) -> Result<String, ProviderError> {
        let response: LinkTokenResponse = self
            .post(
                "/link/token/create",
                json!({
                    "user": { "client_user_id": client_user_id },
                    "client_name": client_name,
                    "products": ["auth"],
                    "language": "en",
                    "country_codes": ["US"],
                }),
            )
            .await?;
        Ok(response.link_token)
    }

    async fn exchange_public_token(
        &self,
        public_token: &str,
    ) -> Result<TokenExchange, ProviderError> {
        self.post(
            "/item/public_token/exchange",
            json!({ "public_token": public_token }),
        )
        .await
    }

    async fn get_accounts(
        &self,
        access_token: &str,
    ) -> Result<Vec<LinkedAccount>, ProviderError> {
        let response: AccountsResponse = self
            .post("/accounts/get", json!({ "access_token": access_token }))
            .await?;
        Ok(response.accounts)
    }

    async fn create_processor_token(
        &self,
        access_token: &str,
        account_id: &str,
    ) -> Result<String, ProviderError> {
        let response: ProcessorTokenResponse = self
            .post(
                "/processor/token/create",
                json!({
                    "access_token": access_token,
                    "account_id": account_id,
                    "processor": "ach",
                }),
            )
            .await?;
        Ok(response.processor_token)
    }

    async fn get_transactions(
        &self,
        access_token: &str,
    ) -> Result<Vec<ProviderTransaction>, ProviderError> {
        let response: TransactionsResponse = self
            .post(
                "/transactions/get",
                json!({ "access_token": access_token }),
            )
            .await?;
        Ok(response.transactions)
    }
}
