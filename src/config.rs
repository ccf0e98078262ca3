//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which accounts of a newly linked item become bank records.
///
/// The aggregation provider groups one or more accounts under an item;
/// taking the first one silently would be an implicit choice, so it is a
/// configurable policy instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountSelectionPolicy {
    /// Link only the first account of the item.
    FirstOnly,
    /// Link every account of the item, one bank record each.
    All,
}

impl FromStr for AccountSelectionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first_only" => Ok(Self::FirstOnly),
            "all" => Ok(Self::All),
            _ => Err(ConfigError::InvalidValue("ACCOUNT_SELECTION_POLICY")),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Identity/document-store endpoint (e.g. https://identity.example.com/v1)
    pub identity_endpoint: String,

    /// Identity provider project id
    pub identity_project: String,

    /// Identity provider server API key (admin scope)
    pub identity_api_key: String,

    /// Database id holding the users/banks/transactions collections
    pub identity_database_id: String,

    /// Collection ids within the database
    pub users_collection_id: String,
    pub banks_collection_id: String,
    pub transactions_collection_id: String,

    /// Aggregation provider endpoint (e.g. https://sandbox.aggregator.example.com)
    pub aggregation_endpoint: String,
    pub aggregation_client_id: String,
    pub aggregation_secret: String,

    /// Payments provider endpoint (e.g. https://api-sandbox.payments.example.com)
    pub payments_endpoint: String,
    pub payments_api_key: String,

    /// Secret the shareable-id codec derives its keystream from
    pub shareable_id_secret: String,

    /// Bounded timeout applied to every outbound provider call
    pub provider_timeout: Duration,

    /// Whether the session cookie carries the Secure attribute
    pub cookie_secure: bool,

    /// Which accounts of a linked item get bank records
    pub account_selection_policy: AccountSelectionPolicy,

    /// TTL for the cached accounts-overview route
    pub route_cache_ttl: Duration,

    /// Rows per transaction-list page
    pub transactions_page_size: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let identity_endpoint = require("IDENTITY_ENDPOINT")?;
        let identity_project = require("IDENTITY_PROJECT")?;
        let identity_api_key = require("IDENTITY_API_KEY")?;
        let identity_database_id = require("IDENTITY_DATABASE_ID")?;

        let users_collection_id =
            env::var("USERS_COLLECTION_ID").unwrap_or_else(|_| "users".to_string());
        let banks_collection_id =
            env::var("BANKS_COLLECTION_ID").unwrap_or_else(|_| "banks".to_string());
        let transactions_collection_id =
            env::var("TRANSACTIONS_COLLECTION_ID").unwrap_or_else(|_| "transactions".to_string());

        let aggregation_endpoint = require("AGGREGATION_ENDPOINT")?;
        let aggregation_client_id = require("AGGREGATION_CLIENT_ID")?;
        let aggregation_secret = require("AGGREGATION_SECRET")?;

        let payments_endpoint = require("PAYMENTS_ENDPOINT")?;
        let payments_api_key = require("PAYMENTS_API_KEY")?;

        let shareable_id_secret = require("SHAREABLE_ID_SECRET")?;

        let provider_timeout_secs: u64 = env::var("PROVIDER_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PROVIDER_TIMEOUT_SECS"))?;

        let cookie_secure = env::var("COOKIE_SECURE")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("COOKIE_SECURE"))?;

        let account_selection_policy = env::var("ACCOUNT_SELECTION_POLICY")
            .unwrap_or_else(|_| "first_only".to_string())
            .parse()?;

        let route_cache_ttl_secs: u64 = env::var("ROUTE_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("ROUTE_CACHE_TTL_SECS"))?;

        let transactions_page_size: usize = env::var("TRANSACTIONS_PAGE_SIZE")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TRANSACTIONS_PAGE_SIZE"))?;
        if transactions_page_size == 0 {
            return Err(ConfigError::InvalidValue("TRANSACTIONS_PAGE_SIZE"));
        }

        Ok(Self {
            host,
            port,
            environment,
            identity_endpoint,
            identity_project,
            identity_api_key,
            identity_database_id,
            users_collection_id,
            banks_collection_id,
            transactions_collection_id,
            aggregation_endpoint,
            aggregation_client_id,
            aggregation_secret,
            payments_endpoint,
            payments_api_key,
            shareable_id_secret,
            provider_timeout: Duration::from_secs(provider_timeout_secs),
            cookie_secure,
            account_selection_policy,
            route_cache_ttl: Duration::from_secs(route_cache_ttl_secs),
            transactions_page_size,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingEnv(name))
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_selection_policy_parse() {
        assert_eq!(
            "first_only".parse::<AccountSelectionPolicy>().unwrap(),
            AccountSelectionPolicy::FirstOnly
        );
        assert_eq!(
            "all".parse::<AccountSelectionPolicy>().unwrap(),
            AccountSelectionPolicy::All
        );
        assert!("user_prompt".parse::<AccountSelectionPolicy>().is_err());
    }
}
