//! ACH payments client
//!
//! Client for the money-movement provider. The provider is resource-URL
//! oriented: creating a customer, funding source, or transfer answers with
//! a `Location` header pointing at the new resource, and those URLs are
//! what later calls (and Horizon's own records) reference.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;

use crate::config::Config;
use crate::providers::{check_response, http_client, ProviderError};

/// Profile fields required to register a payments customer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPaymentsCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub customer_type: String,
    pub address1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub date_of_birth: String,
    pub ssn: String,
}

/// Operations Horizon needs from the payments provider.
#[async_trait]
pub trait PaymentsProvider: Send + Sync {
    /// Register a customer; returns the customer resource URL.
    async fn create_customer(
        &self,
        customer: &NewPaymentsCustomer,
    ) -> Result<String, ProviderError>;

    /// Register a funding source for a customer; returns its resource URL.
    async fn create_funding_source(
        &self,
        customer_id: &str,
        processor_token: &str,
        bank_name: &str,
    ) -> Result<String, ProviderError>;

    /// Remove a funding source. Used only to compensate a linking flow that
    /// failed after the source was created.
    async fn remove_funding_source(&self, funding_source_url: &str)
        -> Result<(), ProviderError>;

    /// Move money between two funding sources. The idempotency key makes a
    /// retried submission a no-op at the provider. Returns the transfer
    /// resource URL.
    async fn create_transfer(
        &self,
        source_funding_source_url: &str,
        destination_funding_source_url: &str,
        amount: &str,
        idempotency_key: &str,
    ) -> Result<String, ProviderError>;
}

/// Last path segment of a payments resource URL, i.e. the resource id.
pub fn resource_id_from_url(url: &str) -> Option<&str> {
    url.trim_end_matches('/').rsplit('/').next().filter(|s| !s.is_empty())
}

/// HTTP client for the hosted payments provider.
pub struct HostedPaymentsClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HostedPaymentsClient {
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        Ok(Self {
            http: http_client(config.provider_timeout)?,
            endpoint: config.payments_endpoint.trim_end_matches('/').to_string(),
            api_key: config.payments_api_key.clone(),
        })
    }

    /// POST a resource-creating request and return the `Location` header.
    async fn create_resource(
        &self,
        url: String,
        body: serde_json::Value,
        idempotency_key: Option<&str>,
    ) -> Result<String, ProviderError> {
        let mut request = self.http.post(url).bearer_auth(&self.api_key).json(&body);
        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        let response = request.send().await.map_err(ProviderError::from_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                ProviderError::Decode("missing Location header on created resource".to_string())
            })
    }
}

#[async_trait]
impl PaymentsProvider for HostedPaymentsClient {
    async fn create_customer(
        &self,
        customer: &NewPaymentsCustomer,
    ) -> Result<String, ProviderError> {
        self.create_resource(
            format!("{}/customers", self.endpoint),
            serde_json::to_value(customer)
                .map_err(|e| ProviderError::Decode(e.to_string()))?,
            None,
        )
        .await
    }

    async fn create_funding_source(
        &self,
        customer_id: &str,
        processor_token: &str,
        bank_name: &str,
    ) -> Result<String, ProviderError> {
        self.create_resource(
            format!("{}/customers/{}/funding-sources", self.endpoint, customer_id),
            json!({ "processorToken": processor_token, "name": bank_name }),
            None,
        )
        .await
    }

    async fn remove_funding_source(
        &self,
        funding_source_url: &str,
    ) -> Result<(), ProviderError> {
        let response = self
            .http
            .post(funding_source_url)
            .bearer_auth(&self.api_key)
            .json(&json!({ "removed": true }))
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;
        check_response(response).await
    }

    async fn create_transfer(
        &self,
        source_funding_source_url: &str,
        destination_funding_source_url: &str,
        amount: &str,
        idempotency_key: &str,
    ) -> Result<String, ProviderError> {
        self.create_resource(
            format!("{}/transfers", self.endpoint),
            json!({
                "_links": {
                    "source": { "href": source_funding_source_url },
                    "destination": { "href": destination_funding_source_url },
                },
                "amount": { "currency": "USD", "value": amount },
            }),
            Some(idempotency_key),
        )
        .await
    }
}
