//! Provider clients
//!
//! Typed clients for the three hosted platforms Horizon orchestrates:
//! the identity/document store, the bank-data aggregator, and the ACH
//! payments service. Each client sits behind a trait so handlers and tests
//! never depend on the concrete HTTP implementation.

pub mod aggregation;
pub mod identity;
pub mod payments;

pub use aggregation::{AggregationProvider, HostedAggregationClient};
pub use identity::{HostedIdentityClient, IdentityProvider};
pub use payments::{HostedPaymentsClient, PaymentsProvider};

use std::time::Duration;

/// Which external platform an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Identity,
    Aggregation,
    Payments,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Identity => write!(f, "identity"),
            Provider::Aggregation => write!(f, "aggregation"),
            Provider::Payments => write!(f, "payments"),
        }
    }
}

/// Failure of a single outbound provider call.
///
/// Timeouts are kept distinct from other transport failures so callers can
/// report them as such instead of a generic upstream error.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ProviderError {
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }

    /// True when the provider rejected the caller's credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ProviderError::Status { status: 401, .. })
    }

    /// True when the provider reported the resource missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::Status { status: 404, .. })
    }
}

/// Build the shared outbound HTTP client with the configured bounded timeout.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Transport(e.to_string()))
}

/// Turn a non-2xx response into `ProviderError::Status`, otherwise decode
/// the JSON body.
pub(crate) async fn decode_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::Decode(e.to_string()))
}

/// Like `decode_response` but for calls whose success payload is irrelevant.
pub(crate) async fn check_response(response: reqwest::Response) -> Result<(), ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(())
}
