//! Persisted record types
//!
//! The documents Horizon stores in the hosted document store. Each struct
//! round-trips through the store's JSON shape, where the document id lives
//! under the `$id` key. API-facing response types live in `api::routes`;
//! these are the storage shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A user's profile document, keyed by their identity-provider account id.
/// Written once at sign-up; the payments-customer fields are set then and
/// never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "$id", default)]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub date_of_birth: String,
    /// Only the last four digits are ever persisted.
    pub ssn_last4: String,
    pub payments_customer_id: String,
    pub payments_customer_url: String,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A linked external bank account. Created only after its funding source
/// exists at the payments provider; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankRecord {
    #[serde(rename = "$id", default)]
    pub id: String,
    pub user_id: String,
    /// Aggregator item id the account belongs to.
    pub item_id: String,
    /// Aggregator account id.
    pub account_id: String,
    /// Aggregator access token. Persisted, but never exposed through the API.
    pub access_token: String,
    pub funding_source_url: String,
    pub shareable_id: String,
}

/// A completed peer-to-peer transfer. Created exactly once per successful
/// provider transfer; immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "$id", default)]
    pub id: String,
    /// Transfer note shown in both parties' history.
    pub name: String,
    /// Decimal string, e.g. "25.50".
    pub amount: String,
    pub sender_id: String,
    pub sender_bank_id: String,
    pub receiver_id: String,
    pub receiver_bank_id: String,
    pub email: String,
    /// Idempotency key the transfer was submitted under.
    pub correlation_id: String,
    /// Hash of the submitted request, for same-key-different-body detection.
    pub request_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Serialize a record into the `data` payload of a document write, dropping
/// the `$id` metadata key (the store supplies it).
pub fn document_data<T: Serialize>(record: &T) -> Result<Value, serde_json::Error> {
    let mut value = serde_json::to_value(record)?;
    if let Some(map) = value.as_object_mut() {
        map.remove("$id");
    }
    Ok(value)
}
