//! Transfer handler
//!
//! Peer-to-peer transfer between two linked bank accounts. Every submission
//! runs under an idempotency key (client-supplied or generated): the key is
//! forwarded to the payments provider and stored on the transaction record,
//! so a retried submission returns the existing record instead of moving
//! money twice. A record is persisted only after the provider reports
//! success; a provider failure persists nothing.

use std::sync::Arc;

use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::cache::{overview_key, RouteCache};
use crate::domain::{ShareableIdCodec, TransactionRecord};
use crate::error::{AppError, AppResult};
use crate::providers::{PaymentsProvider, Provider};
use crate::store::Documents;

use super::TransferCommand;

/// Result of a transfer submission. `duplicate` marks a replayed
/// idempotency key whose original outcome is being returned.
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    pub transaction: TransactionRecord,
    pub duplicate: bool,
}

pub struct TransferHandler {
    payments: Arc<dyn PaymentsProvider>,
    documents: Documents,
    codec: ShareableIdCodec,
    cache: RouteCache,
}

impl TransferHandler {
    pub fn new(
        payments: Arc<dyn PaymentsProvider>,
        documents: Documents,
        codec: ShareableIdCodec,
        cache: RouteCache,
    ) -> Self {
        Self {
            payments,
            documents,
            codec,
            cache,
        }
    }

    pub async fn execute(
        &self,
        command: TransferCommand,
        idempotency_key: Option<String>,
        sender_user_id: &str,
    ) -> AppResult<TransferOutcome> {
        let amount = command.validate()?;

        let correlation_id =
            idempotency_key.unwrap_or_else(|| Uuid::new_v4().to_string());
        let request_hash = Self::compute_request_hash(&command, sender_user_id);

        // A replayed key short-circuits before any provider call.
        if let Some(existing) = self
            .documents
            .find_transaction_by_correlation_id(&correlation_id)
            .await?
        {
            if existing.request_hash != request_hash {
                return Err(AppError::IdempotencyConflict);
            }
            return Ok(TransferOutcome {
                transaction: existing,
                duplicate: true,
            });
        }

        let receiver_account_id = self
            .codec
            .decode(&command.shareable_id)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let receiver_bank = self
            .documents
            .find_bank_by_account_id(&receiver_account_id)
            .await?
            .ok_or_else(|| AppError::not_found("bank", receiver_account_id.clone()))?;

        let sender_bank = self
            .documents
            .get_bank(&command.sender_bank_id)
            .await?
            .filter(|bank| bank.user_id == sender_user_id)
            .ok_or_else(|| AppError::not_found("bank", command.sender_bank_id.clone()))?;

        if sender_bank.id == receiver_bank.id {
            return Err(AppError::SameBankTransfer);
        }

        self.payments
            .create_transfer(
                &sender_bank.funding_source_url,
                &receiver_bank.funding_source_url,
                &amount.as_wire(),
                &correlation_id,
            )
            .await
            .map_err(|e| AppError::external(Provider::Payments, e))?;

        let record = TransactionRecord {
            id: String::new(),
            name: command.name.clone(),
            amount: amount.as_wire(),
            sender_id: sender_bank.user_id.clone(),
            sender_bank_id: sender_bank.id.clone(),
            receiver_id: receiver_bank.user_id.clone(),
            receiver_bank_id: receiver_bank.id.clone(),
            email: command.email.clone(),
            correlation_id: correlation_id.clone(),
            request_hash,
            created_at: Utc::now(),
        };

        // The money has moved; failing to record it is a data inconsistency,
        // not a failed transfer.
        let transaction = self.documents.create_transaction(&record).await.map_err(|e| {
            AppError::partial_failure(
                "transfer",
                format!(
                    "provider transfer {} completed but transaction record failed: {}",
                    correlation_id, e
                ),
            )
        })?;

        self.cache.invalidate(&overview_key(&sender_bank.user_id)).await;
        self.cache
            .invalidate(&overview_key(&receiver_bank.user_id))
            .await;

        tracing::info!(
            correlation_id = %correlation_id,
            sender_bank = %sender_bank.id,
            receiver_bank = %receiver_bank.id,
            "transfer completed"
        );

        Ok(TransferOutcome {
            transaction,
            duplicate: false,
        })
    }

    /// Hash of the caller and the fields that define a transfer, for
    /// detecting a reused idempotency key with a different request. The
    /// caller is part of the hash so one user's key never replays into
    /// another user's stored outcome.
    fn compute_request_hash(command: &TransferCommand, sender_user_id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(sender_user_id.as_bytes());
        hasher.update(b"|");
        hasher.update(command.amount.as_bytes());
        hasher.update(b"|");
        hasher.update(command.sender_bank_id.as_bytes());
        hasher.update(b"|");
        hasher.update(command.shareable_id.as_bytes());
        hex::encode(hasher.finalize())
    }
}
