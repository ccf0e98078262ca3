//! Sign-up handler
//!
//! Registers a user across both platforms: identity account, payments
//! customer, profile document, session. If any step after the identity
//! account fails, the account is deleted again so a failed sign-up leaves
//! nothing behind.

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::providers::payments::{resource_id_from_url, NewPaymentsCustomer};
use crate::providers::{IdentityProvider, PaymentsProvider, Provider, ProviderError};
use crate::store::Documents;

use super::{AuthResult, SignUpCommand};
use crate::domain::UserProfile;

pub struct SignUpHandler {
    identity: Arc<dyn IdentityProvider>,
    payments: Arc<dyn PaymentsProvider>,
    documents: Documents,
}

impl SignUpHandler {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        payments: Arc<dyn PaymentsProvider>,
        documents: Documents,
    ) -> Self {
        Self {
            identity,
            payments,
            documents,
        }
    }

    pub async fn execute(&self, command: SignUpCommand) -> AppResult<AuthResult> {
        command.validate()?;

        let full_name = format!("{} {}", command.first_name, command.last_name);
        let account = self
            .identity
            .create_account(&command.email, &command.password, &full_name)
            .await
            .map_err(|e| match e {
                // Duplicate email is the caller's problem, not an outage.
                ProviderError::Status { status: 409, .. } => {
                    AppError::Validation("email is already registered".to_string())
                }
                e => AppError::external(Provider::Identity, e),
            })?;

        let customer_url = match self
            .payments
            .create_customer(&NewPaymentsCustomer {
                first_name: command.first_name.clone(),
                last_name: command.last_name.clone(),
                email: command.email.clone(),
                customer_type: "personal".to_string(),
                address1: command.address1.clone(),
                city: command.city.clone(),
                state: command.state.clone(),
                postal_code: command.postal_code.clone(),
                date_of_birth: command.date_of_birth.clone(),
                ssn: command.ssn.clone(),
            })
            .await
        {
            Ok(url) => url,
            Err(e) => {
                self.rollback_account(&account.id).await;
                return Err(AppError::external(Provider::Payments, e));
            }
        };

        let customer_id = match resource_id_from_url(&customer_url) {
            Some(id) => id.to_string(),
            None => {
                self.rollback_account(&account.id).await;
                return Err(AppError::Internal(format!(
                    "unparseable payments customer url: {}",
                    customer_url
                )));
            }
        };

        let profile = UserProfile {
            id: account.id.clone(),
            first_name: command.first_name.clone(),
            last_name: command.last_name.clone(),
            email: command.email.clone(),
            address1: command.address1.clone(),
            city: command.city.clone(),
            state: command.state.clone(),
            postal_code: command.postal_code.clone(),
            date_of_birth: command.date_of_birth.clone(),
            ssn_last4: command.ssn_last4(),
            payments_customer_id: customer_id,
            payments_customer_url: customer_url,
        };

        let profile = match self.documents.create_user_profile(&profile).await {
            Ok(profile) => profile,
            Err(e) => {
                self.rollback_account(&account.id).await;
                return Err(e);
            }
        };

        let session = self
            .identity
            .create_session(&command.email, &command.password)
            .await
            .map_err(|e| AppError::external(Provider::Identity, e))?;

        tracing::info!(user_id = %profile.id, "user signed up");

        Ok(AuthResult {
            profile,
            session_secret: session.secret,
        })
    }

    /// Delete the identity account created earlier in a failed sign-up. The
    /// payments customer (if any) cannot be deleted through the API and is
    /// left for the provider's dormant-customer cleanup.
    async fn rollback_account(&self, account_id: &str) {
        if let Err(e) = self.identity.delete_account(account_id).await {
            // Compensation itself failed; the orphaned account is now a
            // known inconsistency.
            let _ = AppError::partial_failure(
                "sign_up",
                format!("failed to delete identity account {}: {}", account_id, e),
            );
        }
    }
}
