//! Sign-in handler
//!
//! Opens a session with the identity provider and loads the caller's
//! profile. Bad credentials and provider outage are distinct failures: the
//! first is the user's to fix, the second is not.

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::providers::{IdentityProvider, Provider};
use crate::store::Documents;

use super::{AuthResult, SignInCommand};

pub struct SignInHandler {
    identity: Arc<dyn IdentityProvider>,
    documents: Documents,
}

impl SignInHandler {
    pub fn new(identity: Arc<dyn IdentityProvider>, documents: Documents) -> Self {
        Self {
            identity,
            documents,
        }
    }

    pub async fn execute(&self, command: SignInCommand) -> AppResult<AuthResult> {
        command.validate()?;

        let session = self
            .identity
            .create_session(&command.email, &command.password)
            .await
            .map_err(|e| {
                if e.is_unauthorized() {
                    AppError::InvalidCredentials
                } else {
                    AppError::external(Provider::Identity, e)
                }
            })?;

        let account = self
            .identity
            .get_account(&session.secret)
            .await
            .map_err(|e| AppError::external(Provider::Identity, e))?;

        let profile = self
            .documents
            .get_user_profile(&account.id)
            .await?
            .ok_or_else(|| AppError::not_found("user", account.id.clone()))?;

        tracing::info!(user_id = %profile.id, "user signed in");

        Ok(AuthResult {
            profile,
            session_secret: session.secret,
        })
    }
}
