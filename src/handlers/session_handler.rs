//! Session handler
//!
//! Read side of the identity gateway: resolve the user behind a session
//! token, and close sessions. Resolution is a display-path read and
//! degrades to `None` on any failure (no session, expired session,
//! provider error). Callers must not use it to gate mutations; the
//! session middleware re-resolves per request.

use std::sync::Arc;

use crate::domain::UserProfile;
use crate::providers::IdentityProvider;
use crate::store::Documents;

pub struct SessionHandler {
    identity: Arc<dyn IdentityProvider>,
    documents: Documents,
}

impl SessionHandler {
    pub fn new(identity: Arc<dyn IdentityProvider>, documents: Documents) -> Self {
        Self {
            identity,
            documents,
        }
    }

    /// The profile the session token authenticates, or `None`.
    pub async fn current_user(&self, session_token: &str) -> Option<UserProfile> {
        let account = match self.identity.get_account(session_token).await {
            Ok(account) => account,
            Err(e) => {
                tracing::debug!(error = %e, "session did not resolve to an account");
                return None;
            }
        };

        match self.documents.get_user_profile(&account.id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::debug!(error = %e, "profile lookup failed for session");
                None
            }
        }
    }

    /// Delete the session remotely. Reports success as a value; the API
    /// layer clears the cookie regardless.
    pub async fn logout(&self, session_token: &str) -> bool {
        match self.identity.delete_session(session_token).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "remote session deletion failed");
                false
            }
        }
    }
}
