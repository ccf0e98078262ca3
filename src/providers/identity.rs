//! Identity/document-store client
//!
//! Wraps the hosted identity platform: account + session management and the
//! document collections all durable Horizon state lives in. Admin-scoped
//! calls carry the server API key; session-scoped calls (current account,
//! logout) carry the caller's session secret instead, mirroring the
//! admin/session client split of the hosted SDK.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::Config;
use crate::providers::{check_response, decode_response, http_client, ProviderError};

/// An identity-provider account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderAccount {
    #[serde(rename = "$id")]
    pub id: String,
    pub email: String,
    pub name: String,
}

/// An identity-provider session. `secret` is the opaque token the session
/// cookie carries.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSession {
    #[serde(rename = "$id")]
    pub id: String,
    pub secret: String,
}

/// Operations Horizon needs from the identity/document-store platform.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<ProviderAccount, ProviderError>;

    /// Admin-scoped account deletion, used only to compensate a failed
    /// sign-up.
    async fn delete_account(&self, account_id: &str) -> Result<(), ProviderError>;

    async fn create_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, ProviderError>;

    /// Delete the session the given secret belongs to.
    async fn delete_session(&self, session_token: &str) -> Result<(), ProviderError>;

    /// Resolve the account the given session secret authenticates.
    async fn get_account(&self, session_token: &str) -> Result<ProviderAccount, ProviderError>;

    async fn create_document(
        &self,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Value, ProviderError>;

    /// `Ok(None)` when the document does not exist.
    async fn get_document(
        &self,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Option<Value>, ProviderError>;

    /// Equality-filtered listing within a collection.
    async fn list_documents(
        &self,
        collection_id: &str,
        filters: &[(&str, &str)],
    ) -> Result<Vec<Value>, ProviderError>;

    async fn delete_document(
        &self,
        collection_id: &str,
        document_id: &str,
    ) -> Result<(), ProviderError>;
}

#[derive(Debug, Deserialize)]
struct DocumentList {
    documents: Vec<Value>,
}

/// HTTP client for the hosted identity platform.
pub struct HostedIdentityClient {
    http: reqwest::Client,
    endpoint: String,
    project: String,
    api_key: String,
    database_id: String,
}

impl HostedIdentityClient {
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        Ok(Self {
            http: http_client(config.provider_timeout)?,
            endpoint: config.identity_endpoint.trim_end_matches('/').to_string(),
            project: config.identity_project.clone(),
            api_key: config.identity_api_key.clone(),
            database_id: config.identity_database_id.clone(),
        })
    }

    fn admin(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("X-Horizon-Project", &self.project)
            .header("X-Horizon-Key", &self.api_key)
    }

    fn session(
        &self,
        builder: reqwest::RequestBuilder,
        session_token: &str,
    ) -> reqwest::RequestBuilder {
        builder
            .header("X-Horizon-Project", &self.project)
            .header("X-Horizon-Session", session_token)
    }

    fn documents_url(&self, collection_id: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.endpoint, self.database_id, collection_id
        )
    }
}

#[async_trait]
impl IdentityProvider for HostedIdentityClient {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<ProviderAccount, ProviderError> {
        let response = self
            .admin(self.http.post(format!("{}/account", self.endpoint)))
            .json(&json!({
                "userId": "unique()",
                "email": email,
                "password": password,
                "name": name,
            }))
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;
        decode_response(response).await
    }

    async fn delete_account(&self, account_id: &str) -> Result<(), ProviderError> {
        let response = self
            .admin(
                self.http
                    .delete(format!("{}/users/{}", self.endpoint, account_id)),
            )
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;
        check_response(response).await
    }

    async fn create_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, ProviderError> {
        let response = self
            .admin(
                self.http
                    .post(format!("{}/account/sessions/email", self.endpoint)),
            )
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;
        decode_response(response).await
    }

    async fn delete_session(&self, session_token: &str) -> Result<(), ProviderError> {
        let response = self
            .session(
                self.http
                    .delete(format!("{}/account/sessions/current", self.endpoint)),
                session_token,
            )
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;
        check_response(response).await
    }

    async fn get_account(&self, session_token: &str) -> Result<ProviderAccount, ProviderError> {
        let response = self
            .session(
                self.http.get(format!("{}/account", self.endpoint)),
                session_token,
            )
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;
        decode_response(response).await
    }

    async fn create_document(
        &self,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Value, ProviderError> {
        let response = self
            .admin(self.http.post(self.documents_url(collection_id)))
            .json(&json!({ "documentId": document_id, "data": data }))
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;
        decode_response(response).await
    }

    async fn get_document(
        &self,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Option<Value>, ProviderError> {
        let url = format!("{}/{}", self.documents_url(collection_id), document_id);
        let response = self
            .admin(self.http.get(url))
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;
        match decode_response(response).await {
            Ok(doc) => Ok(Some(doc)),
            Err(ref e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list_documents(
        &self,
        collection_id: &str,
        filters: &[(&str, &str)],
    ) -> Result<Vec<Value>, ProviderError> {
        let queries: Vec<String> = filters
            .iter()
            .map(|(field, value)| format!("equal(\"{}\", [\"{}\"])", field, value))
            .collect();
        let params: Vec<(&str, &str)> = queries.iter().map(|q| ("queries[]", q.as_str())).collect();

        let response = self
            .admin(self.http.get(self.documents_url(collection_id)))
            .query(&params)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;
        let list: DocumentList = decode_response(response).await?;
        Ok(list.documents)
    }

    async fn delete_document(
        &self,
        collection_id: &str,
        document_id: &str,
    ) -> Result<(), ProviderError> {
        let url = format!("{}/{}", self.documents_url(collection_id), document_id);
        let response = self
            .admin(self.http.delete(url))
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;
        check_response(response).await
    }
}
