use async_trait::async_trait;
use habitloop_storage::Quote;
use serde_json::Value;

use crate::error::{AuthError, RemoteResult};
use crate::session::AuthSession;

/// Remote document database addressed by slash-separated paths
/// (`users/<uid>` or `users/<uid>/habits/<id>`)
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document, `None` when it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the document cannot be decoded
    async fn get_document(&self, path: &str) -> RemoteResult<Option<Value>>;

    /// Create or fully replace a document with a JSON object
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or `fields` is not an object
    async fn set_document(&self, path: &str, fields: &Value) -> RemoteResult<()>;

    /// Delete a document; deleting a missing document succeeds
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails
    async fn delete_document(&self, path: &str) -> RemoteResult<()>;

    /// List every document of a collection as `(document id, fields)` pairs
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails
    async fn list_documents(&self, collection: &str) -> RemoteResult<Vec<(String, Value)>>;
}

/// Single-bucket object storage for profile pictures
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload (or overwrite) an object
    ///
    /// # Errors
    ///
    /// Returns an error if the upload request fails
    async fn upload(&self, name: &str, bytes: Vec<u8>, content_type: &str) -> RemoteResult<()>;

    /// Public URL an uploaded object is served from
    #[must_use]
    fn public_url(&self, name: &str) -> String;
}

/// Email/password identity service
#[async_trait]
pub trait AuthService: Send + Sync {
    /// # Errors
    ///
    /// Returns the `AuthError` kind reported by the identity service
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// # Errors
    ///
    /// Returns the `AuthError` kind reported by the identity service
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// # Errors
    ///
    /// Returns the `AuthError` kind reported by the identity service
    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// Exchange the session's refresh token for a fresh ID token
    ///
    /// # Errors
    ///
    /// Returns the `AuthError` kind reported by the token service
    async fn refresh_session(&self, session: &AuthSession) -> Result<AuthSession, AuthError>;
}

/// Unauthenticated quotation service
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload holds no quote
    async fn random_quote(&self) -> RemoteResult<Quote>;
}
