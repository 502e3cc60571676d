//! Identity Toolkit REST client (email/password accounts).

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::http::build_client;
use crate::session::AuthSession;
use crate::traits::AuthService;

const IDENTITY_TOOLKIT_API: &str = "https://identitytoolkit.googleapis.com/v1";
const SECURE_TOKEN_API: &str = "https://securetoken.googleapis.com/v1";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OobCodeRequest<'a> {
    request_type: &'static str,
    email: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    id_token: String,
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    refresh_token: String,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'static str,
    refresh_token: &'a str,
}

/// The token endpoint answers in snake case, unlike the accounts API
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Firebase Authentication client using the project's web API key
pub struct FirebaseAuthClient {
    client: Client,
    api_key: String,
    api_base: String,
    token_base: String,
}

impl FirebaseAuthClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn new(api_key: String) -> Result<Self> {
        let mut client = Self::with_base_url(api_key, IDENTITY_TOOLKIT_API)?;
        client.token_base = SECURE_TOKEN_API.to_string();
        Ok(client)
    }

    /// Create a client against a custom endpoint (auth emulator); the token
    /// endpoint is served from the same root
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn with_base_url(api_key: String, api_base: &str) -> Result<Self> {
        let api_base = api_base.trim_end_matches('/').to_string();
        Ok(Self {
            client: build_client()?,
            api_key,
            token_base: api_base.clone(),
            api_base,
        })
    }

    async fn call<B, T>(&self, endpoint: &str, body: &B) -> Result<T, AuthError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let request = self
            .client
            .post(format!("{}/accounts:{endpoint}", self.api_base))
            .json(body);
        self.send(endpoint, request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, AuthError> {
        let response = request
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                log::warn!("Identity service unreachable ({endpoint}): {e}");
                AuthError::UnknownError
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let code = response
                .json::<ErrorEnvelope>()
                .await
                .map(|envelope| envelope.error.message)
                .unwrap_or_default();
            log::warn!("Identity service rejected {endpoint} ({status}): {code}");
            return Err(AuthError::from_code(&code));
        }

        response.json::<T>().await.map_err(|e| {
            log::warn!("Unexpected identity service response ({endpoint}): {e}");
            AuthError::UnknownError
        })
    }

    async fn password_flow(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let request = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let token: TokenResponse = self.call(endpoint, &request).await?;

        Ok(AuthSession {
            uid: token.local_id,
            email: token.email.unwrap_or_else(|| email.to_string()),
            id_token: token.id_token,
            refresh_token: token.refresh_token,
        })
    }
}

#[async_trait]
impl AuthService for FirebaseAuthClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.password_flow("signInWithPassword", email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.password_flow("signUp", email, password).await
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let request = OobCodeRequest {
            request_type: "PASSWORD_RESET",
            email,
        };
        let _: serde_json::Value = self.call("sendOobCode", &request).await?;
        Ok(())
    }

    async fn refresh_session(&self, session: &AuthSession) -> Result<AuthSession, AuthError> {
        let form = RefreshRequest {
            grant_type: "refresh_token",
            refresh_token: &session.refresh_token,
        };
        let request = self
            .client
            .post(format!("{}/token", self.token_base))
            .form(&form);
        let token: RefreshResponse = self.send("token", request).await?;
        log::info!("Refreshed ID token for {}", session.email);

        Ok(AuthSession {
            uid: token.user_id,
            email: session.email.clone(),
            id_token: token.id_token,
            refresh_token: token.refresh_token,
        })
    }
}
