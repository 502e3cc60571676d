//! HTTP utilities shared by the backend clients.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::error::{RemoteError, RemoteResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the client every backend uses
pub fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("habitloop/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")
}

/// Extension trait for `reqwest::Response` to handle common error patterns.
#[async_trait::async_trait]
pub trait ResponseExt {
    /// Ensure the response status is successful, logging the body if not.
    ///
    /// # Errors
    ///
    /// Returns the `RemoteError` matching the status when it is not 2xx.
    async fn ensure_success(self, api_name: &str) -> RemoteResult<Self>
    where
        Self: Sized;
}

#[async_trait::async_trait]
impl ResponseExt for reqwest::Response {
    async fn ensure_success(self, api_name: &str) -> RemoteResult<Self> {
        if !self.status().is_success() {
            let status = self.status();
            let error_text = self.text().await.unwrap_or_default();
            log::debug!("{api_name} API error ({status}): {error_text}");
            return Err(RemoteError::from_status(status));
        }
        Ok(self)
    }
}
