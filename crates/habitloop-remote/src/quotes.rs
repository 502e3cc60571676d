//! ZenQuotes client.

use anyhow::Result;
use async_trait::async_trait;
use habitloop_storage::Quote;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{RemoteError, RemoteResult};
use crate::http::{build_client, ResponseExt};
use crate::traits::QuoteSource;

pub const DEFAULT_QUOTE_URL: &str = "https://zenquotes.io/api/random";

/// `[{"q": "...", "a": "...", "h": "..."}]`
#[derive(Debug, Deserialize)]
struct QuoteDto {
    q: String,
    a: String,
}

pub struct ZenQuotesClient {
    client: Client,
    url: String,
}

impl ZenQuotesClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn new(url: &str) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl QuoteSource for ZenQuotesClient {
    async fn random_quote(&self) -> RemoteResult<Quote> {
        let quotes: Vec<QuoteDto> = self
            .client
            .get(&self.url)
            .send()
            .await?
            .ensure_success("ZenQuotes")
            .await?
            .json()
            .await?;

        quotes
            .into_iter()
            .next()
            .map(|dto| Quote {
                text: dto.q,
                author: dto.a,
            })
            .ok_or(RemoteError::Serialization)
    }
}
