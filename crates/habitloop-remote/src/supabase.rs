//! Supabase Storage client for the profile picture bucket.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{header, Client};

use crate::error::RemoteResult;
use crate::http::{build_client, ResponseExt};
use crate::traits::ObjectStorage;

pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl SupabaseStorage {
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn new(base_url: &str, api_key: String, bucket: String) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            bucket,
        })
    }
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn upload(&self, name: &str, bytes: Vec<u8>, content_type: &str) -> RemoteResult<()> {
        let url = format!(
            "{}/storage/v1/object/{}/{name}",
            self.base_url, self.bucket
        );
        let size = bytes.len();

        self.client
            .post(url)
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .header("x-upsert", "true")
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?
            .ensure_success("Supabase Storage")
            .await?;

        log::info!("Uploaded {name} ({size} bytes) to bucket {}", self.bucket);
        Ok(())
    }

    fn public_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{name}",
            self.base_url, self.bucket
        )
    }
}
