use habitloop_remote::ObjectStorage;
use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;

pub struct ProfilePictureRepository {
    storage: Arc<dyn ObjectStorage>,
}

impl ProfilePictureRepository {
    #[must_use]
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    /// Upload an image under a random name and return its public URL
    ///
    /// # Errors
    ///
    /// Returns the remote failure if the upload is rejected
    pub async fn upload_profile_picture(&self, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let name = Uuid::new_v4().to_string();
        self.storage.upload(&name, bytes, content_type).await?;
        info!("Uploaded profile picture {}", name);
        Ok(self.storage.public_url(&name))
    }
}
