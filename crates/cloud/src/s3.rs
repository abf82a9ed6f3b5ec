//! S3-backed image storage.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;

use crate::{new_object_key, CloudError, FileCategory, ImageStore};

/// Image store writing to an S3 bucket.
///
/// Credentials and region come from the standard AWS environment/config
/// chain; only the bucket name is configured here.
pub struct S3ImageStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ImageStore {
    /// Build a store from the ambient AWS configuration.
    ///
    /// # Panics
    ///
    /// Panics if `S3_BUCKET` is not set; an S3-backed deployment without a
    /// bucket is a misconfiguration we want to fail fast on.
    pub async fn from_env() -> Self {
        let bucket =
            std::env::var("S3_BUCKET").expect("S3_BUCKET must be set for the s3 storage backend");

        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = aws_sdk_s3::Client::new(&config);

        Self { client, bucket }
    }

    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn store(
        &self,
        category: FileCategory,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, CloudError> {
        let key = new_object_key(category, content_type);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| CloudError::Storage(format!("S3 put_object failed: {e}")))?;

        Ok(key)
    }

    async fn delete(&self, key: &str) -> Result<(), CloudError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| CloudError::Storage(format!("S3 delete_object failed: {e}")))?;
        Ok(())
    }
}
