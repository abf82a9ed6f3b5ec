//! Teamup image storage.
//!
//! [`ImageStore`] abstracts where uploaded pictures live. Production uses
//! [`S3ImageStore`]; tests and credential-less local development use
//! [`MemoryImageStore`]. Keys are opaque strings of the form
//! `{category}/{uuid}.{ext}` and are what the `avatar` columns reference.

pub mod memory;
pub mod s3;

use async_trait::async_trait;

pub use memory::MemoryImageStore;
pub use s3::S3ImageStore;

/// Object key prefix per picture kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    ProjectPic,
    UserPic,
}

impl FileCategory {
    /// Key prefix used for objects of this category.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::ProjectPic => "project-pic",
            Self::UserPic => "user-pic",
        }
    }
}

/// Error type for image storage operations.
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    /// The backing store rejected or failed the operation.
    #[error("Storage operation failed: {0}")]
    Storage(String),
}

/// Abstract picture storage used by the workflow layer.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `bytes` under a fresh key in `category`, returning the key.
    async fn store(
        &self,
        category: FileCategory,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, CloudError>;

    /// Delete the object at `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CloudError>;
}

/// File extension for a picture content type.
pub(crate) fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        _ => "bin",
    }
}

/// Build a fresh object key for a category and content type.
pub(crate) fn new_object_key(category: FileCategory, content_type: &str) -> String {
    format!(
        "{}/{}.{}",
        category.prefix(),
        uuid::Uuid::new_v4(),
        extension_for(content_type)
    )
}
