//! In-memory image storage for tests and credential-less local development.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{new_object_key, CloudError, FileCategory, ImageStore};

/// Image store keeping objects in a process-local map.
#[derive(Default)]
pub struct MemoryImageStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects (test helper).
    pub fn len(&self) -> usize {
        self.objects.lock().expect("image store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an object exists at `key` (test helper).
    pub fn contains(&self, key: &str) -> bool {
        self.objects
            .lock()
            .expect("image store lock poisoned")
            .contains_key(key)
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn store(
        &self,
        category: FileCategory,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, CloudError> {
        let key = new_object_key(category, content_type);
        self.objects
            .lock()
            .expect("image store lock poisoned")
            .insert(key.clone(), bytes);
        Ok(key)
    }

    async fn delete(&self, key: &str) -> Result<(), CloudError> {
        self.objects
            .lock()
            .expect("image store lock poisoned")
            .remove(key);
        Ok(())
    }
}
