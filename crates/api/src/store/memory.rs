use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{StorageBackend, StoreResult};

#[derive(Default)]
pub struct MemoryBackend {
  collections: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl StorageBackend for MemoryBackend {
  async fn read(&self, collection: &str) -> StoreResult<Option<String>> {
    Ok(self.collections.lock().get(collection).cloned())
  }

  async fn write(&self, collection: &str, payload: String) -> StoreResult<()> {
    self.collections.lock().insert(collection.to_string(), payload);
    Ok(())
  }

  async fn ping(&self) -> StoreResult<()> {
    Ok(())
  }
}
