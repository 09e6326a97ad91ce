//! Whole-collection persistence.
//!
//! A collection is a named list of records stored as one JSON array. Reads
//! load the full list; writes replace it. [`RecordStore::modify`] serializes
//! load-mutate-save cycles per collection so concurrent request handlers in
//! this process cannot lose each other's updates.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

pub type StoreResult<T = ()> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),
  #[error("Collection is not valid JSON: {0}")]
  Serialization(#[from] serde_json::Error),
}

/// Raw storage of one serialized payload per collection name.
#[async_trait]
pub trait StorageBackend: Send + Sync {
  /// Returns `None` when nothing was ever written under `collection`.
  async fn read(&self, collection: &str) -> StoreResult<Option<String>>;

  async fn write(&self, collection: &str, payload: String) -> StoreResult<()>;

  async fn ping(&self) -> StoreResult<()>;
}

/// Outcome of a [`RecordStore::modify`] closure.
pub enum Change<R> {
  /// Write the mutated collection back, then return the value.
  Persist(R),
  /// Leave storage untouched and return the value.
  Discard(R),
}

#[derive(Clone)]
pub struct RecordStore {
  backend: Arc<dyn StorageBackend>,
  locks: Arc<parking_lot::Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl RecordStore {
  pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
    Self {
      backend,
      locks: Arc::default(),
    }
  }

  /// Store backed by process memory, mostly for tests and demos.
  pub fn in_memory() -> Self {
    Self::new(Arc::new(MemoryBackend::default()))
  }

  pub async fn load<T: DeserializeOwned>(&self, collection: &str) -> StoreResult<Vec<T>> {
    self.read_collection(collection).await
  }

  pub async fn save<T: Serialize>(&self, collection: &str, items: &[T]) -> StoreResult<()> {
    let lock = self.lock_for(collection);
    let _guard = lock.lock().await;

    self.write_collection(collection, items).await
  }

  /// Runs `f` over the current contents of `collection` while holding the
  /// collection lock, persisting the result only on [`Change::Persist`].
  pub async fn modify<T, R, F>(&self, collection: &str, f: F) -> StoreResult<R>
  where
    T: Serialize + DeserializeOwned,
    F: FnOnce(&mut Vec<T>) -> Change<R>,
  {
    let lock = self.lock_for(collection);
    let _guard = lock.lock().await;

    let mut items = self.read_collection(collection).await?;

    match f(&mut items) {
      Change::Persist(result) => {
        self.write_collection(collection, &items).await?;
        Ok(result)
      },
      Change::Discard(result) => Ok(result),
    }
  }

  pub async fn ping(&self) -> StoreResult<()> {
    self.backend.ping().await
  }

  fn lock_for(&self, collection: &str) -> Arc<Mutex<()>> {
    self.locks.lock().entry(collection.to_string()).or_default().clone()
  }

  async fn read_collection<T: DeserializeOwned>(&self, collection: &str) -> StoreResult<Vec<T>> {
    match self.backend.read(collection).await? {
      Some(payload) => Ok(serde_json::from_str(&payload)?),
      None => Ok(Vec::new()),
    }
  }

  async fn write_collection<T: Serialize>(&self, collection: &str, items: &[T]) -> StoreResult<()> {
    let payload = serde_json::to_string(items)?;

    debug!("Writing {} records to collection {}", items.len(), collection);

    self.backend.write(collection, payload).await
  }
}
