//! Seams for the platform-provided stores. The handlers only ever see
//! these traits; which backend sits behind them is an environment concern.

mod memory;

pub use memory::{InMemoryKeyValueStore, InMemoryObjectStore};

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("storage backend error")]
    Backend(#[source] anyhow::Error),
}

/// Key-value namespace with optional per-key expiry, matching the surface
/// the hosting platform exposes: get, put, list by prefix, delete.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes `value` under `key`. A `ttl` makes the entry disappear on its
    /// own once the window elapses.
    async fn put(
        &self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<(), StorageError>;

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Default)]
pub struct ObjectMetadata {
    pub content_type: Option<String>,
    pub custom: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub metadata: ObjectMetadata,
}

/// Object bucket: raw bytes plus content-type and descriptive metadata.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(
        &self,
        key: &str,
        body: Bytes,
        metadata: ObjectMetadata,
    ) -> Result<(), StorageError>;

    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StorageError>;
}
