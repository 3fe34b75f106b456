//! Durable key-value mirror.
//!
//! The durable store is advisory: reads that fail or do not parse are treated
//! as absence, and writes are best-effort. Nothing in the live session treats
//! it as the source of truth.

mod file;
mod memory;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::warn;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by a [`DurableStore`] implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Serialising a value for storage failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Underlying storage system failure.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Async string key-value persistence.
///
/// Each logical key is written by exactly one store, so implementations need
/// no cross-key coordination.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Read the value stored under `key`, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read and decode a JSON value. Storage and decoding failures are logged and
/// reported as absence.
pub async fn read_json<T: DeserializeOwned>(store: &dyn DurableStore, key: &str) -> Option<T> {
    let raw = match store.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!("failed to read `{key}` from durable store: {err}");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("ignoring malformed `{key}` in durable store: {err}");
            None
        }
    }
}

/// Encode and write a JSON value, logging instead of failing. Returns whether
/// the write landed.
pub async fn write_json<T: Serialize + ?Sized>(
    store: &dyn DurableStore,
    key: &str,
    value: &T,
) -> bool {
    let result = match serde_json::to_string(value) {
        Ok(encoded) => store.set(key, &encoded).await,
        Err(err) => Err(StorageError::from(err)),
    };

    match result {
        Ok(()) => true,
        Err(err) => {
            warn!("failed to persist `{key}`: {err}");
            false
        }
    }
}

/// Remove a key, logging instead of failing. Returns whether the removal landed.
pub async fn remove_quietly(store: &dyn DurableStore, key: &str) -> bool {
    match store.remove(key).await {
        Ok(()) => true,
        Err(err) => {
            warn!("failed to remove `{key}` from durable store: {err}");
            false
        }
    }
}
