//! Durable key/value state that survives process restarts.
//!
//! The coordinator only ever stores one key (the list of versions currently
//! being installed), but the store itself is a general JSON key/value map so
//! hosts can back it with whatever persistence they already have.

pub mod file;
pub mod installing;
pub mod memory;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::StateError;

pub use file::JsonFileStateStore;
pub use installing::{INSTALLING_VERSIONS_KEY, InstallingVersions};
pub use memory::MemoryStateStore;

/// Persistent key/value map.
///
/// No transactional guarantee across keys. Every read reflects the latest
/// write visible to this process; callers doing read-modify-write must re-read
/// right before writing.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StateError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StateError>;
}

/// Read `key` as `T`, falling back to `default` when it is absent.
pub async fn get_or<T>(store: &dyn StateStore, key: &str, default: T) -> Result<T, StateError>
where
    T: DeserializeOwned,
{
    match store.get(key).await? {
        Some(value) => serde_json::from_value(value).map_err(|source| StateError::Decode {
            key: key.to_string(),
            source,
        }),
        None => Ok(default),
    }
}

/// Serialize `value` and store it under `key`.
pub async fn set_value<T>(store: &dyn StateStore, key: &str, value: &T) -> Result<(), StateError>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(value).map_err(StateError::Encode)?;
    store.set(key, value).await
}
