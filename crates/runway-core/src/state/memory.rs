use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StateError;

use super::StateStore;

/// In-process store. Loses everything on drop; used by tests and embedders
/// that persist state themselves.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a key, e.g. to simulate state left behind by a crashed run.
    pub fn with_value(self, key: impl Into<String>, value: Value) -> Self {
        self.lock().insert(key.into(), value);
        self
    }

    /// Current value of `key` without going through the async interface.
    pub fn snapshot(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        // A poisoned map is still a valid map.
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StateError> {
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StateError> {
        self.lock().insert(key.to_string(), value);
        Ok(())
    }
}
