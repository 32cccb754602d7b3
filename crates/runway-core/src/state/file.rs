//! JSON file persistence for the state store.
//!
//! The whole map lives in a single JSON object. Writes go to a temp file in
//! the same directory and are renamed over the target so a crash never leaves
//! a truncated state file behind.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::StateError;

use super::StateStore;

#[derive(Debug)]
pub struct JsonFileStateStore {
    path: PathBuf,
    // Serializes the merge inside `set`. Callers updating a value they read
    // earlier need their own lock around get + set.
    write_lock: Mutex<()>,
}

impl JsonFileStateStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Default state file location.
    ///
    /// - Unix: `$XDG_STATE_HOME/runway/state.json` or `~/.local/state/runway/state.json`
    /// - Windows: `%LOCALAPPDATA%\runway\state.json`
    pub fn default_path() -> anyhow::Result<PathBuf> {
        let base = if cfg!(unix) {
            dirs::state_dir()
                .or_else(dirs::data_local_dir)
                .ok_or_else(|| anyhow::anyhow!("Cannot determine state directory"))?
        } else {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Cannot determine local app data directory"))?
        };
        Ok(base.join("runway").join("state.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Map<String, Value>, StateError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(StateError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                // Unreadable state is treated as empty; the next write replaces it.
                warn!("Ignoring corrupt state file {}", self.path.display());
                Ok(Map::new())
            }
        }
    }

    async fn save(&self, map: &Map<String, Value>) -> Result<(), StateError> {
        let io_err = |source: io::Error| StateError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let bytes = serde_json::to_vec_pretty(map).map_err(StateError::Encode)?;
        let tmp_path = self
            .path
            .with_extension(format!("json.tmp.{}", std::process::id()));

        tokio::fs::write(&tmp_path, bytes).await.map_err(io_err)?;
        tokio::fs::rename(&tmp_path, &self.path).await.map_err(io_err)?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for JsonFileStateStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StateError> {
        let map = self.load().await?;
        Ok(map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StateError> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load().await?;
        map.insert(key.to_string(), value);
        self.save(&map).await
    }
}
