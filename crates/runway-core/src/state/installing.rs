//! The persisted list of versions whose install has started but not been
//! confirmed.
//!
//! A version on this list with no valid executable on disk is a partial
//! install. Every mutation re-reads the list first: another process may have
//! changed it since the caller last looked. Within a process, mutations made
//! through clones of one `InstallingVersions` are serialized, so concurrent
//! acquisitions of different versions cannot overwrite each other's entries.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::StateError;

use super::{StateStore, get_or, set_value};

/// Fixed key the list is stored under.
pub const INSTALLING_VERSIONS_KEY: &str = "installing";

#[derive(Clone)]
pub struct InstallingVersions {
    store: Arc<dyn StateStore>,
    // Held across each load-modify-save; shared by clones.
    update_lock: Arc<Mutex<()>>,
}

impl InstallingVersions {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self {
            store,
            update_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn load(&self) -> Result<Vec<String>, StateError> {
        get_or(self.store.as_ref(), INSTALLING_VERSIONS_KEY, Vec::new()).await
    }

    pub async fn contains(&self, version: &str) -> Result<bool, StateError> {
        Ok(self.load().await?.iter().any(|v| v == version))
    }

    /// Append `version` unless it is already listed.
    pub async fn add(&self, version: &str) -> Result<(), StateError> {
        let _guard = self.update_lock.lock().await;
        let mut versions = self.load().await?;
        if !versions.iter().any(|v| v == version) {
            versions.push(version.to_string());
        }
        self.save(&versions).await
    }

    /// Drop `version` from the list. Returns `true` if it was listed.
    ///
    /// Nothing is written when the version was not present.
    pub async fn remove(&self, version: &str) -> Result<bool, StateError> {
        let _guard = self.update_lock.lock().await;
        let mut versions = self.load().await?;
        let before = versions.len();
        versions.retain(|v| v != version);
        if versions.len() == before {
            return Ok(false);
        }
        self.save(&versions).await?;
        Ok(true)
    }

    pub async fn clear(&self) -> Result<(), StateError> {
        let _guard = self.update_lock.lock().await;
        self.save(&[]).await
    }

    async fn save(&self, versions: &[String]) -> Result<(), StateError> {
        set_value(self.store.as_ref(), INSTALLING_VERSIONS_KEY, versions).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryStateStore;

    fn installing() -> (Arc<MemoryStateStore>, InstallingVersions) {
        let store = Arc::new(MemoryStateStore::new());
        let versions = InstallingVersions::new(store.clone());
        (store, versions)
    }

    #[tokio::test]
    async fn test_add_preserves_order_and_skips_duplicates() {
        let (store, versions) = installing();

        versions.add("2.0").await.unwrap();
        versions.add("1.0").await.unwrap();
        versions.add("2.0").await.unwrap();

        assert_eq!(
            store.snapshot(INSTALLING_VERSIONS_KEY),
            Some(serde_json::json!(["2.0", "1.0"]))
        );
    }

    #[tokio::test]
    async fn test_remove_rereads_latest_list() {
        let (store, versions) = installing();
        versions.add("1.0").await.unwrap();

        // Another writer appends behind our back.
        store
            .set(INSTALLING_VERSIONS_KEY, serde_json::json!(["1.0", "1.1"]))
            .await
            .unwrap();

        assert!(versions.remove("1.0").await.unwrap());
        assert_eq!(versions.load().await.unwrap(), vec!["1.1".to_string()]);
    }

    #[tokio::test]
    async fn test_remove_missing_version_does_not_write() {
        let (store, versions) = installing();

        assert!(!versions.remove("1.0").await.unwrap());
        assert!(store.snapshot(INSTALLING_VERSIONS_KEY).is_none());
    }

    #[tokio::test]
    async fn test_clear_writes_empty_list() {
        let (store, versions) = installing();
        versions.add("1.0").await.unwrap();

        versions.clear().await.unwrap();

        assert_eq!(
            store.snapshot(INSTALLING_VERSIONS_KEY),
            Some(serde_json::json!([]))
        );
        assert!(!versions.contains("1.0").await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_through_clones_keep_every_version() {
        let (_store, versions) = installing();

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let versions = versions.clone();
                tokio::spawn(async move { versions.add(&format!("1.{i}")).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(versions.load().await.unwrap().len(), 16);
    }
}
