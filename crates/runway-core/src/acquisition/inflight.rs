//! In-memory map of version -> shared pending acquisition.
//!
//! All operations are synchronous and hold the lock only for the map access,
//! so a lookup and the registration that follows a miss cannot be separated
//! by a suspension point.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use futures_util::future::{BoxFuture, Shared};

use crate::error::AcquisitionError;

/// A memoized acquisition that any number of callers can await.
pub type SharedAcquisition = Shared<BoxFuture<'static, Result<PathBuf, AcquisitionError>>>;

struct InflightEntry {
    id: u64,
    future: SharedAcquisition,
}

/// Result of [`InflightCache::get_or_register`].
pub enum Registration {
    /// Another caller already started this version.
    Joined(SharedAcquisition),
    /// The caller's future was registered under the returned id.
    Started { id: u64, future: SharedAcquisition },
}

impl Registration {
    pub fn into_future(self) -> SharedAcquisition {
        match self {
            Registration::Joined(future) | Registration::Started { future, .. } => future,
        }
    }
}

/// Each registration gets a fresh id. Removal by id keeps a stale
/// acquisition from evicting a newer one registered under the same version.
#[derive(Default)]
pub struct InflightCache {
    entries: Mutex<HashMap<String, InflightEntry>>,
    next_id: AtomicU64,
}

impl InflightCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, version: &str) -> Option<SharedAcquisition> {
        self.lock().get(version).map(|entry| entry.future.clone())
    }

    pub fn contains(&self, version: &str) -> bool {
        self.lock().contains_key(version)
    }

    /// Return the existing acquisition for `version`, or build one with
    /// `start` and register it, all under a single lock.
    ///
    /// `start` receives the id the new entry will carry and runs while the
    /// lock is held, so it must not block.
    pub fn get_or_register<F>(&self, version: &str, start: F) -> Registration
    where
        F: FnOnce(u64) -> SharedAcquisition,
    {
        let mut entries = self.lock();
        if let Some(entry) = entries.get(version) {
            return Registration::Joined(entry.future.clone());
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let future = start(id);
        entries.insert(
            version.to_string(),
            InflightEntry {
                id,
                future: future.clone(),
            },
        );
        Registration::Started { id, future }
    }

    /// Remove the entry for `version` only if it is still the one registered
    /// under `id`.
    pub fn remove_entry(&self, version: &str, id: u64) -> bool {
        let mut entries = self.lock();
        match entries.get(version) {
            Some(entry) if entry.id == id => {
                entries.remove(version);
                true
            }
            _ => false,
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Drop every entry except the one for `keep`.
    pub fn clear_except(&self, keep: &str) {
        self.lock().retain(|version, _| version == keep);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, InflightEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;

    fn ready(path: &str) -> SharedAcquisition {
        let path = PathBuf::from(path);
        async move { Ok(path) }.boxed().shared()
    }

    #[tokio::test]
    async fn test_second_registration_joins_first() {
        let cache = InflightCache::new();

        let first = cache.get_or_register("1.0", |_| ready("/a"));
        assert!(matches!(first, Registration::Started { .. }));

        let mut started_again = false;
        let second = cache.get_or_register("1.0", |_| {
            started_again = true;
            ready("/b")
        });
        assert!(!started_again);
        assert!(matches!(second, Registration::Joined(_)));
        assert_eq!(second.into_future().await.unwrap(), PathBuf::from("/a"));
    }

    fn register(cache: &InflightCache, version: &str, path: &str) -> u64 {
        match cache.get_or_register(version, |_| ready(path)) {
            Registration::Started { id, .. } => id,
            Registration::Joined(_) => panic!("expected a new registration for {version}"),
        }
    }

    #[test]
    fn test_remove_entry_ignores_stale_id() {
        let cache = InflightCache::new();
        let old = register(&cache, "1.0", "/a");
        assert!(cache.remove_entry("1.0", old));

        let new = register(&cache, "1.0", "/b");
        assert_ne!(old, new);
        assert!(!cache.remove_entry("1.0", old));
        assert!(cache.contains("1.0"));
        assert!(cache.remove_entry("1.0", new));
        assert!(!cache.contains("1.0"));
    }

    #[test]
    fn test_clear_except_keeps_one_version() {
        let cache = InflightCache::new();
        for (version, path) in [("1.0", "/a"), ("2.0", "/b"), ("3.0", "/c")] {
            register(&cache, version, path);
        }

        cache.clear_except("2.0");
        assert!(cache.contains("2.0"));
        assert!(!cache.contains("1.0"));
        assert!(!cache.contains("3.0"));

        cache.clear();
        assert!(cache.lookup("2.0").is_none());
    }
}
