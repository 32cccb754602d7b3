//! The acquisition coordinator.
//!
//! One acquisition per version runs at a time. Its outcome is shared by every
//! caller asking for that version while it runs, and a success stays cached
//! for the lifetime of the coordinator. A failure is evicted so the next call
//! retries.
//!
//! A version is written to the durable "installing" list before its installer
//! runs and only removed after the result validated. Finding a version on that
//! list at the start of an acquisition therefore means an earlier attempt died
//! half way, and the leftovers are removed before installing again.

use std::path::PathBuf;
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures_util::FutureExt;
use tracing::{debug, warn};

use super::inflight::{InflightCache, Registration};
use crate::error::{AcquisitionError, ValidationError};
use crate::events::{AcquisitionEvent, EventSink};
use crate::fs::{InstallLayout, is_single_segment, remove_path_if_exists};
use crate::installer::{InstallContext, Installer};
use crate::state::{InstallingVersions, StateStore};
use crate::types::{AcquireResult, AcquisitionKind};
use crate::validator::InstallValidator;

pub const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Static settings for a coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    pub layout: InstallLayout,
    pub install_timeout: Duration,
}

impl CoordinatorOptions {
    pub fn new(layout: InstallLayout) -> Self {
        Self {
            layout,
            install_timeout: DEFAULT_INSTALL_TIMEOUT,
        }
    }

    pub fn with_install_timeout(mut self, timeout: Duration) -> Self {
        self.install_timeout = timeout;
        self
    }
}

/// Cheap to clone; clones share the same in-flight cache and collaborators.
#[derive(Clone)]
pub struct AcquisitionCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    options: CoordinatorOptions,
    installer: Arc<dyn Installer>,
    validator: Arc<dyn InstallValidator>,
    installing: InstallingVersions,
    events: Arc<dyn EventSink>,
    inflight: InflightCache,
}

impl AcquisitionCoordinator {
    pub fn new(
        options: CoordinatorOptions,
        installer: Arc<dyn Installer>,
        validator: Arc<dyn InstallValidator>,
        store: Arc<dyn StateStore>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                options,
                installer,
                validator,
                installing: InstallingVersions::new(store),
                events,
                inflight: InflightCache::new(),
            }),
        }
    }

    pub fn layout(&self) -> &InstallLayout {
        &self.inner.options.layout
    }

    pub fn install_timeout(&self) -> Duration {
        self.inner.options.install_timeout
    }

    /// Whether an acquisition for `version` is cached, running or finished.
    pub fn is_cached(&self, version: &str) -> bool {
        self.inner.inflight.contains(version)
    }

    /// Make `version` available locally and return its executable path.
    ///
    /// Concurrent calls for the same version share one installer invocation.
    /// The work is spawned onto the runtime and finishes even if every caller
    /// stops waiting. Requires a tokio runtime.
    ///
    /// `version` must be a single path segment; anything else is rejected
    /// before touching the cache, the state store or the filesystem.
    pub async fn acquire(
        &self,
        version: &str,
        kind: AcquisitionKind,
    ) -> Result<AcquireResult, AcquisitionError> {
        if !is_single_segment(version) {
            let err = AcquisitionError::Validation(ValidationError::Invalid {
                version: version.to_string(),
                message: "version must be a single path segment".to_string(),
            });
            self.inner.post(AcquisitionEvent::AcquisitionFailed {
                version: version.to_string(),
                message: err.to_string(),
            });
            return Err(err);
        }

        let registration = self.inner.inflight.get_or_register(version, |id| {
            let task = tokio::spawn(Inner::run(self.inner.clone(), id, version.to_string(), kind));
            let weak: Weak<Inner> = Arc::downgrade(&self.inner);
            let version = version.to_string();
            async move {
                match task.await {
                    Ok(result) => result,
                    Err(err) => {
                        if let Some(inner) = weak.upgrade() {
                            inner.inflight.remove_entry(&version, id);
                        }
                        Err(AcquisitionError::Aborted(format!(
                            "acquisition of version {version} did not complete: {err}"
                        )))
                    }
                }
            }
            .boxed()
            .shared()
        });

        if let Registration::Joined(_) = &registration {
            self.inner.post(AcquisitionEvent::AcquisitionInProgress {
                version: version.to_string(),
            });
        }

        registration.into_future().await.map(AcquireResult::new)
    }

    /// Report where `version` is installed, if it is.
    ///
    /// Waits for a running acquisition of that version. Never fails: any
    /// error is reported as "not installed".
    pub async fn query_status(&self, version: &str, kind: AcquisitionKind) -> Option<AcquireResult> {
        debug!(version, kind = %kind, "querying install status");

        let resolved = if !is_single_segment(version) {
            None
        } else {
            match self.inner.inflight.lookup(version) {
                Some(pending) => pending.await.ok(),
                None => self.inner.installed_path(version).await,
            }
        };

        match resolved {
            Some(path) => {
                self.inner.post(AcquisitionEvent::StatusResolved {
                    version: version.to_string(),
                });
                Some(AcquireResult::new(path))
            }
            None => {
                self.inner.post(AcquisitionEvent::StatusUndefined {
                    version: version.to_string(),
                });
                None
            }
        }
    }

    /// Forget every acquisition, delete the storage root and reset the
    /// installing list.
    ///
    /// Running acquisitions are not cancelled. Their results are simply no
    /// longer cached.
    pub async fn uninstall_all(&self) -> Result<(), AcquisitionError> {
        self.inner.uninstall_all(None).await
    }
}

impl Inner {
    fn post(&self, event: AcquisitionEvent) {
        self.events.post(&event);
    }

    async fn run(
        self: Arc<Self>,
        id: u64,
        version: String,
        kind: AcquisitionKind,
    ) -> Result<PathBuf, AcquisitionError> {
        let result = self.acquire_version(&version, kind).await;
        if let Err(err) = &result {
            self.inflight.remove_entry(&version, id);
            self.post(AcquisitionEvent::AcquisitionFailed {
                version: version.clone(),
                message: err.to_string(),
            });
        }
        result
    }

    async fn acquire_version(
        &self,
        version: &str,
        kind: AcquisitionKind,
    ) -> Result<PathBuf, AcquisitionError> {
        let partial = self.installing.contains(version).await?;
        if partial {
            self.post(AcquisitionEvent::PartialInstallation {
                version: version.to_string(),
                kind,
            });
            match kind {
                AcquisitionKind::Runtime => self.remove_partial(version).await?,
                AcquisitionKind::Sdk => self.uninstall_all(Some(version)).await?,
            }
        }

        let layout = &self.options.layout;
        let install_dir = layout.install_dir(version);
        let executable_path = layout.executable_path(version);

        if !partial && self.validator.validate(version, &executable_path).await.is_ok() {
            self.post(AcquisitionEvent::AlreadyInstalled {
                version: version.to_string(),
            });
            return Ok(executable_path);
        }

        self.installing.add(version).await?;
        self.post(AcquisitionEvent::AcquisitionStarted {
            version: version.to_string(),
            kind,
        });

        let ctx = InstallContext {
            install_dir,
            version: version.to_string(),
            executable_path: executable_path.clone(),
            timeout: self.options.install_timeout,
            kind,
        };
        self.installer.install(&ctx).await?;
        self.validator.validate(version, &executable_path).await?;

        self.installing.remove(version).await?;
        self.post(AcquisitionEvent::AcquisitionCompleted {
            version: version.to_string(),
            kind,
            path: executable_path.clone(),
        });
        Ok(executable_path)
    }

    /// Delete what a dead attempt left behind for one version.
    async fn remove_partial(&self, version: &str) -> Result<(), AcquisitionError> {
        let install_dir = self.options.layout.install_dir(version);
        self.post(AcquisitionEvent::Deletion {
            path: install_dir.clone(),
        });
        if let Err(err) = remove_path_if_exists(&install_dir).await {
            warn!(
                "Failed to remove partial install {}: {}",
                install_dir.display(),
                err
            );
        }
        self.installing.remove(version).await?;
        Ok(())
    }

    /// `keep` names an acquisition whose cache entry survives: the one
    /// performing this teardown as its own remediation.
    async fn uninstall_all(&self, keep: Option<&str>) -> Result<(), AcquisitionError> {
        self.post(AcquisitionEvent::UninstallAllStarted);

        match keep {
            Some(version) => self.inflight.clear_except(version),
            None => self.inflight.clear(),
        }

        let root = self.options.layout.storage_root();
        self.post(AcquisitionEvent::Deletion {
            path: root.to_path_buf(),
        });
        if let Err(err) = remove_path_if_exists(root).await {
            warn!("Failed to remove storage root {}: {}", root.display(), err);
        }

        self.installing.clear().await?;
        self.post(AcquisitionEvent::UninstallAllCompleted);
        Ok(())
    }

    /// Path of a completed install of `version`, checked against both the
    /// installing list and the filesystem.
    ///
    /// A version still on the installing list is never reported, even with an
    /// executable on disk: that executable may belong to an unfinished install.
    async fn installed_path(&self, version: &str) -> Option<PathBuf> {
        match self.installing.contains(version).await {
            Ok(false) => {}
            Ok(true) => return None,
            Err(err) => {
                warn!("Failed to read install state for {version}: {err}");
                return None;
            }
        }
        let executable_path = self.options.layout.executable_path(version);
        self.validator
            .validate(version, &executable_path)
            .await
            .ok()
            .map(|_| executable_path)
    }
}
