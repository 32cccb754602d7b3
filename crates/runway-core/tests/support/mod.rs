#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use runway_core::acquisition::{AcquisitionCoordinator, CoordinatorOptions};
use runway_core::error::InstallError;
use runway_core::events::RecordingEventSink;
use runway_core::fs::InstallLayout;
use runway_core::installer::{InstallContext, Installer};
use runway_core::state::{InstallingVersions, MemoryStateStore, StateStore};
use runway_core::validator::FsInstallValidator;

pub const EXE: &str = "dotnet";

/// Installer double that writes the executable into the install directory.
#[derive(Default)]
pub struct FakeInstaller {
    calls: AtomicUsize,
    failures_left: AtomicUsize,
    delay: Option<Duration>,
    skip_executable: bool,
    contexts: Mutex<Vec<InstallContext>>,
}

impl FakeInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the first `count` invocations with "Rejecting message".
    pub fn failing(count: usize) -> Self {
        let installer = Self::default();
        installer.failures_left.store(count, Ordering::SeqCst);
        installer
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Report success without writing the executable.
    pub fn without_executable(mut self) -> Self {
        self.skip_executable = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn contexts(&self) -> Vec<InstallContext> {
        self.contexts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Installer for FakeInstaller {
    async fn install(&self, ctx: &InstallContext) -> Result<(), InstallError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.contexts.lock().unwrap().push(ctx.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let should_fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(InstallError::new("Rejecting message").with_exit_code(1));
        }

        tokio::fs::create_dir_all(&ctx.install_dir)
            .await
            .map_err(|e| InstallError::new(e.to_string()))?;
        if !self.skip_executable {
            tokio::fs::write(&ctx.executable_path, b"#!/bin/sh\n")
                .await
                .map_err(|e| InstallError::new(e.to_string()))?;
        }
        Ok(())
    }
}

pub struct Harness {
    pub tmp: TempDir,
    pub root: PathBuf,
    pub store: Arc<dyn StateStore>,
    pub installer: Arc<FakeInstaller>,
    pub events: Arc<RecordingEventSink>,
    pub coordinator: AcquisitionCoordinator,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_installer(FakeInstaller::new())
    }

    pub fn with_installer(installer: FakeInstaller) -> Self {
        Self::build(installer, Arc::new(MemoryStateStore::new()), None)
    }

    pub fn with_store(installer: FakeInstaller, store: Arc<dyn StateStore>, tmp: TempDir) -> Self {
        Self::build(installer, store, Some(tmp))
    }

    fn build(installer: FakeInstaller, store: Arc<dyn StateStore>, tmp: Option<TempDir>) -> Self {
        let tmp = match tmp {
            Some(tmp) => tmp,
            None => TempDir::new().expect("tempdir should succeed"),
        };
        let root = tmp.path().join("runtimes");
        let installer = Arc::new(installer);
        let events = Arc::new(RecordingEventSink::new());
        let options = CoordinatorOptions::new(InstallLayout::with_executable_name(root.clone(), EXE))
            .with_install_timeout(Duration::from_secs(30));
        let coordinator = AcquisitionCoordinator::new(
            options,
            installer.clone(),
            Arc::new(FsInstallValidator),
            store.clone(),
            events.clone(),
        );
        Self {
            tmp,
            root,
            store,
            installer,
            events,
            coordinator,
        }
    }

    pub fn install_dir(&self, version: &str) -> PathBuf {
        self.root.join(version)
    }

    pub fn exe(&self, version: &str) -> PathBuf {
        self.install_dir(version).join(EXE)
    }

    pub fn installing(&self) -> InstallingVersions {
        InstallingVersions::new(self.store.clone())
    }

    pub async fn installing_versions(&self) -> Vec<String> {
        self.installing()
            .load()
            .await
            .expect("reading install state should succeed")
    }

    /// Leave `version` the way a crashed install would: marked as installing,
    /// with a stray file and no executable.
    pub async fn simulate_crash(&self, version: &str) {
        self.installing()
            .add(version)
            .await
            .expect("marking version should succeed");
        write_file(&self.install_dir(version).join("partial.bin"));
    }
}

pub fn write_file(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"data").unwrap();
}

pub fn dir_is_empty_or_missing(path: &Path) -> bool {
    match std::fs::read_dir(path) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => true,
    }
}
