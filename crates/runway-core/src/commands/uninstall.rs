//! Uninstall-all command implementation.

use std::path::PathBuf;

use serde::Serialize;

use crate::acquisition::AcquisitionCoordinator;
use crate::context::AppContext;
use crate::fs::path_exists;

#[derive(Debug, Clone, Serialize)]
pub struct UninstallReport {
    pub storage_root: PathBuf,
    /// Whether the storage root existed before the uninstall
    pub removed: bool,
}

pub struct UninstallAllCommand {
    coordinator: AcquisitionCoordinator,
}

impl UninstallAllCommand {
    pub fn new(coordinator: AcquisitionCoordinator) -> Self {
        Self { coordinator }
    }

    pub fn from_context(ctx: &AppContext) -> Self {
        Self::new(ctx.coordinator().clone())
    }

    pub fn with_defaults() -> anyhow::Result<Self> {
        Ok(Self::from_context(&AppContext::load(None)?))
    }

    pub async fn execute(&self) -> anyhow::Result<UninstallReport> {
        let storage_root = self.coordinator.layout().storage_root().to_path_buf();
        let existed = path_exists(&storage_root).await;

        self.coordinator.uninstall_all().await?;

        Ok(UninstallReport {
            removed: existed && !path_exists(&storage_root).await,
            storage_root,
        })
    }
}
