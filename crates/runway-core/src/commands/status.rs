//! Status command implementation.

use std::path::PathBuf;

use serde::Serialize;

use crate::acquisition::AcquisitionCoordinator;
use crate::context::AppContext;
use crate::types::AcquisitionKind;

#[derive(Debug, Clone)]
pub struct StatusOptions {
    pub version: String,
    pub kind: AcquisitionKind,
}

impl StatusOptions {
    pub fn new(version: impl Into<String>, kind: AcquisitionKind) -> Self {
        Self {
            version: version.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub version: String,
    pub kind: AcquisitionKind,
    pub installed: bool,
    pub path: Option<PathBuf>,
}

pub struct StatusCommand {
    coordinator: AcquisitionCoordinator,
}

impl StatusCommand {
    pub fn new(coordinator: AcquisitionCoordinator) -> Self {
        Self { coordinator }
    }

    pub fn from_context(ctx: &AppContext) -> Self {
        Self::new(ctx.coordinator().clone())
    }

    pub fn with_defaults() -> anyhow::Result<Self> {
        Ok(Self::from_context(&AppContext::load(None)?))
    }

    /// Never fails; an unknown or broken install reports as not installed.
    pub async fn execute(&self, options: &StatusOptions) -> StatusReport {
        let path = self
            .coordinator
            .query_status(&options.version, options.kind)
            .await
            .map(|result| result.path);
        StatusReport {
            version: options.version.clone(),
            kind: options.kind,
            installed: path.is_some(),
            path,
        }
    }
}
