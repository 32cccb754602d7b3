//! Acquire command implementation.
//!
//! Validates the requested version, honours pinned installs for the
//! requesting tool, and otherwise delegates to the coordinator.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::acquisition::AcquisitionCoordinator;
use crate::context::AppContext;
use crate::events::EventSink;
use crate::existing_path::{ExistingPath, ExistingPathResolver};
use crate::fs::is_single_segment;
use crate::types::AcquisitionKind;

/// Options for the acquire command
#[derive(Debug, Clone)]
pub struct AcquireOptions {
    pub version: String,
    pub kind: AcquisitionKind,
    /// Identifier of the tool asking, matched against pinned installs
    pub requester: Option<String>,
}

impl AcquireOptions {
    pub fn runtime(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            kind: AcquisitionKind::Runtime,
            requester: None,
        }
    }

    pub fn sdk(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            kind: AcquisitionKind::Sdk,
            requester: None,
        }
    }

    pub fn with_requester(mut self, requester: impl Into<String>) -> Self {
        self.requester = Some(requester.into());
        self
    }
}

/// Where the returned path came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathSource {
    /// A pinned install from configuration
    Existing,
    /// Installed (or already present) under the storage root
    Acquired,
}

/// Result of an acquire
#[derive(Debug, Clone, Serialize)]
pub struct AcquireReport {
    pub version: String,
    pub kind: AcquisitionKind,
    pub path: PathBuf,
    pub source: PathSource,
}

pub struct AcquireCommand {
    coordinator: AcquisitionCoordinator,
    events: Arc<dyn EventSink>,
    existing_paths: Vec<ExistingPath>,
}

impl AcquireCommand {
    pub fn new(
        coordinator: AcquisitionCoordinator,
        events: Arc<dyn EventSink>,
        existing_paths: Vec<ExistingPath>,
    ) -> Self {
        Self {
            coordinator,
            events,
            existing_paths,
        }
    }

    pub fn from_context(ctx: &AppContext) -> Self {
        Self::new(
            ctx.coordinator().clone(),
            ctx.events(),
            ctx.existing_paths().to_vec(),
        )
    }

    /// Create with configuration from the default location
    pub fn with_defaults() -> anyhow::Result<Self> {
        Ok(Self::from_context(&AppContext::load(None)?))
    }

    pub async fn execute(&self, options: &AcquireOptions) -> anyhow::Result<AcquireReport> {
        validate_version(&options.version)?;

        let resolver = ExistingPathResolver::new(self.events.as_ref());
        if let Some(path) = resolver.resolve(&self.existing_paths, options.requester.as_deref()) {
            debug!(
                version = %options.version,
                path = %path.display(),
                "using pinned install"
            );
            return Ok(AcquireReport {
                version: options.version.clone(),
                kind: options.kind,
                path,
                source: PathSource::Existing,
            });
        }

        let result = self
            .coordinator
            .acquire(&options.version, options.kind)
            .await?;
        Ok(AcquireReport {
            version: options.version.clone(),
            kind: options.kind,
            path: result.path,
            source: PathSource::Acquired,
        })
    }
}

/// Only concrete versions that name a single directory can be acquired.
fn validate_version(version: &str) -> anyhow::Result<()> {
    let trimmed = version.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("latest")
        || !is_single_segment(version)
    {
        anyhow::bail!(
            "Cannot acquire version \"{}\". Please provide a valid version.",
            version
        );
    }
    Ok(())
}
