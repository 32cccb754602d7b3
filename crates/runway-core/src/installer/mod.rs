//! Installing a single version.
//!
//! The coordinator never installs anything itself. It hands an
//! [`InstallContext`] to an [`Installer`] and treats the outcome as opaque.

pub mod script;

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::InstallError;
use crate::types::AcquisitionKind;

pub use script::ScriptInstaller;

/// Everything an installer needs for one attempt. Built fresh per attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallContext {
    pub install_dir: PathBuf,
    pub version: String,
    pub executable_path: PathBuf,
    /// Upper bound for the whole install. Enforcing it is the installer's job.
    pub timeout: Duration,
    pub kind: AcquisitionKind,
}

#[async_trait]
pub trait Installer: Send + Sync {
    /// Install `ctx.version` into `ctx.install_dir`.
    ///
    /// Returns once the install has finished or failed; the artifact is
    /// validated separately.
    async fn install(&self, ctx: &InstallContext) -> Result<(), InstallError>;
}
