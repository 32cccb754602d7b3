//! Configuration schema for runway.toml

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::existing_path::ExistingPath;
use crate::fs::InstallLayout;
use crate::fs::layout::default_executable_name;
use crate::state::JsonFileStateStore;

pub const DEFAULT_INSTALL_TIMEOUT_SECS: u64 = 120;

/// Root configuration structure for runway.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunwayConfig {
    /// Directory holding one subdirectory per acquired version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_root: Option<PathBuf>,

    /// JSON file backing the durable install state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,

    #[serde(default = "default_install_timeout_secs")]
    pub install_timeout_secs: u64,

    /// Executable expected inside each install directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable_name: Option<String>,

    #[serde(default)]
    pub installer: InstallerConfig,

    /// Pinned installs per requesting tool
    #[serde(default, rename = "existing_path", skip_serializing_if = "Vec::is_empty")]
    pub existing_paths: Vec<ExistingPath>,

    /// Append lifecycle events to this JSON-lines file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_log: Option<PathBuf>,
}

/// Install script invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<PathBuf>,

    /// Passed before the generated arguments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

fn default_install_timeout_secs() -> u64 {
    DEFAULT_INSTALL_TIMEOUT_SECS
}

impl Default for RunwayConfig {
    fn default() -> Self {
        Self {
            storage_root: None,
            state_file: None,
            install_timeout_secs: DEFAULT_INSTALL_TIMEOUT_SECS,
            executable_name: None,
            installer: InstallerConfig::default(),
            existing_paths: Vec::new(),
            event_log: None,
        }
    }
}

impl RunwayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn storage_root(&self) -> anyhow::Result<PathBuf> {
        match &self.storage_root {
            Some(root) => Ok(root.clone()),
            None => Ok(dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?
                .join("runway")
                .join("runtimes")),
        }
    }

    pub fn state_file(&self) -> anyhow::Result<PathBuf> {
        match &self.state_file {
            Some(path) => Ok(path.clone()),
            None => JsonFileStateStore::default_path(),
        }
    }

    pub fn install_timeout(&self) -> Duration {
        Duration::from_secs(self.install_timeout_secs)
    }

    pub fn layout(&self) -> anyhow::Result<InstallLayout> {
        let name = self
            .executable_name
            .as_deref()
            .unwrap_or(default_executable_name());
        Ok(InstallLayout::with_executable_name(self.storage_root()?, name))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.install_timeout_secs == 0 {
            anyhow::bail!("install_timeout_secs must be greater than zero");
        }

        if let Some(name) = &self.executable_name {
            if name.is_empty() || name.contains(['/', '\\']) {
                anyhow::bail!("executable_name must be a plain file name, got '{}'", name);
            }
        }

        if let Some(command) = &self.installer.command {
            if command.as_os_str().is_empty() {
                anyhow::bail!("installer.command must not be empty");
            }
        }

        for (index, entry) in self.existing_paths.iter().enumerate() {
            validate_existing_path(entry)
                .with_context(|| format!("Invalid existing_path entry #{}", index + 1))?;
        }
        Ok(())
    }
}

fn validate_existing_path(entry: &ExistingPath) -> anyhow::Result<()> {
    if entry.requester.trim().is_empty() {
        anyhow::bail!("requester must not be empty");
    }
    if entry.path.as_os_str().is_empty() {
        anyhow::bail!("path must not be empty");
    }
    Ok(())
}
