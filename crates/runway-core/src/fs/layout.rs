//! On-disk layout of acquired versions.
//!
//! Every version lives in its own directory under the storage root:
//! `<storage_root>/<version>/<executable_name>`.

use std::path::{Component, Path, PathBuf};

/// Name of the runtime executable on the current platform.
pub fn default_executable_name() -> &'static str {
    if cfg!(windows) { "dotnet.exe" } else { "dotnet" }
}

/// `true` if `version` names exactly one directory directly under the storage
/// root: no separators, no `.`/`..`, no root or drive prefix.
pub fn is_single_segment(version: &str) -> bool {
    let mut components = Path::new(version).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(segment)), None) if segment == version
    )
}

/// Computes install directories and executable paths for versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    storage_root: PathBuf,
    executable_name: String,
}

impl InstallLayout {
    /// Layout rooted at `storage_root` using the platform executable name.
    pub fn new(storage_root: PathBuf) -> Self {
        Self::with_executable_name(storage_root, default_executable_name())
    }

    pub fn with_executable_name(storage_root: PathBuf, executable_name: impl Into<String>) -> Self {
        Self {
            storage_root,
            executable_name: executable_name.into(),
        }
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    pub fn executable_name(&self) -> &str {
        &self.executable_name
    }

    pub fn install_dir(&self, version: &str) -> PathBuf {
        self.storage_root.join(version)
    }

    pub fn executable_path(&self, version: &str) -> PathBuf {
        self.install_dir(version).join(&self.executable_name)
    }
}
