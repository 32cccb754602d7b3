//! Shared core types used across the coordinator and its collaborators.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What is being acquired for a version.
///
/// Each (version, kind) pair maps to its own install; the kind also decides
/// how a partial install of that version is remediated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcquisitionKind {
    /// Runtime only.
    Runtime,
    /// Full SDK.
    Sdk,
}

impl AcquisitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcquisitionKind::Runtime => "runtime",
            AcquisitionKind::Sdk => "sdk",
        }
    }
}

impl fmt::Display for AcquisitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful acquisition: where the executable lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquireResult {
    pub path: PathBuf,
}

impl AcquireResult {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display_matches_serde_name() {
        assert_eq!(AcquisitionKind::Runtime.to_string(), "runtime");
        assert_eq!(
            serde_json::to_string(&AcquisitionKind::Sdk).unwrap(),
            "\"sdk\""
        );
    }
}
