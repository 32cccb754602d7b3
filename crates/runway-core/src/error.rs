//! Error types for acquisition and its collaborators.
//!
//! Collaborator failures (`InstallError`, `ValidationError`, `StateError`)
//! are wrapped into `AcquisitionError` before they reach a caller. An
//! acquisition outcome is shared by every caller waiting on the same
//! version, so `AcquisitionError` is `Clone`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The installer failed: non-zero exit, timeout, or the process never started.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Installation failed: {message}{}", stderr_suffix(.stderr))]
pub struct InstallError {
    pub exit_code: Option<i32>,
    pub message: String,
    pub stderr: String,
}

impl InstallError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            exit_code: None,
            message: message.into(),
            stderr: String::new(),
        }
    }

    pub fn with_exit_code(mut self, exit_code: i32) -> Self {
        self.exit_code = Some(exit_code);
        self
    }

    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(" (stderr: {trimmed})")
    }
}

/// The installer reported success but the artifact is missing or broken.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Validation for version {version} failed: executable not found at {}", path.display())]
    MissingExecutable { version: String, path: PathBuf },

    #[error("Validation for version {version} failed: {} is not a file", path.display())]
    NotAFile { version: String, path: PathBuf },

    #[error("Validation for version {version} failed: executable {} is empty", path.display())]
    EmptyExecutable { version: String, path: PathBuf },

    #[error("Validation for version {version} failed: {message}")]
    Invalid { version: String, message: String },
}

/// Reading or writing the durable state store failed.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to access state file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode state: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("State key '{key}' holds an unexpected value: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// What the caller of `acquire` sees when an acquisition does not produce a path.
#[derive(Error, Debug, Clone)]
pub enum AcquisitionError {
    #[error("Acquisition Failed: {0}")]
    Install(#[from] InstallError),

    #[error("Acquisition Failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Acquisition Failed: {0}")]
    State(String),

    #[error("Acquisition Failed: {0}")]
    Aborted(String),
}

impl From<StateError> for AcquisitionError {
    fn from(err: StateError) -> Self {
        AcquisitionError::State(err.to_string())
    }
}
