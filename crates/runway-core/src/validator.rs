//! Confirming that an install produced a usable executable.

use std::path::Path;

use async_trait::async_trait;

use crate::error::ValidationError;

#[async_trait]
pub trait InstallValidator: Send + Sync {
    async fn validate(&self, version: &str, executable_path: &Path)
    -> Result<(), ValidationError>;
}

/// Checks the filesystem only: the executable must be a non-empty regular
/// file.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsInstallValidator;

#[async_trait]
impl InstallValidator for FsInstallValidator {
    async fn validate(
        &self,
        version: &str,
        executable_path: &Path,
    ) -> Result<(), ValidationError> {
        let metadata = match tokio::fs::metadata(executable_path).await {
            Ok(metadata) => metadata,
            Err(_) => {
                return Err(ValidationError::MissingExecutable {
                    version: version.to_string(),
                    path: executable_path.to_path_buf(),
                });
            }
        };
        if !metadata.is_file() {
            return Err(ValidationError::NotAFile {
                version: version.to_string(),
                path: executable_path.to_path_buf(),
            });
        }

        if metadata.len() == 0 {
            return Err(ValidationError::EmptyExecutable {
                version: version.to_string(),
                path: executable_path.to_path_buf(),
            });
        }
        Ok(())
    }
}
