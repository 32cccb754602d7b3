//! Best-effort removal and existence checks.

use std::io;
use std::path::Path;

/// Remove a file or directory tree if it exists.
///
/// Returns `Ok(false)` when there was nothing to remove.
pub async fn remove_path_if_exists(path: &Path) -> io::Result<bool> {
    let metadata = match tokio::fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };

    let result = if metadata.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };

    match result {
        Ok(()) => Ok(true),
        // Raced with another remover.
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// `true` if `path` exists; I/O errors count as absent.
pub async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_remove_missing_path_is_noop() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        let missing = tmp.path().join("nope");

        let removed = remove_path_if_exists(&missing)
            .await
            .expect("remove should succeed");

        assert!(!removed);
    }

    #[tokio::test]
    async fn test_remove_directory_tree() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        let dir = tmp.path().join("1.0").join("nested");
        std::fs::create_dir_all(&dir).expect("create_dir_all should succeed");
        std::fs::write(dir.join("file"), b"x").expect("write should succeed");

        let removed = remove_path_if_exists(&tmp.path().join("1.0"))
            .await
            .expect("remove should succeed");

        assert!(removed);
        assert!(!tmp.path().join("1.0").exists());
    }

    #[tokio::test]
    async fn test_remove_single_file() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        let file = tmp.path().join("dotnet");
        std::fs::write(&file, b"x").expect("write should succeed");

        assert!(remove_path_if_exists(&file).await.expect("remove should succeed"));
        assert!(!path_exists(&file).await);
    }
}
