//! File system capability used by the pipeline.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{BuildError, Result};

/// The handful of file operations the pipeline performs.
#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn read_json(&self, path: &Path) -> Result<Value>;

    /// Write pretty-printed JSON, creating parent directories.
    async fn write_json(&self, path: &Path, value: &Value) -> Result<()>;

    /// Remove a directory tree. Missing directories are not an error.
    async fn remove_dir_all(&self, path: &Path) -> Result<()>;

    async fn create_dir_all(&self, path: &Path) -> Result<()>;
}

/// [`FileSystem`] backed by `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFs;

#[async_trait]
impl FileSystem for NativeFs {
    async fn read_json(&self, path: &Path) -> Result<Value> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| BuildError::fs(path, e))?;
        serde_json::from_str(&content).map_err(|e| BuildError::fs(path, format!("Invalid JSON: {e}")))
    }

    async fn write_json(&self, path: &Path, value: &Value) -> Result<()> {
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent).await?;
        }
        let mut content =
            serde_json::to_string_pretty(value).map_err(|e| BuildError::fs(path, e))?;
        content.push('\n');
        tokio::fs::write(path, content)
            .await
            .map_err(|e| BuildError::fs(path, e))
    }

    async fn remove_dir_all(&self, path: &Path) -> Result<()> {
        match tokio::fs::remove_dir_all(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BuildError::fs(path, e)),
        }
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| BuildError::fs(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn write_then_read_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/dir/stats.json");

        NativeFs.write_json(&path, &json!({ "a": 1 })).await.unwrap();
        assert_eq!(NativeFs.read_json(&path).await.unwrap(), json!({ "a": 1 }));
    }

    #[tokio::test]
    async fn removing_a_missing_dir_succeeds() {
        let dir = TempDir::new().unwrap();
        NativeFs
            .remove_dir_all(&dir.path().join("does-not-exist"))
            .await
            .unwrap();
    }
}
