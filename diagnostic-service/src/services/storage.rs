//! Local persistence for uploaded images.
//!
//! Files land under a flat directory as
//! `<UTC timestamp>-<uuid>-<sanitized original name>`; the uuid segment
//! keeps two uploads in the same second from overwriting each other.
//! Retention is expiry-based: anything older than the configured window is
//! pruned on the next save.

use async_trait::async_trait;
use chrono::Utc;
use service_core::error::AppError;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use uuid::Uuid;

/// Handle to a persisted upload.
#[derive(Debug, Clone)]
pub struct StoredImage {
    /// File name under the store, as used in `/static/<file_name>`.
    pub file_name: String,
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn save(&self, original_name: &str, data: Vec<u8>) -> Result<StoredImage, AppError>;
    async fn load(&self, file_name: &str) -> Result<Vec<u8>, AppError>;
    /// Remove expired files, returning how many were deleted.
    async fn prune_expired(&self) -> Result<usize, AppError>;
}

pub struct LocalImageStore {
    base_path: PathBuf,
    retention: Duration,
}

impl LocalImageStore {
    pub async fn new(
        base_path: impl Into<PathBuf>,
        retention_hours: i64,
    ) -> Result<Self, AppError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).await.map_err(io_err)?;
        }
        Ok(Self {
            base_path,
            retention: Duration::from_secs(retention_hours.max(0) as u64 * 3600),
        })
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, original_name: &str, data: Vec<u8>) -> Result<StoredImage, AppError> {
        // Sweep before adding more; failures here must not fail the upload.
        if let Err(e) = self.prune_expired().await {
            tracing::warn!("Failed to prune expired uploads: {}", e);
        }

        let file_name = format!(
            "{}-{}-{}",
            Utc::now().format("%Y%m%d%H%M%S"),
            Uuid::new_v4().simple(),
            sanitize_file_name(original_name)
        );
        let path = self.base_path.join(&file_name);
        fs::write(&path, data).await.map_err(io_err)?;

        tracing::info!(file_name = %file_name, "Stored uploaded image");
        Ok(StoredImage { file_name })
    }

    async fn load(&self, file_name: &str) -> Result<Vec<u8>, AppError> {
        if file_name.contains('/') || file_name.contains('\\') || file_name.contains("..") {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Invalid file name: {}",
                file_name
            )));
        }

        let path = self.base_path.join(file_name);
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound(
                anyhow::anyhow!("No such upload: {}", file_name),
            )),
            Err(e) => Err(io_err(e)),
        }
    }

    async fn prune_expired(&self) -> Result<usize, AppError> {
        let mut removed = 0;
        let mut entries = fs::read_dir(&self.base_path).await.map_err(io_err)?;

        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let metadata = entry.metadata().await.map_err(io_err)?;
            if !metadata.is_file() {
                continue;
            }
            let expired = metadata
                .modified()
                .ok()
                .and_then(|t| t.elapsed().ok())
                .map(|age| age > self.retention)
                .unwrap_or(false);
            if expired {
                fs::remove_file(entry.path()).await.map_err(io_err)?;
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::info!(removed, "Pruned expired uploads");
        }
        Ok(removed)
    }
}

fn io_err(err: std::io::Error) -> AppError {
    AppError::StorageError(anyhow::Error::new(err))
}

/// Keep the original name readable while dropping anything that could walk
/// out of the store directory.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalImageStore::new(dir.path(), 24).await.expect("store");

        let stored = store
            .save("cluster.jpg", b"jpeg bytes".to_vec())
            .await
            .expect("save");
        assert!(stored.file_name.ends_with("cluster.jpg"));

        let data = store.load(&stored.file_name).await.expect("load");
        assert_eq!(data, b"jpeg bytes");
    }

    #[tokio::test]
    async fn same_name_uploads_do_not_collide() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalImageStore::new(dir.path(), 24).await.expect("store");

        let first = store.save("dash.png", vec![1]).await.expect("save");
        let second = store.save("dash.png", vec![2]).await.expect("save");
        assert_ne!(first.file_name, second.file_name);

        assert_eq!(store.load(&first.file_name).await.expect("load"), vec![1]);
        assert_eq!(store.load(&second.file_name).await.expect("load"), vec![2]);
    }

    #[tokio::test]
    async fn hostile_names_are_sanitized() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalImageStore::new(dir.path(), 24).await.expect("store");

        let stored = store
            .save("../../etc/passwd", vec![0])
            .await
            .expect("save");
        assert!(!stored.file_name.contains('/'));

        let on_disk = dir.path().join(&stored.file_name);
        assert!(on_disk.exists());
    }

    #[tokio::test]
    async fn load_rejects_path_traversal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalImageStore::new(dir.path(), 24).await.expect("store");

        let err = store.load("../secret").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalImageStore::new(dir.path(), 24).await.expect("store");

        let err = store.load("nope.jpg").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn zero_retention_prunes_everything() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalImageStore::new(dir.path(), 0).await.expect("store");

        let stored = store.save("old.jpg", vec![0]).await.expect("save");
        tokio::time::sleep(Duration::from_millis(50)).await;

        let removed = store.prune_expired().await.expect("prune");
        assert!(removed >= 1);
        assert!(matches!(
            store.load(&stored.file_name).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
