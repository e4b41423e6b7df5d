use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use aws_sdk_s3::{primitives::ByteStream, Client as S3Client};
use std::path::PathBuf;
use std::sync::Arc;

/// Content-addressed storage for binary audio artifacts. Keys are
/// slash-separated paths (`<entity_id>/audio/<filename>`); commits are
/// idempotent overwrites.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn commit(&self, key: &str, data: &[u8], mimetype: &str) -> AppResult<()>;
    async fn get(&self, key: &str) -> AppResult<Vec<u8>>;
}

/// Local filesystem blob store used in development.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn commit(&self, key: &str, data: &[u8], _mimetype: &str) -> AppResult<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("failed to create blob dir: {}", e)))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Internal(format!("failed to write blob {}: {}", key, e)))?;

        tracing::debug!(key = key, size = data.len(), "Blob committed to filesystem");
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Vec<u8>> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("blob {}", key)))
            }
            Err(e) => Err(AppError::Internal(format!(
                "failed to read blob {}: {}",
                key, e
            ))),
        }
    }
}

/// S3-backed blob store used in production.
pub struct S3BlobStore {
    client: Arc<S3Client>,
    bucket: String,
}

impl S3BlobStore {
    pub fn new(client: Arc<S3Client>, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn commit(&self, key: &str, data: &[u8], mimetype: &str) -> AppResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(mimetype)
            .body(ByteStream::from(data.to_vec()))
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("S3 put_object failed: {}", e)))?;

        tracing::debug!(
            bucket = %self.bucket,
            key = key,
            size = data.len(),
            "Blob committed to S3"
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Vec<u8>> {
        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("S3 get_object failed: {}", e)))?;

        let data = object
            .body
            .collect()
            .await
            .map_err(|e| AppError::ExternalService(format!("failed to read S3 body: {}", e)))?;

        Ok(data.into_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fs_blob_store_commit_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        store
            .commit("exp1/audio/content.mp3", b"audio-bytes", "audio/mpeg")
            .await
            .unwrap();

        let data = store.get("exp1/audio/content.mp3").await.unwrap();
        assert_eq!(data, b"audio-bytes");
    }

    #[tokio::test]
    async fn test_fs_blob_store_commit_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        store.commit("k/audio/a.mp3", b"old", "audio/mpeg").await.unwrap();
        store.commit("k/audio/a.mp3", b"new", "audio/mpeg").await.unwrap();

        assert_eq!(store.get("k/audio/a.mp3").await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_fs_blob_store_missing_key_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        let err = store.get("missing/audio/x.mp3").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
