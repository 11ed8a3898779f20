use std::io;

use bytes::Bytes;
use futures::stream::BoxStream;

use crate::domain::StoragePath;

/// File storage seam. One instance fronts the transient upload directory,
/// another the retained result directory.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    async fn store(
        &self,
        path: &StoragePath,
        stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<u64, BlobStoreError>;

    async fn store_bytes(&self, path: &StoragePath, data: Bytes) -> Result<(), BlobStoreError>;

    async fn fetch(&self, path: &StoragePath) -> Result<Bytes, BlobStoreError>;

    async fn delete(&self, path: &StoragePath) -> Result<(), BlobStoreError>;

    async fn exists(&self, path: &StoragePath) -> Result<bool, BlobStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
