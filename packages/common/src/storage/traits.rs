use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;
use super::handle::UploadHandle;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Temporary storage for uploaded drawing files awaiting ingestion.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Store bytes under a fresh handle.
    async fn put(&self, data: &[u8], extension: &str) -> Result<UploadHandle, StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.put_stream(reader, extension).await
    }

    /// Store data from an async reader under a fresh handle.
    async fn put_stream(
        &self,
        reader: BoxReader,
        extension: &str,
    ) -> Result<UploadHandle, StorageError>;

    /// Read the full content of an upload.
    async fn read_all(&self, handle: &UploadHandle) -> Result<Vec<u8>, StorageError>;

    /// Check whether an upload exists.
    async fn exists(&self, handle: &UploadHandle) -> Result<bool, StorageError>;

    /// Delete an upload.
    ///
    /// Returns `true` if the upload was deleted, `false` if it did not exist.
    async fn remove(&self, handle: &UploadHandle) -> Result<bool, StorageError>;
}
