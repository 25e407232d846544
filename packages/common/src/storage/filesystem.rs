use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::error::StorageError;
use super::handle::UploadHandle;
use super::traits::{BoxReader, UploadStore};

/// Filesystem-backed temporary upload store.
///
/// Uploads live flat in `{base_path}/{handle}`. Writes go through
/// `{base_path}/.tmp` and are renamed into place once complete, so a
/// handle never resolves to a partially written file.
pub struct FilesystemUploadStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemUploadStore {
    /// Create a new filesystem upload store.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    /// Compute the filesystem path for a given handle.
    pub fn upload_path(&self, handle: &UploadHandle) -> PathBuf {
        self.base_path.join(handle.as_str())
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl UploadStore for FilesystemUploadStore {
    async fn put_stream(
        &self,
        mut reader: BoxReader,
        extension: &str,
    ) -> Result<UploadHandle, StorageError> {
        let temp_path = self.temp_path();
        let mut total_bytes: u64 = 0;

        let mut buf = vec![0u8; 64 * 1024]; // 64KB read buffer
        let mut temp_file = fs::File::create(&temp_path).await?;

        loop {
            let n = match reader.read(&mut buf).await {
                Ok(n) => n,
                Err(e) => {
                    drop(temp_file);
                    let _ = fs::remove_file(&temp_path).await;
                    return Err(e.into());
                }
            };
            if n == 0 {
                break;
            }

            total_bytes += n as u64;
            if total_bytes > self.max_size {
                drop(temp_file);
                let _ = fs::remove_file(&temp_path).await;
                return Err(StorageError::SizeLimitExceeded {
                    actual: total_bytes,
                    limit: self.max_size,
                });
            }

            temp_file.write_all(&buf[..n]).await?;
        }

        temp_file.flush().await?;
        drop(temp_file);

        let handle = UploadHandle::generate(extension);
        if let Err(e) = fs::rename(&temp_path, self.upload_path(&handle)).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(handle)
    }

    async fn read_all(&self, handle: &UploadHandle) -> Result<Vec<u8>, StorageError> {
        match fs::read(self.upload_path(handle)).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(handle.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, handle: &UploadHandle) -> Result<bool, StorageError> {
        Ok(fs::try_exists(self.upload_path(handle)).await?)
    }

    async fn remove(&self, handle: &UploadHandle) -> Result<bool, StorageError> {
        match fs::remove_file(self.upload_path(handle)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
