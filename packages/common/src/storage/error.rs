use thiserror::Error;

/// Errors that can occur during upload storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested upload was not found.
    #[error("upload not found: {0}")]
    NotFound(String),
    /// An I/O error occurred.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The handle does not name a flat file inside the upload directory.
    #[error("invalid upload handle: {0:?}")]
    InvalidHandle(String),
    /// The upload exceeds the configured size limit.
    #[error("upload exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
}
