use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::StorageError;

/// Storage-unique name of a temporary upload.
///
/// Handles are flat file names (no directory components) so they can be
/// persisted alongside the file record and resolved again later.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadHandle(String);

impl UploadHandle {
    /// Generate a fresh handle carrying the given extension (without the dot).
    pub fn generate(extension: &str) -> Self {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        if ext.is_empty() {
            Self(Uuid::now_v7().to_string())
        } else {
            Self(format!("{}.{ext}", Uuid::now_v7()))
        }
    }

    /// Parse a previously issued handle, rejecting anything that could
    /// escape the upload directory.
    pub fn parse(s: &str) -> Result<Self, StorageError> {
        if s.is_empty()
            || s.starts_with('.')
            || s.contains(['/', '\\', '\0'])
            || s.chars().any(|c| c.is_ascii_control())
        {
            return Err(StorageError::InvalidHandle(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UploadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for UploadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UploadHandle({})", self.0)
    }
}
