use chrono::{DateTime, Utc};
use common::FileStatus;
use serde::Serialize;

use crate::entity::uploaded_file;

/// An uploaded file record.
#[derive(Serialize, utoipa::ToSchema)]
pub struct FileResponse {
    #[schema(example = 1)]
    pub id: i32,
    /// Name of the file as uploaded.
    #[schema(example = "floor-plan.dxf")]
    pub original_name: String,
    /// Storage handle of the temporary upload.
    #[schema(example = "0193a4f2-7c1e-7d3a-9b2e-5f6a7b8c9d0e.dxf")]
    pub stored_name: String,
    pub status: FileStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Returned when an upload has been accepted for background ingestion.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    #[schema(example = "File upload accepted, processing started.")]
    pub message: String,
    pub file: FileResponse,
}

/// Current ingestion status of a file.
#[derive(Serialize, utoipa::ToSchema)]
pub struct FileStatusResponse {
    #[schema(example = 1)]
    pub id: i32,
    pub status: FileStatus,
    #[schema(example = "floor-plan.dxf")]
    pub original_name: String,
}

impl From<uploaded_file::Model> for FileResponse {
    fn from(m: uploaded_file::Model) -> Self {
        Self {
            id: m.id,
            original_name: m.original_name,
            stored_name: m.stored_name,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<uploaded_file::Model> for FileStatusResponse {
    fn from(m: uploaded_file::Model) -> Self {
        Self {
            id: m.id,
            status: m.status,
            original_name: m.original_name,
        }
    }
}
