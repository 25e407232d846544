use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::BlockWithFile;

use super::shared::Pagination;

/// Query parameters for listing blocks.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct BlockListQuery {
    /// Only blocks extracted from this file.
    #[param(example = 1)]
    pub file_id: Option<i32>,
    /// Page number (1-based).
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Items per page (1-100, default 20).
    #[param(example = 20)]
    pub per_page: Option<u64>,
}

/// Query parameters for searching blocks by name.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct BlockSearchQuery {
    /// Case-insensitive substring of the block name. Required.
    #[param(example = "door")]
    pub q: Option<String>,
    /// Only blocks extracted from this file.
    #[param(example = 1)]
    pub file_id: Option<i32>,
}

/// The file a block was extracted from.
#[derive(Serialize, utoipa::ToSchema)]
pub struct BlockFileSummary {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "floor-plan.dxf")]
    pub original_name: String,
}

/// An extracted block reference.
#[derive(Serialize, utoipa::ToSchema)]
pub struct BlockResponse {
    #[schema(example = 1)]
    pub id: i32,
    /// Name of the referenced block definition.
    #[schema(example = "MY_BLOCK")]
    pub name: String,
    #[schema(example = "LAYER_A")]
    pub layer: Option<String>,
    /// Insertion point.
    #[schema(value_type = Object, example = json!({"x": 100.5, "y": 200.75, "z": 10.0}))]
    pub coordinates: serde_json::Value,
    #[schema(example = 1)]
    pub file_id: i32,
    pub created_at: DateTime<Utc>,
    pub file: Option<BlockFileSummary>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct BlockListResponse {
    pub data: Vec<BlockResponse>,
    pub pagination: Pagination,
}

impl From<BlockWithFile> for BlockResponse {
    fn from((block, file): BlockWithFile) -> Self {
        Self {
            id: block.id,
            name: block.name,
            layer: block.layer,
            coordinates: block.coordinates,
            file_id: block.file_id,
            created_at: block.created_at,
            file: file.map(|f| BlockFileSummary {
                id: f.id,
                original_name: f.original_name,
            }),
        }
    }
}
