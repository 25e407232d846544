use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A block reference (INSERT) extracted from an uploaded file.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "block")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub name: String,

    pub layer: Option<String>,

    /// Insertion point as `{x, y, z}`.
    #[sea_orm(column_type = "JsonBinary")]
    pub coordinates: serde_json::Value,

    #[sea_orm(indexed)]
    pub file_id: i32,
    #[sea_orm(belongs_to, from = "file_id", to = "id", on_delete = "Cascade")]
    pub file: HasOne<super::uploaded_file::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
