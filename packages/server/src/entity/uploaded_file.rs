use common::FileStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An uploaded drawing file and its ingestion lifecycle.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "uploaded_file")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Name as supplied by the uploader.
    pub original_name: String,

    /// Handle of the temporary upload in the upload store.
    #[sea_orm(unique)]
    pub stored_name: String,

    #[sea_orm(indexed)]
    pub status: FileStatus,

    #[sea_orm(has_many)]
    pub blocks: HasMany<super::block::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
