use chrono::{DateTime, Utc};
use common::FileStatus;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entity::uploaded_file;

/// Persistent record of uploaded files and their ingestion status.
pub struct FileStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> FileStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Create a file record in `Processing` state.
    pub async fn create(
        &self,
        original_name: &str,
        stored_name: &str,
    ) -> Result<uploaded_file::Model, DbErr> {
        let now = Utc::now();
        uploaded_file::ActiveModel {
            original_name: Set(original_name.to_string()),
            stored_name: Set(stored_name.to_string()),
            status: Set(FileStatus::Processing),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await
    }

    pub async fn get(&self, id: i32) -> Result<Option<uploaded_file::Model>, DbErr> {
        uploaded_file::Entity::find_by_id(id).one(self.conn).await
    }

    /// All files, newest first.
    pub async fn list(&self) -> Result<Vec<uploaded_file::Model>, DbErr> {
        uploaded_file::Entity::find()
            .order_by_desc(uploaded_file::Column::CreatedAt)
            .order_by_desc(uploaded_file::Column::Id)
            .all(self.conn)
            .await
    }

    /// Move a file from `Processing` to the terminal `status`.
    ///
    /// The update is conditional on the row still being `Processing`, so a
    /// terminal status is written at most once. Returns
    /// [`DbErr::RecordNotUpdated`] when no row transitioned (unknown id or
    /// already terminal).
    pub async fn set_status(&self, id: i32, status: FileStatus) -> Result<(), DbErr> {
        if !FileStatus::Processing.can_transition_to(status) {
            return Err(DbErr::Custom(format!(
                "Cannot transition file {id} to {status}"
            )));
        }

        let result = uploaded_file::Entity::update_many()
            .col_expr(uploaded_file::Column::Status, Expr::value(status))
            .col_expr(uploaded_file::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(uploaded_file::Column::Id.eq(id))
            .filter(uploaded_file::Column::Status.eq(FileStatus::Processing))
            .exec(self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(DbErr::RecordNotUpdated);
        }

        Ok(())
    }

    /// Delete a file record. Its blocks go with it (cascade).
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(&self, id: i32) -> Result<bool, DbErr> {
        let result = uploaded_file::Entity::delete_by_id(id)
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Ids of files still `Processing` whose last update is older than `older_than`.
    pub async fn find_stuck(&self, older_than: DateTime<Utc>) -> Result<Vec<i32>, DbErr> {
        uploaded_file::Entity::find()
            .select_only()
            .column(uploaded_file::Column::Id)
            .filter(uploaded_file::Column::Status.eq(FileStatus::Processing))
            .filter(uploaded_file::Column::UpdatedAt.lt(older_than))
            .order_by_asc(uploaded_file::Column::Id)
            .into_tuple()
            .all(self.conn)
            .await
    }
}
