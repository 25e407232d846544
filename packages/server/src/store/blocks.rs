use chrono::Utc;
use extractor::BlockCandidate;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, ExprTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::entity::{block, uploaded_file};
use crate::models::shared::escape_like;

/// Rows per INSERT statement. Postgres allows 65535 bind parameters per
/// statement and a block row binds five.
pub const INSERT_CHUNK_ROWS: usize = 1000;

/// A block together with the file it was extracted from.
pub type BlockWithFile = (block::Model, Option<uploaded_file::Model>);

/// Optional restrictions for [`BlockStore::query`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockFilter {
    pub file_id: Option<i32>,
}

/// Persistent collection of extracted blocks.
pub struct BlockStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> BlockStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert all candidates for `file_id`, [`INSERT_CHUNK_ROWS`] rows per
    /// statement.
    ///
    /// Pass a transaction as the connection to make the chunks, and any
    /// other writes, one unit of work.
    pub async fn bulk_insert(
        &self,
        file_id: i32,
        candidates: &[BlockCandidate],
    ) -> Result<(), DbErr> {
        if candidates.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        for chunk in candidates.chunks(INSERT_CHUNK_ROWS) {
            let models = chunk.iter().map(|c| block::ActiveModel {
                name: Set(c.name.clone()),
                layer: Set(c.layer.clone()),
                coordinates: Set(serde_json::json!({
                    "x": c.coordinates.x,
                    "y": c.coordinates.y,
                    "z": c.coordinates.z,
                })),
                file_id: Set(file_id),
                created_at: Set(now),
                ..Default::default()
            });

            block::Entity::insert_many(models)
                .exec_without_returning(self.conn)
                .await?;
        }

        Ok(())
    }

    pub async fn get(&self, id: i32) -> Result<Option<BlockWithFile>, DbErr> {
        block::Entity::find_by_id(id)
            .find_also_related(uploaded_file::Entity)
            .one(self.conn)
            .await
    }

    /// One page of blocks ordered by name, plus the total match count.
    pub async fn query(
        &self,
        filter: BlockFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<BlockWithFile>, u64), DbErr> {
        let mut select = block::Entity::find();
        if let Some(file_id) = filter.file_id {
            select = select.filter(block::Column::FileId.eq(file_id));
        }

        let total = select.clone().count(self.conn).await?;

        let rows = select
            .order_by_asc(block::Column::Name)
            .order_by_asc(block::Column::Id)
            .offset(Some(page.saturating_sub(1).saturating_mul(per_page)))
            .limit(Some(per_page))
            .find_also_related(uploaded_file::Entity)
            .all(self.conn)
            .await?;

        Ok((rows, total))
    }

    /// Case-insensitive substring match on block name, ordered by name.
    ///
    /// `pattern` is matched literally: LIKE wildcards in it are escaped.
    pub async fn search(
        &self,
        pattern: &str,
        file_id: Option<i32>,
    ) -> Result<Vec<BlockWithFile>, DbErr> {
        let term = escape_like(pattern.trim()).to_lowercase();

        let mut select = block::Entity::find().filter(
            Expr::expr(Func::lower(Expr::col(block::Column::Name)))
                .like(LikeExpr::new(format!("%{term}%")).escape('\\')),
        );
        if let Some(file_id) = file_id {
            select = select.filter(block::Column::FileId.eq(file_id));
        }

        select
            .order_by_asc(block::Column::Name)
            .order_by_asc(block::Column::Id)
            .find_also_related(uploaded_file::Entity)
            .all(self.conn)
            .await
    }
}
