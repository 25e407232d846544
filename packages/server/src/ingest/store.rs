use async_trait::async_trait;
use common::FileStatus;
use extractor::BlockCandidate;
use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};

use crate::store::{BlockStore, FileStore};

/// Persistence the orchestrator needs to finish a run.
#[async_trait]
pub trait IngestStore: Send + Sync {
    /// Insert the blocks of `file_id` and mark it `Completed`, atomically.
    async fn complete(&self, file_id: i32, candidates: &[BlockCandidate]) -> Result<(), DbErr>;

    /// Mark `file_id` as `Failed`, independently of any earlier transaction.
    async fn mark_failed(&self, file_id: i32) -> Result<(), DbErr>;
}

pub struct DbIngestStore {
    db: DatabaseConnection,
}

impl DbIngestStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IngestStore for DbIngestStore {
    async fn complete(&self, file_id: i32, candidates: &[BlockCandidate]) -> Result<(), DbErr> {
        // Dropping the transaction on an early return rolls it back.
        let txn = self.db.begin().await?;

        BlockStore::new(&txn).bulk_insert(file_id, candidates).await?;
        FileStore::new(&txn)
            .set_status(file_id, FileStatus::Completed)
            .await?;

        txn.commit().await
    }

    async fn mark_failed(&self, file_id: i32) -> Result<(), DbErr> {
        FileStore::new(&self.db)
            .set_status(file_id, FileStatus::Failed)
            .await
    }
}
