use std::sync::Arc;
use std::time::Duration;

use common::storage::{StorageError, UploadHandle, UploadStore};
use extractor::{BlockCandidate, ExtractError};
use sea_orm::DbErr;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use super::store::IngestStore;

/// One file to ingest: the row created by the uploader and its temporary upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestJob {
    pub file_id: i32,
    pub handle: UploadHandle,
}

/// Why a run ended in `Failed`.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read upload: {0}")]
    Read(#[from] StorageError),

    #[error(transparent)]
    Parse(#[from] ExtractError),

    #[error("extraction task failed: {0}")]
    Task(String),

    #[error("extraction did not finish within {0:?}")]
    Timeout(Duration),

    #[error("failed to persist blocks: {0}")]
    Persist(DbErr),
}

/// How a run ended. The persisted file status is the source of truth;
/// this is returned for logging and tests.
#[derive(Debug)]
pub enum IngestOutcome {
    /// Blocks persisted and the file marked `Completed`.
    Completed { blocks: usize },
    /// The file was marked `Failed`.
    Failed { error: IngestError },
    /// The run failed, but the file had already left `Processing`, so its
    /// status was not touched.
    Superseded { error: IngestError },
    /// The run failed and so did marking the file `Failed`; the file is
    /// left in `Processing`.
    Stuck {
        error: IngestError,
        finalize_error: DbErr,
    },
}

impl IngestOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

type ExtractFn = fn(&str) -> Result<Vec<BlockCandidate>, ExtractError>;

/// Drives a single file from `Processing` to a terminal status.
#[derive(Clone)]
pub struct Ingestor {
    uploads: Arc<dyn UploadStore>,
    store: Arc<dyn IngestStore>,
    extract_timeout: Option<Duration>,
    extract_fn: ExtractFn,
}

impl Ingestor {
    pub fn new(uploads: Arc<dyn UploadStore>, store: Arc<dyn IngestStore>) -> Self {
        Self {
            uploads,
            store,
            extract_timeout: None,
            extract_fn: extractor::extract,
        }
    }

    #[cfg(test)]
    fn with_extract_fn(mut self, extract_fn: ExtractFn) -> Self {
        self.extract_fn = extract_fn;
        self
    }

    /// Fail runs whose extraction takes longer than `timeout`.
    pub fn with_extract_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.extract_timeout = timeout;
        self
    }

    /// Run read, extract, persist, finalize and cleanup for one file.
    ///
    /// Never returns an error: every failure ends here and is reflected in
    /// the file status. The upload is removed exactly once, whatever the
    /// outcome.
    #[instrument(skip(self, job), fields(file_id = job.file_id, handle = %job.handle))]
    pub async fn ingest(&self, job: IngestJob) -> IngestOutcome {
        let outcome = match self.run(&job).await {
            Ok(blocks) => {
                info!(blocks, "Ingestion completed");
                IngestOutcome::Completed { blocks }
            }
            Err(error) => {
                error!(error = %error, "Ingestion failed");
                match self.store.mark_failed(job.file_id).await {
                    Ok(()) => IngestOutcome::Failed { error },
                    Err(DbErr::RecordNotUpdated) => {
                        warn!("File already left processing, status unchanged");
                        IngestOutcome::Superseded { error }
                    }
                    Err(finalize_error) => {
                        error!(
                            error = %finalize_error,
                            "Failed to mark file as failed, file left in processing"
                        );
                        IngestOutcome::Stuck {
                            error,
                            finalize_error,
                        }
                    }
                }
            }
        };

        self.cleanup(&job.handle).await;

        outcome
    }

    async fn run(&self, job: &IngestJob) -> Result<usize, IngestError> {
        let bytes = self.uploads.read_all(&job.handle).await?;
        debug!(bytes = bytes.len(), "Read upload");

        let candidates = self.extract(bytes).await?;
        let count = candidates.len();

        self.store
            .complete(job.file_id, &candidates)
            .await
            .map_err(IngestError::Persist)?;

        Ok(count)
    }

    /// Extraction is CPU-bound; run it off the async workers.
    async fn extract(&self, bytes: Vec<u8>) -> Result<Vec<BlockCandidate>, IngestError> {
        let extract_fn = self.extract_fn;
        let task = tokio::task::spawn_blocking(move || {
            let text = String::from_utf8_lossy(&bytes);
            extract_fn(&text)
        });

        let joined = match self.extract_timeout {
            // The blocking thread cannot be interrupted; it finishes detached.
            Some(limit) => tokio::time::timeout(limit, task)
                .await
                .map_err(|_| IngestError::Timeout(limit))?,
            None => task.await,
        };

        let candidates = joined.map_err(|e| IngestError::Task(e.to_string()))??;
        Ok(candidates)
    }

    async fn cleanup(&self, handle: &UploadHandle) {
        match self.uploads.remove(handle).await {
            Ok(true) => debug!("Removed upload"),
            Ok(false) => debug!("Upload already absent"),
            Err(e) => warn!(error = %e, "Failed to remove upload"),
        }
    }
}
