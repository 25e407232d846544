use std::sync::Arc;

use common::IngestConfig;
use dashmap::DashSet;
use thiserror::Error;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, info};

use super::orchestrator::{IngestJob, Ingestor};

/// A job could not be queued. The job is handed back to the caller.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("ingestion queue is full")]
    Full(IngestJob),
    #[error("ingestion queue is closed")]
    Closed(IngestJob),
}

impl SubmitError {
    pub fn into_job(self) -> IngestJob {
        match self {
            Self::Full(job) | Self::Closed(job) => job,
        }
    }
}

/// File ids that are queued or running in the pool.
///
/// Nothing else may write the status of a file in this set.
#[derive(Clone, Default)]
pub struct InFlight(Arc<DashSet<i32>>);

impl InFlight {
    pub fn contains(&self, file_id: i32) -> bool {
        self.0.contains(&file_id)
    }

    pub(super) fn track(&self, file_id: i32) {
        self.0.insert(file_id);
    }

    pub(super) fn release(&self, file_id: i32) {
        self.0.remove(&file_id);
    }
}

/// Takes a file id out of [`InFlight`] when its run ends, panics included.
struct InFlightGuard {
    in_flight: InFlight,
    file_id: i32,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.release(self.file_id);
    }
}

/// Sending side of the ingestion pool. Cheap to clone.
#[derive(Clone)]
pub struct IngestQueue {
    tx: mpsc::Sender<IngestJob>,
    in_flight: InFlight,
}

impl IngestQueue {
    /// Queue a job without waiting for room.
    pub fn submit(&self, job: IngestJob) -> Result<(), SubmitError> {
        let file_id = job.file_id;
        self.in_flight.track(file_id);

        self.tx.try_send(job).map_err(|e| {
            self.in_flight.release(file_id);
            match e {
                mpsc::error::TrySendError::Full(job) => SubmitError::Full(job),
                mpsc::error::TrySendError::Closed(job) => SubmitError::Closed(job),
            }
        })
    }
}

/// Bounded worker pool running ingestion jobs.
///
/// Jobs wait in a channel of `queue_capacity`; at most `workers` of them
/// run at the same time.
pub struct IngestPool {
    queue: IngestQueue,
    dispatcher: JoinHandle<()>,
}

impl IngestPool {
    pub fn start(ingestor: Ingestor, config: &IngestConfig) -> Self {
        let workers = config.workers.max(1);
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));

        info!(
            workers,
            queue_capacity = config.queue_capacity,
            "Starting ingestion pool"
        );

        let in_flight = InFlight::default();
        let dispatcher = tokio::spawn(dispatch(rx, ingestor, workers, in_flight.clone()));

        Self {
            queue: IngestQueue { tx, in_flight },
            dispatcher,
        }
    }

    pub fn queue(&self) -> IngestQueue {
        self.queue.clone()
    }

    pub fn in_flight(&self) -> InFlight {
        self.queue.in_flight.clone()
    }

    /// Stop accepting jobs and wait for queued and running ones to finish.
    ///
    /// Clones of the queue handed out earlier keep the channel open; drop
    /// them first or this waits until they are dropped.
    pub async fn shutdown(self) {
        drop(self.queue);
        if let Err(e) = self.dispatcher.await {
            error!(error = %e, "Ingestion dispatcher panicked");
        }
        info!("Ingestion pool stopped");
    }
}

async fn dispatch(
    mut rx: mpsc::Receiver<IngestJob>,
    ingestor: Ingestor,
    workers: usize,
    in_flight: InFlight,
) {
    let semaphore = Arc::new(Semaphore::new(workers));
    let mut running = JoinSet::new();

    while let Some(job) = rx.recv().await {
        // The semaphore is never closed.
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };

        let ingestor = ingestor.clone();
        let tracked = InFlightGuard {
            in_flight: in_flight.clone(),
            file_id: job.file_id,
        };
        running.spawn(async move {
            let _permit = permit;
            let _tracked = tracked;
            ingestor.ingest(job).await;
        });

        while let Some(result) = running.try_join_next() {
            log_join(result);
        }
    }

    while let Some(result) = running.join_next().await {
        log_join(result);
    }
}

fn log_join(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        error!(error = %e, "Ingestion run panicked");
    }
}
