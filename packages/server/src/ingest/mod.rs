//! Asynchronous ingestion of uploaded drawing files.
//!
//! [`Ingestor`] runs one file through read, extract, persist, finalize and
//! cleanup. [`IngestPool`] runs many of them with bounded concurrency, and
//! the sweeper fails files that never reached a terminal status and are no
//! longer held by the pool.

mod orchestrator;
mod pool;
mod store;
mod sweep;

pub use orchestrator::{IngestError, IngestJob, IngestOutcome, Ingestor};
pub use pool::{InFlight, IngestPool, IngestQueue, SubmitError};
pub use store::{DbIngestStore, IngestStore};
pub use sweep::{run_stuck_file_sweeper, stuck_timeout, sweep_stuck_files};
