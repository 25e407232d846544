use serde::Deserialize;

/// Ingestion worker pool configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// Maximum number of ingestion runs executing at once. Default: 4.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Jobs buffered before new uploads are refused. Default: 256.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Deadline for a single extraction in seconds. Unset means no deadline.
    #[serde(default)]
    pub extract_timeout_secs: Option<u64>,
}

fn default_workers() -> usize {
    4
}
fn default_queue_capacity() -> usize {
    256
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            extract_timeout_secs: None,
        }
    }
}

/// Stuck-file sweeper configuration.
///
/// A file whose ingestion failed and whose failure could not be recorded
/// stays in `processing`. When enabled, the sweeper marks such files as
/// failed once they have not been touched for `stuck_timeout_secs`.
#[derive(Debug, Deserialize, Clone)]
pub struct SweepConfig {
    /// Default: false.
    #[serde(default)]
    pub enabled: bool,
    /// Age after which a processing file counts as stuck. Default: 3600.
    #[serde(default = "default_stuck_timeout_secs")]
    pub stuck_timeout_secs: u64,
    /// Delay between scans. Default: 300.
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
}

fn default_stuck_timeout_secs() -> u64 {
    3600
}
fn default_scan_interval_secs() -> u64 {
    300
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            stuck_timeout_secs: default_stuck_timeout_secs(),
            scan_interval_secs: default_scan_interval_secs(),
        }
    }
}
