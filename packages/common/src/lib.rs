pub mod config;
pub mod file_status;
pub mod storage;

pub use config::{IngestConfig, SweepConfig};
pub use file_status::FileStatus;
