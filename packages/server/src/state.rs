use std::sync::Arc;

use common::storage::UploadStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::ingest::IngestQueue;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub uploads: Arc<dyn UploadStore>,
    pub ingest: IngestQueue,
}
