use std::time::Duration;

use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::{info, warn};

use crate::entity::uploaded_file;

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Set connection pool options
    opt.max_connections(50)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("server::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}

/// Create indexes that the schema sync cannot express.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Stuck-file scan:
    // SELECT id FROM uploaded_file WHERE status = 'processing' AND updated_at < ?
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_uploaded_file_status_updated")
        .table(uploaded_file::Entity)
        .col(uploaded_file::Column::Status)
        .col(uploaded_file::Column::UpdatedAt)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => info!("Ensured index idx_uploaded_file_status_updated exists"),
        Err(e) => warn!(
            "Failed to create index idx_uploaded_file_status_updated: {}",
            e
        ),
    }

    Ok(())
}
