use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/files", file_routes(config))
        .nest("/blocks", block_routes())
}

fn file_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let read = OpenApiRouter::new()
        .routes(routes!(handlers::file::list_files))
        .routes(routes!(handlers::file::get_file_status));

    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::file::upload_file))
        .layer(handlers::file::upload_body_limit(
            config.storage.max_upload_size,
        ));

    read.merge(upload)
}

fn block_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::block::list_blocks))
        .routes(routes!(handlers::block::search_blocks))
        .routes(routes!(handlers::block::get_block))
}
