use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::path::AppPath;
use crate::extractors::query::AppQuery;
use crate::models::block::*;
use crate::models::shared::{Pagination, validate_optional_id, validate_page};
use crate::state::AppState;
use crate::store::{BlockFilter, BlockStore};

#[utoipa::path(
    get,
    path = "/",
    tag = "Blocks",
    operation_id = "listBlocks",
    summary = "List extracted blocks",
    description = "Returns a page of blocks ordered by name, optionally restricted to one file.",
    params(BlockListQuery),
    responses(
        (status = 200, description = "Page of blocks", body = BlockListResponse),
        (status = 400, description = "Invalid parameters (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_blocks(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<BlockListQuery>,
) -> Result<Json<BlockListResponse>, AppError> {
    let (page, per_page) = validate_page(query.page, query.per_page)?;
    let file_id = validate_optional_id(query.file_id, "file_id")?;

    let (rows, total) = BlockStore::new(&state.db)
        .query(BlockFilter { file_id }, page, per_page)
        .await?;

    Ok(Json(BlockListResponse {
        data: rows.into_iter().map(BlockResponse::from).collect(),
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/search",
    tag = "Blocks",
    operation_id = "searchBlocks",
    summary = "Search blocks by name",
    description = "Case-insensitive substring match on the block name, ordered by name. \
        `q` is required and must not be blank.",
    params(BlockSearchQuery),
    responses(
        (status = 200, description = "Matching blocks", body = Vec<BlockResponse>),
        (status = 400, description = "Missing or invalid parameters (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn search_blocks(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<BlockSearchQuery>,
) -> Result<Json<Vec<BlockResponse>>, AppError> {
    let q = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| {
            AppError::Validation("Search query parameter \"q\" is required".into())
        })?;
    let file_id = validate_optional_id(query.file_id, "file_id")?;

    let rows = BlockStore::new(&state.db).search(q, file_id).await?;

    Ok(Json(rows.into_iter().map(BlockResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Blocks",
    operation_id = "getBlock",
    summary = "Get a block by ID",
    params(("id" = i32, Path, description = "Block ID")),
    responses(
        (status = 200, description = "Block details", body = BlockResponse),
        (status = 400, description = "Invalid ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Block not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_block(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<BlockResponse>, AppError> {
    let row = BlockStore::new(&state.db)
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Block with ID {id} not found")))?;

    Ok(Json(BlockResponse::from(row)))
}
