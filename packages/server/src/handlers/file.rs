use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::storage::UploadHandle;
use tracing::{error, info, instrument, warn};

use crate::error::{AppError, ErrorBody};
use crate::extractors::path::AppPath;
use crate::ingest::IngestJob;
use crate::models::file::{FileResponse, FileStatusResponse, UploadResponse};
use crate::state::AppState;
use crate::store::FileStore;
use crate::utils::filename::{has_extension, validate_flat_filename};

const ACCEPTED_EXTENSION: &str = "dxf";

/// Room for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

pub fn upload_body_limit(max_upload_size: u64) -> DefaultBodyLimit {
    let limit = max_upload_size.saturating_add(MULTIPART_OVERHEAD);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "Files",
    operation_id = "uploadFile",
    summary = "Upload a DXF file for ingestion",
    description = "Accepts a drawing in the `file` multipart field. Only `.dxf` files are accepted. \
        The file record is created in `processing` state and ingestion runs in the background; \
        poll the status endpoint for the outcome.",
    request_body(content_type = "multipart/form-data", description = "DXF file upload"),
    responses(
        (status = 202, description = "Upload accepted", body = UploadResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 503, description = "Ingestion queue full (SERVICE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let max_size = state.config.storage.max_upload_size;
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() != Some("file") {
            continue; // Ignore unknown fields.
        }

        let file_name = field
            .file_name()
            .ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;
        let file_name = validate_flat_filename(file_name)
            .map_err(|e| AppError::Validation(e.message().into()))?
            .to_string();
        if !has_extension(&file_name, ACCEPTED_EXTENSION) {
            return Err(AppError::Validation("Only .dxf files are allowed".into()));
        }

        let mut data = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
        {
            if (data.len() + chunk.len()) as u64 > max_size {
                return Err(AppError::Validation(format!(
                    "File exceeds maximum size of {max_size} bytes"
                )));
            }
            data.extend_from_slice(&chunk);
        }

        upload = Some((file_name, data));
    }

    let (file_name, data) = upload.ok_or_else(|| {
        AppError::Validation("No file uploaded. Make sure the form field name is 'file'.".into())
    })?;

    let handle = state.uploads.put(&data, ACCEPTED_EXTENSION).await?;

    let files = FileStore::new(&state.db);
    let file = match files.create(&file_name, handle.as_str()).await {
        Ok(file) => file,
        Err(e) => {
            discard_upload(&state, &handle).await;
            return Err(e.into());
        }
    };

    let job = IngestJob {
        file_id: file.id,
        handle: handle.clone(),
    };
    if let Err(e) = state.ingest.submit(job) {
        warn!(file_id = file.id, error = %e, "Could not queue ingestion");
        if let Err(db_err) = files.delete(file.id).await {
            error!(file_id = file.id, error = %db_err, "Failed to delete unqueued file record");
        }
        discard_upload(&state, &handle).await;
        return Err(AppError::Unavailable(
            "Ingestion is at capacity, try again later".into(),
        ));
    }

    info!(file_id = file.id, size = data.len(), "Upload accepted");

    Ok((
        StatusCode::ACCEPTED,
        Json(UploadResponse {
            message: "File upload accepted, processing started.".into(),
            file: FileResponse::from(file),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Files",
    operation_id = "listFiles",
    summary = "List uploaded files",
    description = "Returns every uploaded file, newest first.",
    responses(
        (status = 200, description = "Uploaded files", body = Vec<FileResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<FileResponse>>, AppError> {
    let files = FileStore::new(&state.db).list().await?;
    Ok(Json(files.into_iter().map(FileResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}/status",
    tag = "Files",
    operation_id = "getFileStatus",
    summary = "Get the ingestion status of a file",
    params(("id" = i32, Path, description = "File ID")),
    responses(
        (status = 200, description = "File status", body = FileStatusResponse),
        (status = 400, description = "Invalid ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_file_status(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<FileStatusResponse>, AppError> {
    let file = FileStore::new(&state.db)
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".into()))?;

    Ok(Json(FileStatusResponse::from(file)))
}

async fn discard_upload(state: &AppState, handle: &UploadHandle) {
    if let Err(e) = state.uploads.remove(handle).await {
        warn!(handle = %handle, error = %e, "Failed to remove discarded upload");
    }
}
