//! File handlers for the depot Web API.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::file::UploadRequest;
use crate::web::dto::{DataQuery, FileResponse, ListQuery, UploadBody};
use crate::web::error::ApiError;
use crate::web::extract::SessionToken;
use crate::web::handlers::AppState;

/// POST /files - Upload a folder, file, or image.
pub async fn post_upload(
    State(state): State<Arc<AppState>>,
    token: SessionToken,
    Json(body): Json<UploadBody>,
) -> Result<(StatusCode, Json<FileResponse>), ApiError> {
    let mut request = UploadRequest::new(
        body.name.unwrap_or_default(),
        body.kind.unwrap_or_default(),
    )
    .with_parent(body.parent_id)
    .with_visibility(body.is_public);

    if let Some(data) = body.data {
        request = request.with_data(data);
    }

    let record = state
        .file_service()
        .upload(token.as_deref(), request)
        .await?;

    Ok((StatusCode::CREATED, Json(record.into())))
}

/// GET /files/:id - Fetch one of the caller's records.
pub async fn get_show(
    State(state): State<Arc<AppState>>,
    token: SessionToken,
    Path(file_id): Path<i64>,
) -> Result<Json<FileResponse>, ApiError> {
    let record = state.file_service().get(token.as_deref(), file_id).await?;

    Ok(Json(record.into()))
}

/// GET /files - List one page of the caller's records under a parent.
pub async fn get_index(
    State(state): State<Arc<AppState>>,
    token: SessionToken,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<FileResponse>>, ApiError> {
    let records = state
        .file_service()
        .list(token.as_deref(), query.parent_id, query.page)
        .await?;

    Ok(Json(records.into_iter().map(FileResponse::from).collect()))
}

/// PUT /files/:id/publish - Make a record public.
pub async fn put_publish(
    State(state): State<Arc<AppState>>,
    token: SessionToken,
    Path(file_id): Path<i64>,
) -> Result<Json<FileResponse>, ApiError> {
    let record = state
        .file_service()
        .set_visibility(token.as_deref(), file_id, true)
        .await?;

    Ok(Json(record.into()))
}

/// PUT /files/:id/unpublish - Make a record private again.
pub async fn put_unpublish(
    State(state): State<Arc<AppState>>,
    token: SessionToken,
    Path(file_id): Path<i64>,
) -> Result<Json<FileResponse>, ApiError> {
    let record = state
        .file_service()
        .set_visibility(token.as_deref(), file_id, false)
        .await?;

    Ok(Json(record.into()))
}

/// GET /files/:id/data - Serve raw content, or a thumbnail via `?size=`.
pub async fn get_data(
    State(state): State<Arc<AppState>>,
    token: SessionToken,
    Path(file_id): Path<i64>,
    Query(query): Query<DataQuery>,
) -> Result<Response<Body>, ApiError> {
    let content = state
        .file_service()
        .read_content(token.as_deref(), file_id, query.size)
        .await?;

    let content_type = mime_guess::from_path(&content.record.name)
        .first_or_octet_stream()
        .to_string();

    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, content.bytes.len())
        .body(Body::from(content.bytes))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })?;

    Ok(response)
}
