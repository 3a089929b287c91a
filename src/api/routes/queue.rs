//! Task lifecycle handlers.

use super::{CreateTaskRequest, CreateTaskResponse, NextFileResponse, SuccessResponse};
use crate::api::AppState;
use crate::error::{ApiError, Error};
use crate::types::{TaskId, TaskSnapshot};
use crate::utils::content_disposition;
use axum::{
    Json,
    body::Body,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

/// POST /queue/create - Create a batch task
#[utoipa::path(
    post,
    path = "/queue/create",
    tag = "queue",
    request_body = CreateTaskRequest,
    responses(
        (status = 200, description = "Task created, processing started", body = CreateTaskResponse),
        (status = 400, description = "urls missing, empty, or not an array", body = ApiError),
        (status = 503, description = "Shutting down", body = ApiError)
    )
)]
pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<Json<CreateTaskResponse>, Error> {
    let Json(request) = payload.map_err(|rejection| {
        Error::InvalidRequest(format!(
            "body must be {{\"urls\": string[], \"format\": string}}: {}",
            rejection.body_text()
        ))
    })?;

    let (task_id, total) = state
        .queue
        .create_task(request.urls, &request.format)
        .await?;

    Ok(Json(CreateTaskResponse {
        task_id: task_id.to_string(),
        total,
    }))
}

/// GET /queue/status/:task_id - Task status snapshot
#[utoipa::path(
    get,
    path = "/queue/status/{task_id}",
    tag = "queue",
    params(
        ("task_id" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task status", body = TaskSnapshot),
        (status = 404, description = "Task not found", body = ApiError)
    )
)]
pub async fn task_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskSnapshot>, Error> {
    let snapshot = state.queue.task_status(&TaskId::from(task_id)).await?;
    Ok(Json(snapshot))
}

/// GET /queue/next/:task_id - Drain the next completed-file notification
#[utoipa::path(
    get,
    path = "/queue/next/{task_id}",
    tag = "queue",
    params(
        ("task_id" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Next completed file, or hasFile=false", body = NextFileResponse),
        (status = 404, description = "Task not found", body = ApiError)
    )
)]
pub async fn next_file(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<NextFileResponse>, Error> {
    let response = match state.queue.next_completed(&TaskId::from(task_id)).await? {
        Some(file) => NextFileResponse {
            has_file: true,
            index: Some(file.index),
            filename: Some(file.filename),
        },
        None => NextFileResponse {
            has_file: false,
            index: None,
            filename: None,
        },
    };
    Ok(Json(response))
}

/// GET /queue/download/:task_id/:index - Stream a completed item's file
#[utoipa::path(
    get,
    path = "/queue/download/{task_id}/{index}",
    tag = "queue",
    params(
        ("task_id" = String, Path, description = "Task ID"),
        ("index" = usize, Path, description = "Item index")
    ),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 404, description = "Item not completed or file no longer on disk", body = ApiError)
    )
)]
pub async fn download_file(
    State(state): State<AppState>,
    Path((task_id, index)): Path<(String, String)>,
) -> Response {
    let Ok(index) = index.parse::<usize>() else {
        return file_not_found();
    };
    let Some(file) = state.queue.item_file(&TaskId::from(task_id), index).await else {
        return file_not_found();
    };

    let handle = match tokio::fs::File::open(&file.filepath).await {
        Ok(handle) => handle,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return file_not_found(),
        Err(e) => return Error::Io(e).into_response(),
    };
    let length = handle.metadata().await.ok().map(|m| m.len());

    let disposition = HeaderValue::from_str(&content_disposition(&file.filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    let mut response = Body::from_stream(ReaderStream::new(handle)).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    if let Some(length) = length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }
    response
}

fn file_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new("file_not_found", "File not available")),
    )
        .into_response()
}

/// DELETE /queue/:task_id - Remove a task and delete its files
#[utoipa::path(
    delete,
    path = "/queue/{task_id}",
    tag = "queue",
    params(
        ("task_id" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Always succeeds, even for unknown tasks", body = SuccessResponse)
    )
)]
pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Json<SuccessResponse> {
    state.queue.cleanup_task(&TaskId::from(task_id)).await;
    Json(SuccessResponse { success: true })
}
