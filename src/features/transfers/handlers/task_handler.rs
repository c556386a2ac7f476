use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::transfers::dtos::{
    ClearTasksResponseDto, DownloadTaskListDto, UploadTaskListDto,
};
use crate::features::transfers::models::{DownloadTask, TaskStore, UploadTask};
use crate::shared::types::{ErrorResponse, SuccessResponse};

fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".to_string())
}

/// List the caller's upload tasks
#[utoipa::path(
    get,
    path = "/tasks/uploads",
    responses((status = 200, description = "Upload tasks", body = UploadTaskListDto)),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
pub async fn list_upload_tasks(
    user: AuthenticatedUser,
    State(store): State<Arc<TaskStore<UploadTask>>>,
) -> Json<UploadTaskListDto> {
    Json(UploadTaskListDto {
        tasks: store.list(&user.user_id),
    })
}

/// Remove an upload task from the list
#[utoipa::path(
    delete,
    path = "/tasks/uploads/{id}",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task removed", body = SuccessResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
pub async fn remove_upload_task(
    user: AuthenticatedUser,
    State(store): State<Arc<TaskStore<UploadTask>>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    if !store.remove(&user.user_id, &id) {
        return Err(task_not_found());
    }
    Ok(Json(SuccessResponse::ok()))
}

/// Remove completed upload tasks
#[utoipa::path(
    post,
    path = "/tasks/uploads/clear",
    responses((status = 200, description = "Completed tasks removed", body = ClearTasksResponseDto)),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
pub async fn clear_upload_tasks(
    user: AuthenticatedUser,
    State(store): State<Arc<TaskStore<UploadTask>>>,
) -> Json<ClearTasksResponseDto> {
    Json(ClearTasksResponseDto {
        success: true,
        removed: store.clear_completed(&user.user_id),
    })
}

/// List the caller's download tasks
#[utoipa::path(
    get,
    path = "/tasks/downloads",
    responses((status = 200, description = "Download tasks", body = DownloadTaskListDto)),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
pub async fn list_download_tasks(
    user: AuthenticatedUser,
    State(store): State<Arc<TaskStore<DownloadTask>>>,
) -> Json<DownloadTaskListDto> {
    Json(DownloadTaskListDto {
        tasks: store.list(&user.user_id),
    })
}

/// Remove a download task from the list
#[utoipa::path(
    delete,
    path = "/tasks/downloads/{id}",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task removed", body = SuccessResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
pub async fn remove_download_task(
    user: AuthenticatedUser,
    State(store): State<Arc<TaskStore<DownloadTask>>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    if !store.remove(&user.user_id, &id) {
        return Err(task_not_found());
    }
    Ok(Json(SuccessResponse::ok()))
}

/// Remove finished (complete or failed) download tasks
#[utoipa::path(
    post,
    path = "/tasks/downloads/clear",
    responses((status = 200, description = "Finished tasks removed", body = ClearTasksResponseDto)),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
pub async fn clear_download_tasks(
    user: AuthenticatedUser,
    State(store): State<Arc<TaskStore<DownloadTask>>>,
) -> Json<ClearTasksResponseDto> {
    Json(ClearTasksResponseDto {
        success: true,
        removed: store.clear_completed(&user.user_id),
    })
}
