//! Task status routes.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::{RequireRead, RequireWrite};
use crate::models::task_status::{CreateTaskStatus, TaskStatusResponse, UpdateTaskStatus};
use crate::routes::total_count;
use crate::services::task_status as status_service;
use crate::validation::{ValidatedJson, ValidatedPath};
use crate::AppState;

/// GET /api/task_statuses
pub async fn list(
    State(state): State<AppState>,
    RequireRead(_principal): RequireRead,
) -> Result<impl IntoResponse, AppError> {
    let statuses: Vec<TaskStatusResponse> = status_service::list(state.store.as_ref())
        .await?
        .into_iter()
        .map(TaskStatusResponse::from)
        .collect();
    Ok((total_count(statuses.len()), ApiResponse::success(statuses)))
}

/// GET /api/task_statuses/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireRead(_principal): RequireRead,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<Json<ApiResponse<TaskStatusResponse>>, AppError> {
    let status = status_service::find_by_id(state.store.as_ref(), id).await?;
    Ok(ApiResponse::success(TaskStatusResponse::from(status)))
}

/// POST /api/task_statuses
pub async fn create(
    State(state): State<AppState>,
    RequireWrite(_principal): RequireWrite,
    ValidatedJson(body): ValidatedJson<CreateTaskStatus>,
) -> Result<impl IntoResponse, AppError> {
    let status = status_service::create(state.store.as_ref(), body).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success(TaskStatusResponse::from(status)),
    ))
}

/// PUT /api/task_statuses/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireWrite(_principal): RequireWrite,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(body): ValidatedJson<UpdateTaskStatus>,
) -> Result<Json<ApiResponse<TaskStatusResponse>>, AppError> {
    let status = status_service::update(state.store.as_ref(), id, body).await?;
    Ok(ApiResponse::success(TaskStatusResponse::from(status)))
}

/// DELETE /api/task_statuses/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireWrite(_principal): RequireWrite,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<StatusCode, AppError> {
    status_service::delete(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
