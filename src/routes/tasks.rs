//! Task routes: CRUD and filtered, paginated listing.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::{RequireRead, RequireWrite};
use crate::models::pagination::Pagination;
use crate::models::task::{CreateTask, TaskFilter, TaskResponse, UpdateTask};
use crate::routes::total_count;
use crate::services::task as task_service;
use crate::validation::{ValidatedJson, ValidatedPath, ValidatedQuery};
use crate::AppState;

/// GET /api/tasks, filtered by `titleCont`, `assigneeId`, `status`, `labelId`.
pub async fn list(
    State(state): State<AppState>,
    RequireRead(_principal): RequireRead,
    ValidatedQuery(pagination): ValidatedQuery<Pagination>,
    ValidatedQuery(filter): ValidatedQuery<TaskFilter>,
) -> Result<impl IntoResponse, AppError> {
    let result = task_service::list(state.store.as_ref(), &filter, &pagination).await?;
    Ok((total_count(result.total), ApiResponse::success(result)))
}

/// GET /api/tasks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireRead(_principal): RequireRead,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<Json<ApiResponse<TaskResponse>>, AppError> {
    let task = task_service::find_by_id(state.store.as_ref(), id).await?;
    Ok(ApiResponse::success(TaskResponse::from(task)))
}

/// POST /api/tasks
pub async fn create(
    State(state): State<AppState>,
    RequireWrite(_principal): RequireWrite,
    ValidatedJson(body): ValidatedJson<CreateTask>,
) -> Result<impl IntoResponse, AppError> {
    let task = task_service::create(state.store.as_ref(), body).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(TaskResponse::from(task))))
}

/// PUT /api/tasks/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireWrite(_principal): RequireWrite,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(body): ValidatedJson<UpdateTask>,
) -> Result<Json<ApiResponse<TaskResponse>>, AppError> {
    let task = task_service::update(state.store.as_ref(), id, body).await?;
    Ok(ApiResponse::success(TaskResponse::from(task)))
}

/// DELETE /api/tasks/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireWrite(_principal): RequireWrite,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<StatusCode, AppError> {
    task_service::delete(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
