//! User routes.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::{RequireRead, RequireWrite};
use crate::models::user::{CreateUser, UpdateUser, UserResponse};
use crate::routes::total_count;
use crate::services::user as user_service;
use crate::validation::{ValidatedJson, ValidatedPath};
use crate::AppState;

/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    RequireRead(_principal): RequireRead,
) -> Result<impl IntoResponse, AppError> {
    let users: Vec<UserResponse> = user_service::list(state.store.as_ref())
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();
    Ok((total_count(users.len()), ApiResponse::success(users)))
}

/// GET /api/users/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireRead(_principal): RequireRead,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = user_service::find_by_id(state.store.as_ref(), id).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}

/// POST /api/users
pub async fn create(
    State(state): State<AppState>,
    RequireWrite(_principal): RequireWrite,
    ValidatedJson(body): ValidatedJson<CreateUser>,
) -> Result<impl IntoResponse, AppError> {
    let user = user_service::create(state.store.as_ref(), body).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(UserResponse::from(user))))
}

/// PUT /api/users/{id} (self or admin)
pub async fn update(
    State(state): State<AppState>,
    RequireWrite(principal): RequireWrite,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(body): ValidatedJson<UpdateUser>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = user_service::update(state.store.as_ref(), &principal, id, body).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}

/// DELETE /api/users/{id} (self or admin)
pub async fn delete(
    State(state): State<AppState>,
    RequireWrite(principal): RequireWrite,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<StatusCode, AppError> {
    user_service::delete(state.store.as_ref(), &principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
