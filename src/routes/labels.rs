//! Label routes.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::{RequireRead, RequireWrite};
use crate::models::label::{CreateLabel, LabelResponse, UpdateLabel};
use crate::routes::total_count;
use crate::services::label as label_service;
use crate::validation::{ValidatedJson, ValidatedPath};
use crate::AppState;

/// GET /api/labels
pub async fn list(
    State(state): State<AppState>,
    RequireRead(_principal): RequireRead,
) -> Result<impl IntoResponse, AppError> {
    let labels: Vec<LabelResponse> = label_service::list(state.store.as_ref())
        .await?
        .into_iter()
        .map(LabelResponse::from)
        .collect();
    Ok((total_count(labels.len()), ApiResponse::success(labels)))
}

/// GET /api/labels/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireRead(_principal): RequireRead,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<Json<ApiResponse<LabelResponse>>, AppError> {
    let label = label_service::find_by_id(state.store.as_ref(), id).await?;
    Ok(ApiResponse::success(LabelResponse::from(label)))
}

/// POST /api/labels
pub async fn create(
    State(state): State<AppState>,
    RequireWrite(_principal): RequireWrite,
    ValidatedJson(body): ValidatedJson<CreateLabel>,
) -> Result<impl IntoResponse, AppError> {
    let label = label_service::create(state.store.as_ref(), body).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(LabelResponse::from(label))))
}

/// PUT /api/labels/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireWrite(_principal): RequireWrite,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(body): ValidatedJson<UpdateLabel>,
) -> Result<Json<ApiResponse<LabelResponse>>, AppError> {
    let label = label_service::update(state.store.as_ref(), id, body).await?;
    Ok(ApiResponse::success(LabelResponse::from(label)))
}

/// DELETE /api/labels/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireWrite(_principal): RequireWrite,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<StatusCode, AppError> {
    label_service::delete(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
