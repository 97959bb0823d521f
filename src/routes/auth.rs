//! Authentication routes: login, refresh, profile.

use axum::{extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::RequireRead;
use crate::models::user::UserResponse;
use crate::services::auth as auth_service;
use crate::services::auth::TokenPair;
use crate::services::user as user_service;
use crate::validation::ValidatedJson;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(required(message = "Username cannot be blank"))]
    pub username: Option<String>,
    #[validate(required(message = "Password cannot be blank"))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token cannot be blank"))]
    pub refresh_token: String,
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, AppError> {
    let tokens = auth_service::login(
        state.store.as_ref(),
        body.username.as_deref().unwrap_or_default(),
        body.password.as_deref().unwrap_or_default(),
        &state.config.jwt,
    )
    .await?;

    Ok(ApiResponse::success(tokens))
}

/// POST /api/login/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, AppError> {
    let tokens =
        auth_service::refresh_token(state.store.as_ref(), &body.refresh_token, &state.config.jwt)
            .await?;

    Ok(ApiResponse::success(tokens))
}

/// GET /api/me: current user profile
pub async fn me(
    State(state): State<AppState>,
    RequireRead(principal): RequireRead,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = user_service::current(state.store.as_ref(), &principal).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}
