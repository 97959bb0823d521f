//! Scope-based access control extractors for Axum handlers.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;
use crate::services::verifier::{Principal, SCOPE_TASKS_READ, SCOPE_TASKS_WRITE};

async fn require_scope<S: Send + Sync>(
    parts: &mut Parts,
    state: &S,
    scope: &str,
) -> Result<Principal, AppError> {
    let principal = Principal::from_request_parts(parts, state).await?;
    if !principal.has_scope(scope) {
        tracing::info!(subject = %principal.subject, scope, "Missing scope");
        return Err(AppError::Forbidden(format!("Scope '{scope}' required")));
    }
    Ok(principal)
}

/// Extractor that requires the `tasks:read` scope.
#[derive(Debug, Clone)]
pub struct RequireRead(pub Principal);

impl<S> FromRequestParts<S> for RequireRead
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        require_scope(parts, state, SCOPE_TASKS_READ).await.map(RequireRead)
    }
}

/// Extractor that requires the `tasks:write` scope.
#[derive(Debug, Clone)]
pub struct RequireWrite(pub Principal);

impl<S> FromRequestParts<S> for RequireWrite
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        require_scope(parts, state, SCOPE_TASKS_WRITE).await.map(RequireWrite)
    }
}
