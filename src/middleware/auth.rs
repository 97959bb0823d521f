//! Bearer token gate and the authenticated-principal extractor.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::errors::AppError;
use crate::services::verifier::{fingerprint, Principal};
use crate::AppState;

/// Verify the bearer token and attach the caller's [`Principal`].
///
/// Mounted as a route layer on every protected route, so it runs before any
/// extractor or handler. Missing, malformed and rejected tokens all get the
/// same 401.
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let Some(Authorization(bearer)) = req.headers().typed_get::<Authorization<Bearer>>() else {
        tracing::debug!(path = %req.uri().path(), "Missing bearer token");
        return AppError::Unauthorized.into_response();
    };
    let token = bearer.token();

    match state.verifier.verify(token).await {
        Ok(principal) => {
            tracing::debug!(
                subject = %principal.subject,
                source = ?principal.source,
                "Bearer token accepted"
            );
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(e) => {
            tracing::info!(token_fp = %fingerprint(token), reason = %e, "Bearer token rejected");
            AppError::from(e).into_response()
        }
    }
}

/// Authenticated caller, as attached by [`authenticate`].
///
/// Use as an Axum extractor in handlers that require authentication:
/// ```ignore
/// async fn handler(principal: Principal) -> impl IntoResponse { ... }
/// ```
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
