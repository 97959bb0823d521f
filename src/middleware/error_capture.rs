//! Strips captured internal errors from responses and forwards them.

use std::any::Any;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::{ApiResponse, CapturedError};
use crate::services::error_reporting::ErrorReporter;

pub async fn capture_errors(
    State(reporter): State<ErrorReporter>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let mut response = next.run(req).await;
    if let Some(CapturedError(message)) = response.extensions_mut().remove::<CapturedError>() {
        reporter.report(reporter.event(message, &method, &path));
    }
    response
}

/// Render a handler panic as the generic 500 envelope.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(error = %detail, "Handler panicked");

    let mut response = (
        StatusCode::INTERNAL_SERVER_ERROR,
        ApiResponse::<()>::error("INTERNAL_ERROR", "An internal error occurred"),
    )
        .into_response();
    response
        .extensions_mut()
        .insert(CapturedError(format!("panic: {detail}")));
    response
}
