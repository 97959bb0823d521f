//! Forwarding of captured internal errors to an external collector.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::ErrorReportingConfig;
use crate::errors::AppError;

/// One captured internal failure.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEvent {
    pub id: Uuid,
    pub message: String,
    pub method: String,
    pub path: String,
    pub environment: String,
    pub timestamp: DateTime<Utc>,
}

/// Connection details for an enabled collector.
#[derive(Debug)]
pub struct Collector {
    http: reqwest::Client,
    endpoint: String,
    token: String,
    environment: String,
}

/// Error reporting, fixed at startup.
#[derive(Debug, Clone)]
pub enum ErrorReporter {
    Disabled,
    Enabled(Arc<Collector>),
}

impl ErrorReporter {
    pub fn from_config(config: &ErrorReportingConfig) -> Result<Self, AppError> {
        match config {
            ErrorReportingConfig::Disabled => Ok(Self::Disabled),
            ErrorReportingConfig::Enabled {
                endpoint,
                token,
                environment,
            } => {
                let http = reqwest::Client::builder()
                    .timeout(Duration::from_secs(5))
                    .build()
                    .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {e}")))?;
                Ok(Self::Enabled(Arc::new(Collector {
                    http,
                    endpoint: endpoint.clone(),
                    token: token.clone(),
                    environment: environment.clone(),
                })))
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }

    pub fn event(&self, message: String, method: &str, path: &str) -> ErrorEvent {
        let environment = match self {
            Self::Enabled(collector) => collector.environment.clone(),
            Self::Disabled => String::new(),
        };
        ErrorEvent {
            id: Uuid::new_v4(),
            message,
            method: method.to_string(),
            path: path.to_string(),
            environment,
            timestamp: Utc::now(),
        }
    }

    /// Ship an event in the background. No-op when disabled.
    pub fn report(&self, event: ErrorEvent) {
        if let Self::Enabled(_) = self {
            let reporter = self.clone();
            tokio::spawn(async move {
                if let Err(e) = reporter.send(&event).await {
                    tracing::warn!(error = %e, "Failed to forward error event");
                }
            });
        }
    }

    /// Deliver an event and wait for the collector's answer.
    pub async fn send(&self, event: &ErrorEvent) -> Result<(), AppError> {
        let Self::Enabled(collector) = self else {
            return Ok(());
        };
        let response = collector
            .http
            .post(&collector.endpoint)
            .bearer_auth(&collector.token)
            .json(event)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Error collector unreachable: {e}")))?;
        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "Error collector answered {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
    use tokio::sync::mpsc;

    #[test]
    fn disabled_by_default_config() {
        let reporter = ErrorReporter::from_config(&ErrorReportingConfig::Disabled).unwrap();
        assert!(!reporter.is_enabled());
    }

    #[tokio::test]
    async fn send_posts_event_with_token() {
        let (tx, mut rx) = mpsc::unbounded_channel::<(String, serde_json::Value)>();
        let collector = Router::new()
            .route(
                "/events",
                post(
                    |State(tx): State<mpsc::UnboundedSender<(String, serde_json::Value)>>,
                     headers: HeaderMap,
                     Json(body): Json<serde_json::Value>| async move {
                        let auth = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or_default()
                            .to_string();
                        tx.send((auth, body)).ok();
                    },
                ),
            )
            .with_state(tx);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, collector).await.ok() });

        let reporter = ErrorReporter::from_config(&ErrorReportingConfig::Enabled {
            endpoint: format!("http://{addr}/events"),
            token: "collector-token".to_string(),
            environment: "test".to_string(),
        })
        .unwrap();

        let event = reporter.event("boom".to_string(), "GET", "/api/tasks");
        reporter.send(&event).await.unwrap();

        let (auth, body) = rx.recv().await.unwrap();
        assert_eq!(auth, "Bearer collector-token");
        assert_eq!(body["message"], "boom");
        assert_eq!(body["environment"], "test");
        assert_eq!(body["path"], "/api/tasks");
        assert_eq!(body["id"], event.id.to_string());
    }
}
