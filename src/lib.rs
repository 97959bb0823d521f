pub mod config;
pub mod db;
pub mod errors;
pub mod mapper;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use crate::db::Store;
use crate::errors::AppError;
use crate::services::error_reporting::ErrorReporter;
use crate::services::verifier::TokenVerifier;

/// Shared application state passed to all Axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: config::AppConfig,
    pub verifier: TokenVerifier,
    pub reporter: ErrorReporter,
}

impl AppState {
    /// Wire the verifier and error reporter from configuration.
    pub fn new(store: Arc<dyn Store>, config: config::AppConfig) -> Result<Self, AppError> {
        let verifier = TokenVerifier::new(
            config.jwt.clone(),
            config.oauth.clone(),
            config.auth_timeout,
            config.jwks_cache_ttl,
        )?;
        let reporter = ErrorReporter::from_config(&config.error_reporting)?;
        Ok(Self {
            store,
            config,
            verifier,
            reporter,
        })
    }
}
