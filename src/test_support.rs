use std::collections::HashMap;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::MemoryStore;
use crate::services::{auth, bootstrap};
use crate::AppState;

/// State over a fresh, bootstrapped in-memory store.
pub async fn test_state() -> AppState {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("JWT_SECRET", "unit-test-secret"),
        ("AUTH_TIMEOUT_MS", "500"),
    ]);
    let config = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
    let store = Arc::new(MemoryStore::new());
    bootstrap::run(store.as_ref(), &config.bootstrap).await.unwrap();
    AppState::new(store, config).unwrap()
}

pub async fn admin_token(state: &AppState) -> String {
    auth::login(
        state.store.as_ref(),
        &state.config.bootstrap.admin_email,
        &state.config.bootstrap.admin_password,
        &state.config.jwt,
    )
    .await
    .unwrap()
    .access_token
}
