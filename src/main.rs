use std::net::SocketAddr;

use anyhow::Context;
use mimalloc::MiMalloc;
use task_manager::config::AppConfig;
use task_manager::services::bootstrap;
use task_manager::{db, routes, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// M-MIMALLOC-APP: Use mimalloc as global allocator for improved performance.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "task_manager=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    let store = db::connect(&config.database)
        .await
        .context("Failed to open storage")?;
    bootstrap::run(store.as_ref(), &config.bootstrap)
        .await
        .context("Failed to seed initial data")?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;
    let tls = config.tls.clone();

    let state = AppState::new(store, config).context("Failed to build application state")?;
    tracing::info!(
        host = %addr,
        error_reporting = state.reporter.is_enabled(),
        "Starting task manager API server"
    );
    let app = routes::router(state);

    match tls {
        Some(tls) => {
            rustls::crypto::aws_lc_rs::default_provider()
                .install_default()
                .ok();
            let rustls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                &tls.cert_path,
                &tls.key_path,
            )
            .await
            .context("Failed to load TLS certificate")?;
            tracing::info!("Serving HTTPS");
            axum_server::bind_rustls(addr, rustls_config)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
