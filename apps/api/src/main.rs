mod analysis;
mod audit;
mod config;
mod db;
mod errors;
mod extract;
mod models;
mod prompt;
mod providers;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::orchestrator::Analyzer;
use crate::audit::AuditRecorder;
use crate::config::Config;
use crate::db::create_pool;
use crate::prompt::PromptLibrary;
use crate::providers::ProviderRegistry;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Analysis API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite audit store
    let pool = create_pool(&config.database_path).await?;
    let audit = AuditRecorder::new(pool);

    // Initialize LLM providers
    let providers = Arc::new(ProviderRegistry::from_config(&config));
    for (name, status) in providers.availability() {
        info!("provider {name}: {status}");
    }
    if !providers.has_any_provider() {
        warn!("no LLM providers configured; analysis requests will fail");
    }

    let prompts = Arc::new(PromptLibrary::new());
    let analyzer = Arc::new(Analyzer::new(
        providers.clone(),
        prompts,
        audit.clone(),
    ));

    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .context("failed to build HTTP client")?;

    let state = AppState {
        analyzer,
        providers,
        audit,
        http,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
