use std::sync::Arc;

use crate::analysis::orchestrator::Analyzer;
use crate::audit::AuditRecorder;
use crate::config::Config;
use crate::providers::ProviderRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub providers: Arc<ProviderRegistry>,
    pub audit: AuditRecorder,
    /// Shared HTTP client for fetching CV documents by URL.
    pub http: reqwest::Client,
    pub config: Config,
}
