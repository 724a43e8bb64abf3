pub mod analyze;
pub mod audit;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/analyze", post(analyze::analyze_handler))
        .route("/api/v1/health", get(health::health_handler))
        .route("/api/v1/analyses", get(audit::list_analyses_handler))
        .route("/api/v1/analyses/:id", get(audit::get_analysis_handler))
        .route("/api/v1/usage", get(audit::usage_handler))
        .with_state(state)
}
