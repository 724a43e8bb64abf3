use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::state::AppState;

const DEFAULT_LIST_LIMIT: u32 = 20;
const MAX_LIST_LIMIT: u32 = 100;
const DEFAULT_USAGE_DAYS: u32 = 30;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UsageParams {
    pub days: Option<u32>,
}

/// GET /api/v1/analyses/:id
pub async fn get_analysis_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let row = state
        .audit
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no analysis with id '{id}'")))?;
    Ok(Json(json!(row)))
}

/// GET /api/v1/analyses?limit=N
pub async fn list_analyses_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, AppError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .min(MAX_LIST_LIMIT);
    let rows = state.audit.recent(limit).await?;
    Ok(Json(json!({
        "count": rows.len(),
        "analyses": rows,
    })))
}

/// GET /api/v1/usage?days=N
pub async fn usage_handler(
    State(state): State<AppState>,
    Query(params): Query<UsageParams>,
) -> Result<Json<Value>, AppError> {
    let days = params.days.unwrap_or(DEFAULT_USAGE_DAYS);
    let usage = state.audit.usage_summary(days).await?;
    Ok(Json(json!({
        "days": days,
        "providers": usage,
    })))
}
