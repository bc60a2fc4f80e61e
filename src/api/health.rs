use crate::api::AppState;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Readiness plus the settings requests fall back to.
pub async fn ready(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ready",
        "sessions": state.orchestrator.session_count(),
        "defaultCutoff": state.config.default_cutoff,
    }))
}
