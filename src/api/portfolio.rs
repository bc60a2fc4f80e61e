use crate::api::AppState;
use crate::compile::{Compiler, InputFingerprint, PortfolioInput, PortfolioOutput};
use crate::domain::{Cutoff, FeedSourceId, PortfolioSource, ProjectId, SourceOverrides};
use crate::engine::{Evidence, PercentageBasis};
use crate::error::AppError;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

const MAX_SESSION_ID_LEN: usize = 128;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeRequest {
    pub sources: Vec<PortfolioSource>,
    #[serde(default)]
    pub evidence: Evidence,
    /// Falls back to the server's configured cutoff.
    pub cutoff: Option<Cutoff>,
    #[serde(default)]
    pub included_source_ids: BTreeSet<FeedSourceId>,
    #[serde(default)]
    pub excluded_source_ids: BTreeSet<FeedSourceId>,
    #[serde(default)]
    pub project_names: BTreeMap<ProjectId, String>,
    #[serde(default)]
    pub percentage_basis: PercentageBasis,
    pub project_sources: Option<BTreeMap<ProjectId, Vec<FeedSourceId>>>,
}

impl ComputeRequest {
    pub fn into_input(self, default_cutoff: Cutoff) -> PortfolioInput {
        PortfolioInput {
            sources: self.sources,
            evidence: self.evidence,
            cutoff: self.cutoff.unwrap_or(default_cutoff),
            overrides: SourceOverrides::new(self.included_source_ids, self.excluded_source_ids),
            project_names: self.project_names,
            percentage_basis: self.percentage_basis,
            project_sources: self.project_sources,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeResponse {
    pub fingerprint: InputFingerprint,
    #[serde(flatten)]
    pub output: PortfolioOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_hit: Option<bool>,
}

fn validate_session_id(session_id: &str) -> Result<(), AppError> {
    if session_id.trim().is_empty() {
        return Err(AppError::BadRequest("sessionId must not be empty".into()));
    }
    if session_id.len() > MAX_SESSION_ID_LEN {
        return Err(AppError::BadRequest(format!(
            "sessionId must be at most {} bytes",
            MAX_SESSION_ID_LEN
        )));
    }
    Ok(())
}

/// One-shot compile, no session state involved.
pub async fn compute_portfolio(
    State(state): State<AppState>,
    Json(request): Json<ComputeRequest>,
) -> Result<Json<ComputeResponse>, AppError> {
    let input = request.into_input(state.config.default_cutoff);
    let fingerprint = InputFingerprint::of(&input)
        .map_err(|e| AppError::Internal(format!("Fingerprint failed: {}", e)))?;

    let catalog = Arc::clone(&state.catalog);
    let output = tokio::task::spawn_blocking(move || Compiler::compile(&input, catalog.as_ref()))
        .await
        .map_err(|e| AppError::Internal(format!("Compile task failed: {}", e)))??;

    Ok(Json(ComputeResponse {
        fingerprint,
        output,
        cache_hit: None,
    }))
}

/// Session-scoped compile: stale results answer 409, repeated inputs hit the cache.
pub async fn recompute_session(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<ComputeRequest>,
) -> Result<Json<ComputeResponse>, AppError> {
    validate_session_id(&session_id)?;

    let input = request.into_input(state.config.default_cutoff);
    let recomputed = state.orchestrator.recompute(&session_id, input).await?;

    Ok(Json(ComputeResponse {
        fingerprint: recomputed.fingerprint,
        output: PortfolioOutput::clone(&recomputed.output),
        cache_hit: Some(recomputed.cache_hit),
    }))
}

pub async fn forget_session(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    validate_session_id(&session_id)?;

    if state.orchestrator.forget(&session_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Unknown session {}", session_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Usd;
    use std::str::FromStr;

    #[test]
    fn test_request_defaults_to_configured_cutoff() {
        let request: ComputeRequest = serde_json::from_value(serde_json::json!({
            "sources": [{"kind": "wallet", "id": "0xabc"}]
        }))
        .unwrap();
        let default_cutoff = Cutoff::Absolute(Usd::from_str("25").unwrap());

        let input = request.into_input(default_cutoff);
        assert_eq!(input.cutoff, default_cutoff);
        assert!(input.overrides.is_empty());
        assert!(input.project_sources.is_none());
    }

    #[test]
    fn test_request_overrides_are_nested() {
        let request: ComputeRequest = serde_json::from_value(serde_json::json!({
            "sources": [],
            "cutoff": {"kind": "percent", "value": 0.1},
            "includedSourceIds": ["feed-x"],
            "excludedSourceIds": ["feed-a"],
            "projectNames": {"2": "Beta"}
        }))
        .unwrap();

        let input = request.into_input(Cutoff::default());
        assert!(matches!(input.cutoff, Cutoff::Percent(_)));
        assert!(input
            .overrides
            .included_source_ids
            .contains(&FeedSourceId::new("feed-x")));
        assert!(input
            .overrides
            .excluded_source_ids
            .contains(&FeedSourceId::new("feed-a")));
        assert_eq!(input.project_names[&ProjectId::new(2)], "Beta");
    }

    #[test]
    fn test_session_id_validation() {
        assert!(validate_session_id("tab-1").is_ok());
        assert!(validate_session_id("  ").is_err());
        assert!(validate_session_id(&"s".repeat(MAX_SESSION_ID_LEN + 1)).is_err());
    }
}
