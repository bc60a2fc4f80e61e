pub mod health;
pub mod overrides;
pub mod portfolio;

use crate::catalog::SourceCatalog;
use crate::config::Config;
use crate::orchestration::Orchestrator;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub catalog: Arc<dyn SourceCatalog>,
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    /// Build the state around a catalog; the orchestrator shares it.
    pub fn new(config: Config, catalog: Arc<dyn SourceCatalog>) -> Self {
        let orchestrator = Arc::new(
            Orchestrator::new(Arc::clone(&catalog)).with_max_sessions(config.max_sessions),
        );
        Self {
            config,
            catalog,
            orchestrator,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/portfolio/compute", post(portfolio::compute_portfolio))
        .route(
            "/v1/sessions/:session_id/recompute",
            post(portfolio::recompute_session),
        )
        .route("/v1/sessions/:session_id", delete(portfolio::forget_session))
        .route(
            "/v1/overrides/from-selection",
            post(overrides::overrides_from_selection),
        )
        .layer(cors)
        .with_state(state)
}
