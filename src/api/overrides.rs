use crate::domain::{FeedSourceId, SourceOverrides};
use crate::engine::effective_source_ids;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    pub default_active_source_ids: BTreeSet<FeedSourceId>,
    pub selected_source_ids: BTreeSet<FeedSourceId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    pub overrides: SourceOverrides,
    /// Always equal to the selection; echoed so clients can check the round trip.
    pub effective_source_ids: BTreeSet<FeedSourceId>,
}

/// Turn a user's chosen visible source set into the minimal overrides to persist.
pub async fn overrides_from_selection(
    Json(request): Json<SelectionRequest>,
) -> Json<SelectionResponse> {
    let overrides = SourceOverrides::from_selection(
        &request.default_active_source_ids,
        &request.selected_source_ids,
    );
    let effective_source_ids =
        effective_source_ids(&request.default_active_source_ids, &overrides);

    Json(SelectionResponse {
        overrides,
        effective_source_ids,
    })
}
