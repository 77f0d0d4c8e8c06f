//! Geocoding HTTP handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

/// Search a place name and return coordinates for re-centering the view.
///
/// Lookup failures are non-fatal: they are logged and reported as an empty
/// result so the map keeps working.
pub async fn search_place(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let result = match state.geocoding.search(&query.q).await {
        Ok(coordinates) => coordinates,
        Err(e) => {
            tracing::warn!("Place search failed for '{}': {}", query.q, e);
            None
        }
    };

    (StatusCode::OK, Json(serde_json::json!({ "result": result })))
}
