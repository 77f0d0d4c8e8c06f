//! Carbon estimation HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use shared::{CalculationMethod, NamedMethod, PlotId};

use crate::AppState;

/// Request body for the trial calculator
#[derive(Debug, Deserialize)]
pub struct QuickCalculationRequest {
    pub tree_age: i32,
    pub area_rai: f64,
    /// Institutional method name; informational for the quick path
    pub method: Option<NamedMethod>,
}

/// Request body for recomputing a batch of plots
#[derive(Debug, Deserialize)]
pub struct BulkCalculateRequest {
    pub ids: Vec<String>,
    pub method: Option<CalculationMethod>,
}

/// Quick estimate from age and area alone
pub async fn calculate_carbon(
    State(state): State<AppState>,
    Json(request): Json<QuickCalculationRequest>,
) -> impl IntoResponse {
    // Default to TGO, matching the trial calculator
    let method = request.method.unwrap_or(NamedMethod::Tgo);
    let result = state.carbon.quick(request.tree_age, request.area_rai);
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "method": method,
            "formula_family": method.family(),
            "result": result,
        })),
    )
}

/// Model-table estimate for a stored plot, without writing it back
pub async fn estimate_plot(
    State(state): State<AppState>,
    Path(plot_id): Path<String>,
) -> impl IntoResponse {
    let plot = match state.store.get(&PlotId::from(plot_id)).await {
        Ok(plot) => plot,
        Err(e) => return e.into_response(),
    };

    match state.carbon.estimate_for_plot(&plot) {
        Ok(estimate) => (StatusCode::OK, Json(estimate)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Recompute carbon for a batch of plots
pub async fn bulk_calculate(
    State(state): State<AppState>,
    Json(request): Json<BulkCalculateRequest>,
) -> impl IntoResponse {
    let ids: Vec<PlotId> = request.ids.into_iter().map(PlotId::from).collect();

    match state.carbon.bulk_calculate(&ids, request.method).await {
        Ok(plots) => (
            StatusCode::OK,
            Json(serde_json::json!({ "plots": plots })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Totals over all saved plots
pub async fn carbon_summary(State(state): State<AppState>) -> impl IntoResponse {
    let summary = state.carbon.summary().await;
    (StatusCode::OK, Json(summary))
}
