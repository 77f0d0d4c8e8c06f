//! Plot management HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use shared::PlotId;

use crate::services::plot::{DrawnFeature, ImportedFeature, PlotService, UpdatePlotInput};
use crate::AppState;

/// List all plots, drafts and saved
pub async fn list_plots(State(state): State<AppState>) -> impl IntoResponse {
    let service = PlotService::new(state.store.clone());
    let plots = service.list().await;
    (StatusCode::OK, Json(serde_json::json!({ "plots": plots })))
}

/// Get a specific plot
pub async fn get_plot(
    State(state): State<AppState>,
    Path(plot_id): Path<String>,
) -> impl IntoResponse {
    let service = PlotService::new(state.store.clone());

    match service.get(&PlotId::from(plot_id)).await {
        Ok(plot) => (StatusCode::OK, Json(plot)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Register a draft plot from a drawn polygon
pub async fn create_plot(
    State(state): State<AppState>,
    Json(input): Json<DrawnFeature>,
) -> impl IntoResponse {
    let service = PlotService::new(state.store.clone());

    match service.create_from_drawing(input).await {
        Ok(plot) => (StatusCode::CREATED, Json(plot)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Register a batch of draft plots from decoded shapefile features
pub async fn import_plots(
    State(state): State<AppState>,
    Json(features): Json<Vec<ImportedFeature>>,
) -> impl IntoResponse {
    let service = PlotService::new(state.store.clone());

    match service.import_features(features).await {
        Ok(plots) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "plots": plots })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a plot's attributes
pub async fn update_plot(
    State(state): State<AppState>,
    Path(plot_id): Path<String>,
    Json(input): Json<UpdatePlotInput>,
) -> impl IntoResponse {
    let service = PlotService::new(state.store.clone());

    match service.update_attributes(&PlotId::from(plot_id), input).await {
        Ok(plot) => (StatusCode::OK, Json(plot)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a plot
pub async fn delete_plot(
    State(state): State<AppState>,
    Path(plot_id): Path<String>,
) -> impl IntoResponse {
    let service = PlotService::new(state.store.clone());

    match service.delete(&PlotId::from(plot_id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
