//! Workflow state-machine HTTP handlers
//!
//! One handler per transition; the state machine itself decides whether the
//! transition is legal.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use shared::PlotId;

use crate::services::plot::{DrawnFeature, ImportedFeature, UpdatePlotInput};
use crate::services::workflow::BatchAttributes;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PlotIdRequest {
    pub plot_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlotRequest {
    pub plot_id: String,
    #[serde(flatten)]
    pub input: UpdatePlotInput,
}

#[derive(Debug, Deserialize)]
pub struct CompleteEditRequest {
    /// Attributes to apply; omit to cancel the edit
    pub input: Option<UpdatePlotInput>,
}

/// Current workflow state
pub async fn workflow_state(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.workflow.snapshot().await;
    (StatusCode::OK, Json(snapshot))
}

/// Enter drawing mode
pub async fn begin_drawing(State(state): State<AppState>) -> impl IntoResponse {
    match state.workflow.begin_drawing().await {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Re-enter drawing mode for an existing draft
pub async fn begin_redraw(
    State(state): State<AppState>,
    Json(request): Json<PlotIdRequest>,
) -> impl IntoResponse {
    match state
        .workflow
        .begin_redraw(PlotId::from(request.plot_id))
        .await
    {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// A polygon arrived from the drawing tool
pub async fn capture_geometry(
    State(state): State<AppState>,
    Json(feature): Json<DrawnFeature>,
) -> impl IntoResponse {
    match state.workflow.capture_geometry(feature).await {
        Ok(plot) => (StatusCode::CREATED, Json(plot)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Enter shapefile-import mode
pub async fn begin_import(State(state): State<AppState>) -> impl IntoResponse {
    match state.workflow.begin_import().await {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Decoded shapefile features arrived from the import collaborator
pub async fn accept_import(
    State(state): State<AppState>,
    Json(features): Json<Vec<ImportedFeature>>,
) -> impl IntoResponse {
    match state.workflow.accept_import(features).await {
        Ok(plots) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "plots": plots })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Replace the batch selection
pub async fn select_plots(
    State(state): State<AppState>,
    Json(request): Json<SelectionRequest>,
) -> impl IntoResponse {
    let ids = request.ids.into_iter().map(PlotId::from).collect();

    match state.workflow.select_plots(ids).await {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Batch apply-and-move over the current selection
pub async fn apply_to_selection(
    State(state): State<AppState>,
    Json(attrs): Json<BatchAttributes>,
) -> impl IntoResponse {
    match state.workflow.apply_to_selection(attrs).await {
        Ok(plots) => (
            StatusCode::OK,
            Json(serde_json::json!({ "plots": plots })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update one plot during configuration
pub async fn update_workflow_plot(
    State(state): State<AppState>,
    Json(request): Json<UpdatePlotRequest>,
) -> impl IntoResponse {
    match state
        .workflow
        .update_plot(&PlotId::from(request.plot_id), request.input)
        .await
    {
        Ok(plot) => (StatusCode::OK, Json(plot)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Run the estimator over the batch
pub async fn run_calculation(State(state): State<AppState>) -> impl IntoResponse {
    match state.workflow.calculate().await {
        Ok(plots) => (
            StatusCode::OK,
            Json(serde_json::json!({ "plots": plots })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Move to the pre-save summary
pub async fn confirm_batch(State(state): State<AppState>) -> impl IntoResponse {
    match state.workflow.confirm_batch().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Pull one plot back into configuration
pub async fn recall_for_edit(
    State(state): State<AppState>,
    Json(request): Json<PlotIdRequest>,
) -> impl IntoResponse {
    match state
        .workflow
        .recall_for_edit(PlotId::from(request.plot_id))
        .await
    {
        Ok(recall) => (StatusCode::OK, Json(recall)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Finish an edit recall (save or cancel)
pub async fn complete_edit(
    State(state): State<AppState>,
    Json(request): Json<CompleteEditRequest>,
) -> impl IntoResponse {
    match state.workflow.complete_edit(request.input).await {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Persist the batch
pub async fn save_all(State(state): State<AppState>) -> impl IntoResponse {
    match state.workflow.save_all().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Abort the workflow, discarding all drafts
pub async fn reset_workflow(State(state): State<AppState>) -> impl IntoResponse {
    match state.workflow.reset().await {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(e) => e.into_response(),
    }
}
