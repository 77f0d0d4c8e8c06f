//! Route definitions for the Rubber Carbon Assessment Platform

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Plot management
        .nest("/plots", plot_routes())
        // Carbon estimation
        .nest("/carbon", carbon_routes())
        // Workflow state machine
        .nest("/workflow", workflow_routes())
        // Geocoding
        .route("/geocoding/search", get(handlers::search_place))
}

/// Plot management routes
fn plot_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_plots).post(handlers::create_plot))
        .route("/import", post(handlers::import_plots))
        .route(
            "/:plot_id",
            get(handlers::get_plot)
                .put(handlers::update_plot)
                .delete(handlers::delete_plot),
        )
}

/// Carbon estimation routes
fn carbon_routes() -> Router<AppState> {
    Router::new()
        .route("/calculate", post(handlers::calculate_carbon))
        .route("/bulk", post(handlers::bulk_calculate))
        .route("/summary", get(handlers::carbon_summary))
        .route("/plots/:plot_id", get(handlers::estimate_plot))
}

/// Workflow routes: one endpoint per transition
fn workflow_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::workflow_state))
        .route("/drawing", post(handlers::begin_drawing))
        .route("/drawing/redraw", post(handlers::begin_redraw))
        .route("/drawing/capture", post(handlers::capture_geometry))
        .route("/import", post(handlers::begin_import))
        .route("/import/accept", post(handlers::accept_import))
        .route("/selection", put(handlers::select_plots))
        .route("/selection/apply", post(handlers::apply_to_selection))
        .route("/plots", put(handlers::update_workflow_plot))
        .route("/calculate", post(handlers::run_calculation))
        .route("/confirm", post(handlers::confirm_batch))
        .route("/edit/recall", post(handlers::recall_for_edit))
        .route("/edit/complete", post(handlers::complete_edit))
        .route("/save", post(handlers::save_all))
        .route("/reset", post(handlers::reset_workflow))
}
