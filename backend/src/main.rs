//! Rubber Carbon Assessment Platform - Backend Server
//!
//! Lets Thai rubber farmers and field agents register plantation plots by
//! drawing or shapefile import and estimate the carbon their trees store.

use axum::{routing::get, Router};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod external;
mod handlers;
mod routes;
mod services;
mod store;

pub use config::Config;

use external::GeocodingClient;
use services::{CarbonService, PlotService, WorkflowService};
use store::PlotStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<PlotStore>,
    pub carbon: CarbonService,
    pub workflow: Arc<WorkflowService>,
    pub geocoding: Arc<GeocodingClient>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rca_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting Rubber Carbon Assessment Server");
    tracing::info!("Environment: {}", config.environment);

    // Create application state
    let state = build_state(config);

    // Build application
    let port = state.config.server.port;
    let app = create_app(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Wire the store, services and external clients together
fn build_state(config: Config) -> AppState {
    let config = Arc::new(config);
    let store = Arc::new(PlotStore::new());
    let plots = PlotService::new(store.clone());
    let carbon = CarbonService::new(store.clone(), config.estimation.params());
    let workflow = Arc::new(WorkflowService::new(
        store.clone(),
        plots,
        carbon.clone(),
    ));
    let geocoding = Arc::new(GeocodingClient::new(&config.geocoding));

    AppState {
        config,
        store,
        carbon,
        workflow,
        geocoding,
    }
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Rubber Carbon Assessment Platform API v1.0"
}

/// Liveness endpoint
async fn health() -> &'static str {
    "OK"
}
