//! Geoid Service Library
//!
//! HTTP handlers, configuration and routing for the geoid height service.
//! This library is used by both the geoid-service binary and integration tests.

pub mod config;
pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use geoid::{GeoidGrid, GridSummary, Interpolation};
use utoipa::OpenApi;

/// Application state shared across handlers.
pub struct AppState {
    /// The loaded geoid grid.
    pub grid: GeoidGrid,
    /// Interpolation used when a request does not name one.
    pub default_method: Interpolation,
    /// Sample extremes, computed once at startup.
    pub summary: GridSummary,
}

impl AppState {
    pub fn new(grid: GeoidGrid, default_method: Interpolation) -> Self {
        let summary = grid.summary();
        Self {
            grid,
            default_method,
            summary,
        }
    }
}

/// OpenAPI documentation for the geoid service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Geoid Height Service",
        version = "0.1.0",
        description = "REST API for querying geoid undulation from GeographicLib PGM grids.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        handlers::get_height,
        handlers::post_height,
        handlers::health_check,
        handlers::get_info,
    ),
    components(
        schemas(
            handlers::HeightResponse,
            handlers::ErrorResponse,
            handlers::HealthResponse,
            handlers::InfoResponse,
        )
    ),
    tags(
        (name = "height", description = "Geoid height query endpoints"),
        (name = "system", description = "System and health endpoints")
    )
)]
pub struct ApiDoc;

/// Routes for every endpoint, without middleware or docs.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/height",
            get(handlers::get_height).post(handlers::post_height),
        )
        .route("/health", get(handlers::health_check))
        .route("/info", get(handlers::get_info))
        .with_state(state)
}

// Re-export commonly used types for convenience
pub use config::ServiceConfig;
pub use handlers::{ErrorResponse, HealthResponse, HeightQuery, HeightResponse, InfoResponse};
