//! Geoid Service - HTTP microservice for geoid height queries.
//!
//! A REST API over a memory-mapped GeographicLib geoid grid.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `GEOID_PATH` | `:`-separated candidate .pgm files | GeographicLib install dirs |
//! | `GEOID_PORT` | HTTP server port | 8080 |
//! | `GEOID_METHOD` | Default interpolation: "linear" or "cubic" | "linear" |
//! | `RUST_LOG` | Log level (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `GET /height?lat=X&lon=Y[&method=cubic]` - Get geoid height at coordinates
//! - `POST /height[?method=cubic]` - Add geoid heights to a GeoJSON geometry
//! - `GET /health` - Health check
//! - `GET /info` - Loaded grid metadata
//! - `GET /docs` - OpenAPI documentation (Swagger UI)

use std::net::SocketAddr;
use std::sync::Arc;

use geoid::GeoidGrid;
use geoid_service::{router, ApiDoc, AppState, ServiceConfig};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geoid_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::from_env();

    let grid = GeoidGrid::load(&config.geoid_paths)?;

    tracing::info!(
        path = ?grid.source(),
        width = grid.width(),
        height = grid.height(),
        default_method = %config.default_method,
        port = config.port,
        "Starting geoid service"
    );

    let state = Arc::new(AppState::new(grid, config.default_method));

    // Build router
    let app = router(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
