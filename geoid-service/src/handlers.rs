//! HTTP request handlers for the geoid height service.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use geoid::{
    geojson::{add_heights_to_geometry, try_for_each_position},
    Interpolation,
};
use geojson::{Geometry, Value as GeoJsonValue};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::AppState;

/// Query parameters for the height endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HeightQuery {
    /// Latitude in decimal degrees (-90 to 90).
    pub lat: f64,
    /// Longitude in decimal degrees, any range.
    pub lon: f64,
    /// Interpolation method (`linear` or `cubic`). Defaults to the service setting.
    #[param(value_type = Option<String>)]
    pub method: Option<Interpolation>,
}

/// Query parameters for the GeoJSON endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MethodQuery {
    /// Interpolation method (`linear` or `cubic`). Defaults to the service setting.
    #[param(value_type = Option<String>)]
    pub method: Option<Interpolation>,
}

/// Successful height response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HeightResponse {
    /// Geoid height in meters above the ellipsoid.
    pub height: f64,
    /// Latitude queried.
    pub lat: f64,
    /// Longitude queried.
    pub lon: f64,
    /// Interpolation method used.
    #[schema(value_type = String, example = "linear")]
    pub method: Interpolation,
}

/// Error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Loaded grid description.
#[derive(Debug, Serialize, ToSchema)]
pub struct InfoResponse {
    /// File the grid was loaded from.
    pub path: Option<String>,
    /// Samples per row.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    /// Columns per degree of longitude.
    pub lon_resolution: f64,
    /// Rows per degree of latitude.
    pub lat_resolution: f64,
    /// Additive term of the sample transform, in meters.
    pub offset: f64,
    /// Multiplicative term of the sample transform, in meters.
    pub scale: f64,
    /// Smallest raw sample.
    pub min_raw: u16,
    /// Largest raw sample.
    pub max_raw: u16,
    /// Lowest geoid height in the grid.
    pub min_height: f64,
    /// Highest geoid height in the grid.
    pub max_height: f64,
    /// Interpolation used when a request does not name one.
    pub default_method: String,
}

/// Get geoid height for given coordinates.
///
/// # Returns
///
/// - `200 OK` with the height on success
/// - `400 Bad Request` if coordinates are invalid or missing
#[utoipa::path(
    get,
    path = "/height",
    params(HeightQuery),
    responses(
        (status = 200, description = "Geoid height at the coordinate", body = HeightResponse),
        (status = 400, description = "Invalid coordinates", body = ErrorResponse)
    ),
    tag = "height"
)]
#[axum::debug_handler]
pub async fn get_height(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HeightQuery>,
) -> impl IntoResponse {
    let method = query.method.unwrap_or(state.default_method);

    tracing::debug!(
        lat = query.lat,
        lon = query.lon,
        method = %method,
        "Height query"
    );

    if let Err(message) = validate_coordinate(query.lat, query.lon) {
        return error_response(message);
    }

    let height = state.grid.height_at(query.lat, query.lon, method);

    (
        StatusCode::OK,
        Json(HeightResponse {
            height,
            lat: query.lat,
            lon: query.lon,
            method,
        }),
    )
        .into_response()
}

/// Add geoid heights to every position of a GeoJSON geometry.
///
/// Positions are `[lon, lat]` or `[lon, lat, alt]`; the response carries the
/// geoid height as the third element of each position.
#[utoipa::path(
    post,
    path = "/height",
    params(MethodQuery),
    request_body(
        content = Object,
        description = "GeoJSON geometry",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Geometry with geoid heights", body = Object),
        (status = 400, description = "Invalid coordinates", body = ErrorResponse)
    ),
    tag = "height"
)]
pub async fn post_height(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MethodQuery>,
    Json(geometry): Json<Geometry>,
) -> impl IntoResponse {
    let method = query.method.unwrap_or(state.default_method);

    tracing::debug!(method = %method, "GeoJSON height query");

    if let Err(message) = validate_geometry(&geometry.value) {
        return error_response(message);
    }

    match add_heights_to_geometry(&state.grid, geometry, method) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => error_response(e.to_string()),
    }
}

/// Health check endpoint.
///
/// Returns service status and version.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse)),
    tag = "system"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Describe the loaded grid.
#[utoipa::path(
    get,
    path = "/info",
    responses((status = 200, description = "Grid metadata", body = InfoResponse)),
    tag = "system"
)]
pub async fn get_info(State(state): State<Arc<AppState>>) -> Json<InfoResponse> {
    let grid = &state.grid;

    Json(InfoResponse {
        path: grid.source().map(|p| p.display().to_string()),
        width: grid.width(),
        height: grid.height(),
        lon_resolution: grid.lon_resolution(),
        lat_resolution: grid.lat_resolution(),
        offset: grid.offset(),
        scale: grid.scale(),
        min_raw: state.summary.min_raw,
        max_raw: state.summary.max_raw,
        min_height: state.summary.min_height,
        max_height: state.summary.max_height,
        default_method: state.default_method.to_string(),
    })
}

/// Check a coordinate before it reaches the sampler.
fn validate_coordinate(lat: f64, lon: f64) -> Result<(), String> {
    if !lat.is_finite() || !lon.is_finite() {
        return Err(format!(
            "Coordinates must be finite (lat={}, lon={})",
            lat, lon
        ));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!(
            "Latitude {} out of bounds (must be between -90 and 90)",
            lat
        ));
    }
    Ok(())
}

fn validate_position(coord: &[f64]) -> Result<(), String> {
    match coord {
        [lon, lat, ..] => validate_coordinate(*lat, *lon),
        _ => Err("Coordinate must have at least 2 elements (lon, lat)".to_string()),
    }
}

fn validate_geometry(value: &GeoJsonValue) -> Result<(), String> {
    try_for_each_position(value, &mut validate_position)
}

/// Create a `400 Bad Request` error response.
fn error_response(message: String) -> axum::response::Response {
    tracing::warn!(error = %message, "Height query failed");

    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse { error: message }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_query_deserialize() {
        let json = r#"{"lat": 35.5, "lon": 138.7, "method": "cubic"}"#;
        let query: HeightQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.lat, 35.5);
        assert_eq!(query.lon, 138.7);
        assert_eq!(query.method, Some(Interpolation::Cubic));

        let json = r#"{"lat": 35.5, "lon": 138.7}"#;
        let query: HeightQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.method, None);
    }

    #[test]
    fn test_height_response_serialize() {
        let response = HeightResponse {
            height: 41.25,
            lat: 35.5,
            lon: 138.7,
            method: Interpolation::Linear,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("41.25"));
        assert!(json.contains(r#""method":"linear""#));
    }

    #[test]
    fn test_validate_coordinate() {
        assert!(validate_coordinate(90.0, 0.0).is_ok());
        assert!(validate_coordinate(-90.0, -540.0).is_ok());
        assert!(validate_coordinate(90.5, 0.0)
            .unwrap_err()
            .contains("out of bounds"));
        assert!(validate_coordinate(f64::NAN, 0.0).is_err());
        assert!(validate_coordinate(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_geometry_recurses() {
        let geometry = GeoJsonValue::GeometryCollection(vec![
            Geometry::new(GeoJsonValue::Point(vec![10.0, 20.0])),
            Geometry::new(GeoJsonValue::Polygon(vec![vec![
                vec![0.0, 0.0],
                vec![1.0, 95.0],
                vec![0.0, 0.0],
            ]])),
        ]);
        assert!(validate_geometry(&geometry).is_err());

        assert!(validate_geometry(&GeoJsonValue::Point(vec![10.0])).is_err());
        assert!(validate_geometry(&GeoJsonValue::MultiPolygon(vec![vec![vec![
            vec![0.0, 0.0],
            vec![1.0, 1.0, 500.0],
        ]]]))
        .is_ok());
    }
}
