//! HTTP request handlers for the supports service.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use antennes::{store::supports_in, BoundingBox, Point, SupportsResponse};

use crate::AppState;

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

/// Supports of the zero-size box at (0, 0).
///
/// Kept for compatibility with clients probing the root URL; the strict box
/// bounds make it return an empty list on real data.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Empty support list", body = SupportsResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "supports"
)]
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let bbox = BoundingBox::degenerate();
    match supports_in(state.source.as_ref(), &bbox).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response(&bbox, e),
    }
}

/// Get the supports around a center point.
///
/// The search area is the box whose corners lie `distance` km away from the
/// center at bearings 315° and 135°.
///
/// # Returns
///
/// - `200 OK` with `{"supports": [...]}`
/// - `400 Bad Request` if a path segment is not a number
/// - `500 Internal Server Error` if the data holds malformed values
/// - `503 Service Unavailable` if the database cannot be queried
#[utoipa::path(
    get,
    path = "/supports/{lat}/{lon}/{distance}",
    params(
        ("lat" = f64, Path, description = "Center latitude in decimal degrees"),
        ("lon" = f64, Path, description = "Center longitude in decimal degrees"),
        ("distance" = f64, Path, description = "Search distance in kilometers")
    ),
    responses(
        (status = 200, description = "Supports grouped by height and antenna", body = SupportsResponse),
        (status = 400, description = "Invalid path parameter"),
        (status = 500, description = "Malformed data", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "supports"
)]
pub async fn get_supports(
    State(state): State<Arc<AppState>>,
    Path((lat, lon, distance)): Path<(f64, f64, f64)>,
) -> impl IntoResponse {
    let center = Point::new(lat, lon);
    let bbox = BoundingBox::around(center, distance);

    match query_supports(&state, center, distance, &bbox).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response(&bbox, e),
    }
}

/// Get the supports around a center point as a GeoJSON `FeatureCollection`.
#[utoipa::path(
    get,
    path = "/supports/{lat}/{lon}/{distance}/geojson",
    params(
        ("lat" = f64, Path, description = "Center latitude in decimal degrees"),
        ("lon" = f64, Path, description = "Center longitude in decimal degrees"),
        ("distance" = f64, Path, description = "Search distance in kilometers")
    ),
    responses(
        (status = 200, description = "One Point feature per support"),
        (status = 400, description = "Invalid path parameter"),
        (status = 500, description = "Malformed data", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "supports"
)]
pub async fn get_supports_geojson(
    State(state): State<Arc<AppState>>,
    Path((lat, lon, distance)): Path<(f64, f64, f64)>,
) -> impl IntoResponse {
    let center = Point::new(lat, lon);
    let bbox = BoundingBox::around(center, distance);

    let collection = query_supports(&state, center, distance, &bbox)
        .await
        .and_then(|response| antennes::geojson::to_feature_collection(&response, Some(&bbox)));

    match collection {
        Ok(collection) => (StatusCode::OK, Json(collection)).into_response(),
        Err(e) => error_response(&bbox, e),
    }
}

async fn query_supports(
    state: &AppState,
    center: Point,
    distance: f64,
    bbox: &BoundingBox,
) -> antennes::Result<SupportsResponse> {
    tracing::debug!(
        upper_left_lat = bbox.max_lat,
        upper_left_lon = bbox.min_lon,
        bottom_right_lat = bbox.min_lat,
        bottom_right_lon = bbox.max_lon,
        "Bounding box"
    );

    let response = supports_in(state.source.as_ref(), bbox).await?;

    tracing::info!(
        lat = center.lat,
        lon = center.lon,
        distance = distance,
        supports = response.supports.len(),
        antennas = response.antenna_count(),
        "Supports found"
    );

    Ok(response)
}

/// Create an error response for support queries.
fn error_response(bbox: &BoundingBox, e: antennes::Error) -> axum::response::Response {
    let status = if e.is_unavailable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    tracing::warn!(bbox = ?bbox, error = %e, "Supports query failed");

    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
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
