//! Antennes Service Library
//!
//! HTTP handlers, router and OpenAPI document for the supports service.
//! This library is used by both the antennes-service binary and integration tests.

pub mod handlers;

use std::sync::Arc;

use antennes::RowSource;
use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across handlers.
pub struct AppState {
    /// Query collaborator returning the rows of a bounding box.
    pub source: Arc<dyn RowSource>,
}

/// OpenAPI documentation for the supports service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Antennes Service",
        version = "0.1.0",
        description = "Radio antenna supports around a point, grouped by height and antenna.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        handlers::root,
        handlers::get_supports,
        handlers::get_supports_geojson,
        handlers::health_check,
    ),
    components(
        schemas(
            antennes::SupportsResponse,
            antennes::Support,
            antennes::HeightGroup,
            antennes::Antenna,
            handlers::ErrorResponse,
            handlers::HealthResponse,
        )
    ),
    tags(
        (name = "supports", description = "Support query endpoints"),
        (name = "system", description = "System and health endpoints")
    )
)]
pub struct ApiDoc;

/// Build the application router with tracing and permissive CORS.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(handlers::root))
        .route(
            "/supports/:lat/:lon/:distance",
            get(handlers::get_supports),
        )
        .route(
            "/supports/:lat/:lon/:distance/geojson",
            get(handlers::get_supports_geojson),
        )
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

// Re-export commonly used types for convenience
pub use handlers::{ErrorResponse, HealthResponse};
