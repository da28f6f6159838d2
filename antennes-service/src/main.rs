//! Antennes Service - HTTP microservice for radio support queries.
//!
//! A REST API returning the antenna supports around a point, read from the
//! ANFR SQLite export.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ANTENNES_DB_PATH` | SQLite database file | `quelle-antenne.sqlite3` |
//! | `ANTENNES_MAX_CONNECTIONS` | Connection pool size | 4 |
//! | `ANTENNES_OPERATOR_IDS` | Comma-separated operator ids | `6,137,23,240` |
//! | `ANTENNES_SYSTEM` | Emitter system `LIKE` pattern | `LTE%` |
//! | `ANTENNES_EXCLUDED_ANTENNA_TYPE` | Antenna type id to drop | 17 |
//! | `ANTENNES_PORT` | HTTP server port | 8080 |
//! | `RUST_LOG` | Log level (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `GET /supports/{lat}/{lon}/{distance}` - Supports around a point
//! - `GET /supports/{lat}/{lon}/{distance}/geojson` - Same, as GeoJSON
//! - `GET /` - Zero-size query (empty list)
//! - `GET /health` - Health check
//! - `GET /docs` - OpenAPI documentation (Swagger UI)

use std::net::SocketAddr;
use std::sync::Arc;

use antennes::StoreBuilder;
use antennes_service::{router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "antennes_service=info,antennes=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load port from environment (service-specific config)
    let port: u16 = std::env::var("ANTENNES_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    // The library handles the database and query filter variables
    let store = StoreBuilder::from_env()?.build().await?;

    tracing::info!(
        db_path = %store.db_path().display(),
        max_connections = store.max_connections(),
        operator_ids = ?store.filter().operator_ids,
        system = %store.filter().system_pattern,
        port = port,
        "Starting antennes service"
    );

    let state = Arc::new(AppState {
        source: Arc::new(store),
    });
    let app = router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
