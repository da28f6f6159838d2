//! Error types for the antennes library.

use thiserror::Error;

/// Errors that can occur when querying and grouping support data.
#[derive(Error, Debug)]
pub enum Error {
    /// The underlying SQLite database could not be reached or queried.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A numeric column held a value that is not a decimal number.
    #[error("Malformed {field} value: {value:?}")]
    MalformedField { field: &'static str, value: String },

    /// Rows were not ordered by (support id, height, antenna id).
    #[error("Rows are not sorted by (support, height, antenna) at index {index}")]
    Unsorted { index: usize },

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON conversion failed while building GeoJSON properties.
    #[cfg(feature = "geojson")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the failure comes from the data source rather than the data itself.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::Database(_))
    }
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
