//! # Antennes - radio support queries
//!
//! Library for finding the radio antenna supports (masts, rooftops, towers)
//! around a point and reshaping the flat query result into a tree grouped by
//! support, mounting height and antenna.
//!
//! ## Features
//!
//! - **Geodesic bounding box**: destination-point formula on a spherical Earth
//! - **Single-pass grouping**: sorted rows become nested supports in one pass
//! - **SQLite source**: read-only queries over the ANFR site export
//! - **GeoJSON** (optional `geojson` feature): supports as point features
//!
//! ## Quick Start
//!
//! ```ignore
//! use antennes::{store::{supports_in, StoreBuilder}, BoundingBox, Point};
//!
//! let store = StoreBuilder::new("quelle-antenne.sqlite3").build().await?;
//! let bbox = BoundingBox::around(Point::new(48.8566, 2.3522), 2.0);
//! let response = supports_in(&store, &bbox).await?;
//! println!("{} supports", response.supports.len());
//! ```
//!
//! ## Output Shape
//!
//! - **Support** (`supId`, `lat`, `lon`, `antennes`)
//! - **Height group** (`haut`, `aer_ids`, `isVisible`)
//! - **Antenna** (`aer_id`, `azimut`, `operators`)
//!
//! An azimuth of `-1` marks an omnidirectional antenna on the wire.

pub mod aggregate;
pub mod error;
pub mod geo;
#[cfg(feature = "geojson")]
pub mod geojson;
pub mod model;
pub mod store;

// Re-export main types at crate root for convenience
pub use aggregate::aggregate;
pub use error::{Error, Result};
pub use geo::{destination, BoundingBox, Point, EARTH_RADIUS_KM};
pub use model::{Antenna, Azimuth, FlatRow, HeightGroup, SortedRows, Support, SupportsResponse};
pub use store::{RowSource, SqliteStore, StoreBuilder};
