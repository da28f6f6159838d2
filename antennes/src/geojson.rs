//! GeoJSON export of the support tree.
//!
//! Enable the `geojson` feature to use this module. Each support becomes a
//! `Point` feature whose properties carry the support id and the same
//! `antennes` array as the JSON API.
//!
//! # Example
//!
//! ```ignore
//! use antennes::geojson::to_feature_collection;
//!
//! let collection = to_feature_collection(&response, Some(&bbox))?;
//! println!("{}", geojson::GeoJson::from(collection));
//! ```

use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Value as GeoJsonValue};

use crate::error::Result;
use crate::geo::BoundingBox;
use crate::model::{Support, SupportsResponse};

/// Convert supports into a GeoJSON `FeatureCollection`.
///
/// When `bbox` is given it is written as the collection's `bbox` member, in
/// GeoJSON order `[west, south, east, north]`.
///
/// # Errors
///
/// Returns an error if the antenna groups cannot be converted to JSON values.
pub fn to_feature_collection(
    response: &SupportsResponse,
    bbox: Option<&BoundingBox>,
) -> Result<FeatureCollection> {
    let features = response
        .supports
        .iter()
        .map(support_to_feature)
        .collect::<Result<Vec<_>>>()?;

    Ok(FeatureCollection {
        bbox: bbox.map(|b| vec![b.min_lon, b.min_lat, b.max_lon, b.max_lat]),
        features,
        foreign_members: None,
    })
}

/// Convert a single support into a `Point` feature (`[lon, lat]` order).
pub fn support_to_feature(support: &Support) -> Result<Feature> {
    let mut properties = JsonObject::new();
    properties.insert("supId".to_string(), support.support_id.into());
    properties.insert(
        "antennes".to_string(),
        serde_json::to_value(&support.height_groups)?,
    );

    Ok(Feature {
        bbox: None,
        geometry: Some(Geometry::new(GeoJsonValue::Point(vec![
            support.lon,
            support.lat,
        ]))),
        id: Some(Id::Number(support.support_id.into())),
        properties: Some(properties),
        foreign_members: None,
    })
}
