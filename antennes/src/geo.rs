//! Spherical geodesy helpers.
//!
//! This module provides the destination-point formula used to derive the
//! search [`BoundingBox`] around a center.
//!
//! # Earth Model
//!
//! A sphere of radius [`EARTH_RADIUS_KM`] (mean equatorial radius). Longitudes
//! are never normalized: a box crossing the antimeridian has `max_lon > 180`.

use serde::{Deserialize, Serialize};

/// Equatorial radius of the Earth in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6378.1;

/// Bearing of the upper-left (north-west) corner of a search box.
pub const UPPER_LEFT_BEARING: f64 = 315.0;

/// Bearing of the bottom-right (south-east) corner of a search box.
pub const BOTTOM_RIGHT_BEARING: f64 = 135.0;

/// A point on the sphere in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Point {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Compute the point located at `distance_km` and `bearing_deg` from `origin`.
///
/// # Arguments
///
/// * `origin` - Starting point
/// * `distance_km` - Distance to travel along the great circle, in kilometers
/// * `bearing_deg` - Initial bearing in degrees clockwise from geographic north
///
/// No input validation is performed and the resulting longitude is not
/// wrapped into `[-180, 180]`.
///
/// # Examples
///
/// ```
/// use antennes::geo::{destination, Point};
///
/// let origin = Point::new(48.8, 2.3);
/// let north = destination(origin, 10.0, 0.0);
/// assert!(north.lat > origin.lat);
/// assert!((north.lon - origin.lon).abs() < 1e-9);
/// ```
pub fn destination(origin: Point, distance_km: f64, bearing_deg: f64) -> Point {
    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lon.to_radians();
    let bearing = bearing_deg.to_radians();
    let angular = distance_km / EARTH_RADIUS_KM;

    let lat2 =
        (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat2.sin());

    Point::new(lat2.to_degrees(), lon2.to_degrees())
}

/// A geographic bounding box used to query supports.
///
/// Coordinates are in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BoundingBox {
    /// Minimum latitude (southern boundary).
    pub min_lat: f64,
    /// Minimum longitude (western boundary).
    pub min_lon: f64,
    /// Maximum latitude (northern boundary).
    pub max_lat: f64,
    /// Maximum longitude (eastern boundary).
    pub max_lon: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    ///
    /// # Arguments
    ///
    /// * `min_lat` - Southern boundary latitude
    /// * `min_lon` - Western boundary longitude
    /// * `max_lat` - Northern boundary latitude
    /// * `max_lon` - Eastern boundary longitude
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// Build the box whose corners lie `distance_km` away from `center`
    /// at bearings 315° (upper-left) and 135° (bottom-right).
    ///
    /// # Examples
    ///
    /// ```
    /// use antennes::geo::{BoundingBox, Point};
    ///
    /// let center = Point::new(48.8, 2.3);
    /// let bbox = BoundingBox::around(center, 5.0);
    /// assert!(bbox.min_lat < center.lat && center.lat < bbox.max_lat);
    /// assert!(bbox.min_lon < center.lon && center.lon < bbox.max_lon);
    /// ```
    pub fn around(center: Point, distance_km: f64) -> Self {
        let upper_left = destination(center, distance_km, UPPER_LEFT_BEARING);
        let bottom_right = destination(center, distance_km, BOTTOM_RIGHT_BEARING);

        Self {
            min_lat: bottom_right.lat,
            min_lon: upper_left.lon,
            max_lat: upper_left.lat,
            max_lon: bottom_right.lon,
        }
    }

    /// The zero-size box at (0, 0). Strict bounds make it match nothing.
    pub fn degenerate() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// North-west corner.
    pub fn upper_left(&self) -> Point {
        Point::new(self.max_lat, self.min_lon)
    }

    /// South-east corner.
    pub fn bottom_right(&self) -> Point {
        Point::new(self.min_lat, self.max_lon)
    }

    /// Whether `point` lies strictly inside the box, with the same strict
    /// comparisons the database query applies.
    pub fn contains(&self, point: Point) -> bool {
        point.lat < self.max_lat
            && point.lat > self.min_lat
            && point.lon > self.min_lon
            && point.lon < self.max_lon
    }
}
