//! Row and tree types.
//!
//! [`FlatRow`] is what the query collaborator yields: one row per
//! operator, antenna, height and support. The nested [`SupportsResponse`] tree
//! is what the aggregator builds from them and what the HTTP API returns.
//!
//! # Wire Format
//!
//! ```json
//! {"supports": [
//!   {"supId": 1, "lat": 10.0, "lon": 20.0, "antennes": [
//!     {"haut": 100.0, "aer_ids": [
//!       {"aer_id": 100, "azimut": 90.0, "operators": ["A", "B"]}
//!     ], "isVisible": 1}
//!   ]}
//! ]}
//! ```

use std::cmp::Ordering;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::geo::Point;

/// Raw azimuth value standing for an omnidirectional antenna.
pub const OMNIDIRECTIONAL_SENTINEL: f64 = -1.0;

/// Horizontal orientation of an antenna.
///
/// Serialized as the bearing in degrees, or [`OMNIDIRECTIONAL_SENTINEL`]
/// for omnidirectional antennas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Azimuth {
    /// Main lobe pointing at the given bearing in degrees from north.
    Directional(f64),
    /// Radiates in all horizontal directions.
    Omnidirectional,
}

impl Azimuth {
    /// Interpret a raw azimuth, mapping the sentinel to [`Azimuth::Omnidirectional`].
    pub fn from_raw(value: f64) -> Self {
        if value == OMNIDIRECTIONAL_SENTINEL {
            Azimuth::Omnidirectional
        } else {
            Azimuth::Directional(value)
        }
    }

    /// The raw value as written on the wire.
    pub fn to_raw(self) -> f64 {
        match self {
            Azimuth::Directional(degrees) => degrees,
            Azimuth::Omnidirectional => OMNIDIRECTIONAL_SENTINEL,
        }
    }

    pub fn is_omnidirectional(&self) -> bool {
        matches!(self, Azimuth::Omnidirectional)
    }
}

impl Serialize for Azimuth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_raw())
    }
}

impl<'de> Deserialize<'de> for Azimuth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Azimuth::from_raw)
    }
}

/// One result row: a single operator on one antenna of one support.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    pub support_id: i64,
    pub lat: f64,
    pub lon: f64,
    pub antenna_id: i64,
    /// Height of the antenna base above ground, in meters.
    pub height: f64,
    pub azimuth: Azimuth,
    /// Operator name (e.g. "ORANGE").
    pub operator: String,
}

impl FlatRow {
    pub fn position(&self) -> Point {
        Point::new(self.lat, self.lon)
    }
}

/// Order of the grouping keys (support id, height, antenna id).
fn compare_keys(a: &FlatRow, b: &FlatRow) -> Ordering {
    a.support_id
        .cmp(&b.support_id)
        .then_with(|| a.height.total_cmp(&b.height))
        .then_with(|| a.antenna_id.cmp(&b.antenna_id))
}

/// Rows known to be ordered by (support id, height, antenna id).
///
/// The aggregator only detects group boundaries between adjacent rows, so it
/// accepts nothing but this type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortedRows(Vec<FlatRow>);

impl SortedRows {
    /// Sort `rows` by the grouping keys. The sort is stable, so operators of
    /// one antenna keep their relative order.
    pub fn sort(mut rows: Vec<FlatRow>) -> Self {
        rows.sort_by(compare_keys);
        Self(rows)
    }

    /// Accept rows that are already sorted, without reordering them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsorted`] with the index of the first row that sorts
    /// before its predecessor.
    pub fn try_from_sorted(rows: Vec<FlatRow>) -> Result<Self> {
        match rows
            .windows(2)
            .position(|pair| compare_keys(&pair[0], &pair[1]) == Ordering::Greater)
        {
            Some(index) => Err(Error::Unsorted { index: index + 1 }),
            None => Ok(Self(rows)),
        }
    }

    pub fn as_slice(&self) -> &[FlatRow] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for SortedRows {
    type Item = FlatRow;
    type IntoIter = std::vec::IntoIter<FlatRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Response body of the supports endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SupportsResponse {
    pub supports: Vec<Support>,
}

impl SupportsResponse {
    /// Total number of antenna nodes across all supports.
    pub fn antenna_count(&self) -> usize {
        self.supports
            .iter()
            .flat_map(|s| &s.height_groups)
            .map(|g| g.antennas.len())
            .sum()
    }

    /// Total number of operator entries across all antennas.
    pub fn operator_count(&self) -> usize {
        self.supports
            .iter()
            .flat_map(|s| &s.height_groups)
            .flat_map(|g| &g.antennas)
            .map(|a| a.operators.len())
            .sum()
    }
}

/// A physical support (mast, rooftop, water tower...) carrying antennas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Support {
    #[serde(rename = "supId")]
    pub support_id: i64,
    pub lat: f64,
    pub lon: f64,
    /// Antennas grouped by mounting height.
    #[serde(rename = "antennes")]
    pub height_groups: Vec<HeightGroup>,
}

impl Support {
    /// Open a support seeded with the row's height group and antenna.
    pub(crate) fn open(row: FlatRow) -> Self {
        Self {
            support_id: row.support_id,
            lat: row.lat,
            lon: row.lon,
            height_groups: vec![HeightGroup::open(row)],
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.lat, self.lon)
    }
}

/// Antennas of a support mounted at the same height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HeightGroup {
    #[serde(rename = "haut")]
    pub height: f64,
    #[serde(rename = "aer_ids")]
    pub antennas: Vec<Antenna>,
    /// Line-of-sight flag for clients. Always set when built, sent as `1`/`0`.
    #[serde(
        rename = "isVisible",
        serialize_with = "bool_as_int",
        deserialize_with = "int_as_bool"
    )]
    #[cfg_attr(feature = "openapi", schema(value_type = u8))]
    pub visible: bool,
}

impl HeightGroup {
    pub(crate) fn open(row: FlatRow) -> Self {
        Self {
            height: row.height,
            antennas: vec![Antenna::open(row)],
            visible: true,
        }
    }
}

/// A single antenna and the operators broadcasting through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Antenna {
    #[serde(rename = "aer_id")]
    pub antenna_id: i64,
    #[serde(rename = "azimut")]
    #[cfg_attr(feature = "openapi", schema(value_type = f64))]
    pub azimuth: Azimuth,
    pub operators: Vec<String>,
}

impl Antenna {
    pub(crate) fn open(row: FlatRow) -> Self {
        Self {
            antenna_id: row.antenna_id,
            azimuth: row.azimuth,
            operators: vec![row.operator],
        }
    }
}

fn bool_as_int<S: Serializer>(value: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

fn int_as_bool<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    u8::deserialize(deserializer).map(|v| v != 0)
}
