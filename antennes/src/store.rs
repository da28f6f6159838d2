//! Query collaborator over the ANFR SQLite export.
//!
//! This module provides the [`RowSource`] trait consumed by the service and
//! [`SqliteStore`], its implementation backed by a read-only SQLite pool.
//!
//! # Schema
//!
//! The database follows the public ANFR "cartoradio" tables:
//!
//! - `SUP_SUPPORT` - one row per (support, station) with coordinates
//! - `SUP_STATION` / `SUP_EXPLOITANT` - station operator
//! - `SUP_ANTENNE` - antennas with height (`AER_NB_ALT_BAS`) and azimuth
//!   (`AER_NB_AZIMUT`), both stored as text with a decimal comma
//! - `SUP_EMETTEUR` - emitters with their radio system (e.g. "LTE 800")
//! - `SUP_TYPE_ANTENNE` - antenna types
//!
//! # Example
//!
//! ```ignore
//! use antennes::{store::StoreBuilder, BoundingBox, Point};
//!
//! let store = StoreBuilder::new("quelle-antenne.sqlite3").build().await?;
//! let bbox = BoundingBox::around(Point::new(48.8, 2.3), 5.0);
//! let response = antennes::store::supports_in(&store, &bbox).await?;
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;

use crate::aggregate::aggregate;
use crate::error::{Error, Result};
use crate::geo::BoundingBox;
use crate::model::{Azimuth, FlatRow, SortedRows, SupportsResponse};

/// Database file used when none is configured.
pub const DEFAULT_DB_PATH: &str = "quelle-antenne.sqlite3";

/// Default size of the connection pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 4;

/// Source of flat rows for a bounding box.
///
/// Implementations must only return rows strictly inside `bbox` with the
/// azimuth already mapped to [`Azimuth`].
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Fetch the rows of every support inside `bbox`.
    async fn fetch_rows(&self, bbox: &BoundingBox) -> Result<Vec<FlatRow>>;
}

/// Fetch the rows inside `bbox` from `source` and group them into supports.
///
/// Rows are sorted by (support, height, antenna) before grouping, so a group
/// split by the source ordering ends up as a single node.
pub async fn supports_in(source: &dyn RowSource, bbox: &BoundingBox) -> Result<SupportsResponse> {
    let rows = source.fetch_rows(bbox).await?;
    Ok(aggregate(SortedRows::sort(rows)))
}

/// Which sites the query keeps.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFilter {
    /// Operator ids (`ADM_ID`) kept. Defaults to the four national mobile operators.
    pub operator_ids: Vec<i64>,
    /// `LIKE` pattern on the emitter system.
    pub system_pattern: String,
    /// Antenna type (`TAE_ID`) dropped. Type 17 is the parabolic relay link.
    pub excluded_antenna_type: i64,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            operator_ids: vec![6, 137, 23, 240],
            system_pattern: "LTE%".to_string(),
            excluded_antenna_type: 17,
        }
    }
}

impl QueryFilter {
    fn sql(&self) -> String {
        let placeholders = vec!["?"; self.operator_ids.len()].join(", ");
        format!(
            "
            SELECT DISTINCT
                CAST(sup.SUP_ID AS INTEGER) AS support_id,
                CAST(sup.LAT AS REAL) AS lat,
                CAST(sup.LON AS REAL) AS lon,
                CAST(ant.AER_ID AS INTEGER) AS antenna_id,
                CAST(ant.AER_NB_ALT_BAS AS TEXT) AS height,
                COALESCE(CAST(ant.AER_NB_AZIMUT AS TEXT), '') AS azimuth,
                ex.ADM_LB_NOM AS operator
            FROM
                SUP_SUPPORT sup
                INNER JOIN SUP_STATION sta ON sta.STA_NM_ANFR = sup.STA_NM_ANFR
                INNER JOIN SUP_EXPLOITANT ex ON ex.ADM_ID = sta.ADM_ID
                INNER JOIN SUP_ANTENNE ant ON ant.STA_NM_ANFR = sup.STA_NM_ANFR
                INNER JOIN SUP_EMETTEUR em ON em.STA_NM_ANFR = sup.STA_NM_ANFR
                INNER JOIN SUP_TYPE_ANTENNE t ON t.TAE_ID = ant.TAE_ID
            WHERE
                sup.LAT < ? AND sup.LAT > ? AND sup.LON > ? AND sup.LON < ?
                AND ex.ADM_ID IN ({placeholders})
                AND em.EMR_LB_SYSTEME LIKE ?
                AND t.TAE_ID <> ?
                AND ant.AER_NB_ALT_BAS >= 0
            ORDER BY
                sup.SUP_ID, ant.AER_NB_ALT_BAS, ant.AER_ID;
            "
        )
    }
}

/// A row as stored, before decimal parsing.
#[derive(Debug, Clone, FromRow)]
struct SupportRecord {
    support_id: i64,
    lat: f64,
    lon: f64,
    antenna_id: i64,
    height: String,
    azimuth: String,
    operator: String,
}

impl TryFrom<SupportRecord> for FlatRow {
    type Error = Error;

    fn try_from(record: SupportRecord) -> Result<Self> {
        Ok(FlatRow {
            support_id: record.support_id,
            lat: record.lat,
            lon: record.lon,
            antenna_id: record.antenna_id,
            height: parse_decimal("height", &record.height)?,
            azimuth: parse_azimuth(&record.azimuth)?,
            operator: record.operator,
        })
    }
}

/// Parse a number written with either a decimal comma or a decimal point.
///
/// # Examples
///
/// ```
/// use antennes::store::parse_decimal;
///
/// assert_eq!(parse_decimal("height", "12,5").unwrap(), 12.5);
/// assert_eq!(parse_decimal("height", "30").unwrap(), 30.0);
/// assert!(parse_decimal("height", "n/a").is_err());
/// ```
pub fn parse_decimal(field: &'static str, value: &str) -> Result<f64> {
    value
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| Error::MalformedField {
            field,
            value: value.to_string(),
        })
}

/// Parse an azimuth column. An empty value means the antenna is omnidirectional.
pub fn parse_azimuth(value: &str) -> Result<Azimuth> {
    if value.trim().is_empty() {
        Ok(Azimuth::Omnidirectional)
    } else {
        parse_decimal("azimuth", value).map(Azimuth::from_raw)
    }
}

/// Read-only SQLite [`RowSource`].
pub struct SqliteStore {
    pool: SqlitePool,
    db_path: PathBuf,
    filter: QueryFilter,
}

impl SqliteStore {
    /// Create a store over an existing pool.
    pub fn from_pool<P: AsRef<Path>>(pool: SqlitePool, db_path: P, filter: QueryFilter) -> Self {
        Self {
            pool,
            db_path: db_path.as_ref().to_path_buf(),
            filter,
        }
    }

    /// Create a builder for the given database file.
    pub fn builder<P: AsRef<Path>>(db_path: P) -> StoreBuilder {
        StoreBuilder::new(db_path)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn filter(&self) -> &QueryFilter {
        &self.filter
    }

    /// Maximum number of pooled connections.
    pub fn max_connections(&self) -> u32 {
        self.pool.options().get_max_connections()
    }
}

#[async_trait]
impl RowSource for SqliteStore {
    async fn fetch_rows(&self, bbox: &BoundingBox) -> Result<Vec<FlatRow>> {
        let sql = self.filter.sql();

        let mut query = sqlx::query_as::<_, SupportRecord>(&sql)
            .bind(bbox.max_lat)
            .bind(bbox.min_lat)
            .bind(bbox.min_lon)
            .bind(bbox.max_lon);
        for operator_id in &self.filter.operator_ids {
            query = query.bind(*operator_id);
        }
        let records = query
            .bind(self.filter.system_pattern.as_str())
            .bind(self.filter.excluded_antenna_type)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(rows = records.len(), "Support rows fetched");

        records.into_iter().map(FlatRow::try_from).collect()
    }
}

/// Builder for [`SqliteStore`].
///
/// # Example
///
/// ```ignore
/// use antennes::store::StoreBuilder;
///
/// let store = StoreBuilder::new("/data/quelle-antenne.sqlite3")
///     .max_connections(8)
///     .system_pattern("5G%")
///     .build()
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct StoreBuilder {
    db_path: PathBuf,
    max_connections: u32,
    filter: QueryFilter,
}

impl StoreBuilder {
    /// Create a new builder with the specified database file.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            filter: QueryFilter::default(),
        }
    }

    /// Create a builder configured from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `ANTENNES_DB_PATH` | SQLite database file | `quelle-antenne.sqlite3` |
    /// | `ANTENNES_MAX_CONNECTIONS` | Connection pool size | 4 |
    /// | `ANTENNES_OPERATOR_IDS` | Comma-separated operator ids | `6,137,23,240` |
    /// | `ANTENNES_SYSTEM` | Emitter system `LIKE` pattern | `LTE%` |
    /// | `ANTENNES_EXCLUDED_ANTENNA_TYPE` | Antenna type id to drop | 17 |
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `ANTENNES_OPERATOR_IDS` is set but is not a
    /// list of integers.
    pub fn from_env() -> Result<Self> {
        let db_path = std::env::var("ANTENNES_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.into());

        let max_connections: u32 = std::env::var("ANTENNES_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let mut filter = QueryFilter::default();
        if let Ok(ids) = std::env::var("ANTENNES_OPERATOR_IDS") {
            filter.operator_ids = parse_operator_ids(&ids)?;
        }
        if let Ok(pattern) = std::env::var("ANTENNES_SYSTEM") {
            filter.system_pattern = pattern;
        }
        if let Some(excluded) = std::env::var("ANTENNES_EXCLUDED_ANTENNA_TYPE")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            filter.excluded_antenna_type = excluded;
        }

        Ok(Self {
            db_path: PathBuf::from(db_path),
            max_connections,
            filter,
        })
    }

    /// Set the database file.
    pub fn db_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.db_path = path.as_ref().to_path_buf();
        self
    }

    /// Set the connection pool size.
    ///
    /// Default is 4 connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the operator ids kept by the query.
    pub fn operator_ids(mut self, ids: Vec<i64>) -> Self {
        self.filter.operator_ids = ids;
        self
    }

    /// Set the emitter system `LIKE` pattern.
    pub fn system_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.filter.system_pattern = pattern.into();
        self
    }

    /// Set the antenna type dropped by the query.
    pub fn excluded_antenna_type(mut self, type_id: i64) -> Self {
        self.filter.excluded_antenna_type = type_id;
        self
    }

    /// Open the database and build the [`SqliteStore`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty operator list and
    /// [`Error::Database`] if the file cannot be opened.
    pub async fn build(self) -> Result<SqliteStore> {
        if self.filter.operator_ids.is_empty() {
            return Err(Error::Config("at least one operator id is required".into()));
        }

        let options = SqliteConnectOptions::new()
            .filename(&self.db_path)
            .read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .connect_with(options)
            .await?;

        Ok(SqliteStore::from_pool(pool, self.db_path, self.filter))
    }
}

/// Parse a comma-separated list of operator ids.
fn parse_operator_ids(value: &str) -> Result<Vec<i64>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|_| Error::Config(format!("invalid operator id {s:?}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Point;
    use tempfile::TempDir;

    const SCHEMA: &[&str] = &[
        "CREATE TABLE SUP_SUPPORT (SUP_ID INTEGER, STA_NM_ANFR TEXT, LAT REAL, LON REAL)",
        "CREATE TABLE SUP_STATION (STA_NM_ANFR TEXT, ADM_ID INTEGER)",
        "CREATE TABLE SUP_EXPLOITANT (ADM_ID INTEGER, ADM_LB_NOM TEXT)",
        "CREATE TABLE SUP_ANTENNE (STA_NM_ANFR TEXT, AER_ID INTEGER, TAE_ID INTEGER, AER_NB_ALT_BAS TEXT, AER_NB_AZIMUT TEXT)",
        "CREATE TABLE SUP_EMETTEUR (STA_NM_ANFR TEXT, EMR_LB_SYSTEME TEXT)",
        "CREATE TABLE SUP_TYPE_ANTENNE (TAE_ID INTEGER)",
    ];

    const FIXTURE: &[&str] = &[
        "INSERT INTO SUP_EXPLOITANT VALUES (6, 'ORANGE'), (23, 'SFR'), (240, 'FREE MOBILE'), (999, 'PRIVATE NET')",
        "INSERT INTO SUP_TYPE_ANTENNE VALUES (1), (17)",
        // Support 1: two stations, heights written with a decimal comma
        "INSERT INTO SUP_SUPPORT VALUES (1, 'S1', 48.80, 2.30), (1, 'S2', 48.80, 2.30)",
        "INSERT INTO SUP_STATION VALUES ('S1', 6), ('S2', 23)",
        "INSERT INTO SUP_ANTENNE VALUES ('S1', 100, 1, '30,5', '120'), ('S1', 101, 1, '30,5', ''), ('S1', 102, 1, '12', '240'), ('S2', 200, 1, '30,5', '120')",
        "INSERT INTO SUP_EMETTEUR VALUES ('S1', 'LTE 800'), ('S1', 'LTE 2600'), ('S2', 'LTE 1800')",
        // Support 2
        "INSERT INTO SUP_SUPPORT VALUES (2, 'S3', 48.81, 2.31)",
        "INSERT INTO SUP_STATION VALUES ('S3', 240)",
        "INSERT INTO SUP_ANTENNE VALUES ('S3', 300, 1, '25', '0')",
        "INSERT INTO SUP_EMETTEUR VALUES ('S3', 'LTE 700')",
        // Filtered out: unknown operator, non-LTE, parabolic link, outside the box
        "INSERT INTO SUP_SUPPORT VALUES (3, 'S4', 48.80, 2.30), (4, 'S5', 48.80, 2.30), (5, 'S6', 48.80, 2.30), (6, 'S7', 45.0, 5.0)",
        "INSERT INTO SUP_STATION VALUES ('S4', 999), ('S5', 6), ('S6', 6), ('S7', 6)",
        "INSERT INTO SUP_ANTENNE VALUES ('S4', 400, 1, '10', '0'), ('S5', 500, 1, '10', '0'), ('S6', 600, 17, '10', '0'), ('S7', 700, 1, '10', '0')",
        "INSERT INTO SUP_EMETTEUR VALUES ('S4', 'LTE 800'), ('S5', 'GSM 900'), ('S6', 'LTE 800'), ('S7', 'LTE 800')",
    ];

    /// Create a fixture database and return its path.
    async fn create_test_db(dir: &Path, statements: &[&str]) -> PathBuf {
        let path = dir.join("antennes.sqlite3");
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();

        for statement in SCHEMA.iter().chain(statements) {
            sqlx::query(statement).execute(&pool).await.unwrap();
        }
        pool.close().await;

        path
    }

    fn paris_box() -> BoundingBox {
        BoundingBox::around(Point::new(48.8, 2.3), 5.0)
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("height", "12,5").unwrap(), 12.5);
        assert_eq!(parse_decimal("height", " 7.25 ").unwrap(), 7.25);
        assert_eq!(parse_decimal("height", "0").unwrap(), 0.0);

        match parse_decimal("height", "1,2,3") {
            Err(Error::MalformedField { field, value }) => {
                assert_eq!(field, "height");
                assert_eq!(value, "1,2,3");
            }
            other => panic!("expected MalformedField, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_azimuth() {
        assert_eq!(parse_azimuth("").unwrap(), Azimuth::Omnidirectional);
        assert_eq!(parse_azimuth("  ").unwrap(), Azimuth::Omnidirectional);
        assert_eq!(parse_azimuth("112,5").unwrap(), Azimuth::Directional(112.5));
        assert!(parse_azimuth("nord").is_err());
    }

    #[test]
    fn test_record_conversion() {
        let record = SupportRecord {
            support_id: 1,
            lat: 48.8,
            lon: 2.3,
            antenna_id: 9,
            height: "18,2".to_string(),
            azimuth: String::new(),
            operator: "SFR".to_string(),
        };
        let row = FlatRow::try_from(record.clone()).unwrap();
        assert_eq!(row.height, 18.2);
        assert_eq!(row.azimuth, Azimuth::Omnidirectional);

        let broken = SupportRecord {
            height: "haut".to_string(),
            ..record
        };
        assert!(FlatRow::try_from(broken).is_err());
    }

    #[test]
    fn test_parse_operator_ids() {
        assert_eq!(parse_operator_ids("6, 137,23").unwrap(), vec![6, 137, 23]);
        assert_eq!(parse_operator_ids("6,").unwrap(), vec![6]);
        assert!(matches!(parse_operator_ids("6,x"), Err(Error::Config(_))));
    }

    #[test]
    fn test_query_placeholders_follow_operator_count() {
        let filter = QueryFilter {
            operator_ids: vec![1, 2],
            ..QueryFilter::default()
        };
        assert!(filter.sql().contains("IN (?, ?)"));
        assert!(QueryFilter::default().sql().contains("IN (?, ?, ?, ?)"));
    }

    #[test]
    fn test_from_env_with_values() {
        let orig_path = std::env::var("ANTENNES_DB_PATH").ok();
        let orig_ids = std::env::var("ANTENNES_OPERATOR_IDS").ok();

        std::env::set_var("ANTENNES_DB_PATH", "/data/sites.sqlite3");
        std::env::set_var("ANTENNES_OPERATOR_IDS", "6,23");

        let builder = StoreBuilder::from_env().unwrap();
        assert_eq!(builder.db_path, PathBuf::from("/data/sites.sqlite3"));
        assert_eq!(builder.filter.operator_ids, vec![6, 23]);
        assert_eq!(builder.filter.system_pattern, "LTE%");

        std::env::set_var("ANTENNES_OPERATOR_IDS", "orange");
        assert!(StoreBuilder::from_env().is_err());

        match orig_path {
            Some(v) => std::env::set_var("ANTENNES_DB_PATH", v),
            None => std::env::remove_var("ANTENNES_DB_PATH"),
        }
        match orig_ids {
            Some(v) => std::env::set_var("ANTENNES_OPERATOR_IDS", v),
            None => std::env::remove_var("ANTENNES_OPERATOR_IDS"),
        }
    }

    #[tokio::test]
    async fn test_build_rejects_empty_operator_list() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_test_db(temp_dir.path(), &[]).await;

        let result = StoreBuilder::new(path).operator_ids(Vec::new()).build().await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_build_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = StoreBuilder::new(temp_dir.path().join("missing.sqlite3"))
            .build()
            .await;
        assert!(matches!(result, Err(ref e) if e.is_unavailable()));
    }

    #[tokio::test]
    async fn test_fetch_rows_filters_and_orders() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_test_db(temp_dir.path(), FIXTURE).await;
        let store = StoreBuilder::new(&path).build().await.unwrap();
        assert_eq!(store.db_path(), path.as_path());

        let rows = store.fetch_rows(&paris_box()).await.unwrap();
        let keys: Vec<_> = rows
            .iter()
            .map(|r| (r.support_id, r.height, r.antenna_id, r.operator.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (1, 12.0, 102, "ORANGE"),
                (1, 30.5, 100, "ORANGE"),
                (1, 30.5, 101, "ORANGE"),
                (1, 30.5, 200, "SFR"),
                (2, 25.0, 300, "FREE MOBILE"),
            ]
        );
        assert_eq!(rows[2].azimuth, Azimuth::Omnidirectional);
        assert_eq!(rows[1].azimuth, Azimuth::Directional(120.0));
    }

    #[tokio::test]
    async fn test_supports_in() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_test_db(temp_dir.path(), FIXTURE).await;
        let store = StoreBuilder::new(&path).build().await.unwrap();

        let response = supports_in(&store, &paris_box()).await.unwrap();
        assert_eq!(response.supports.len(), 2);

        let groups = &response.supports[0].height_groups;
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].height, 12.0);
        assert_eq!(groups[1].height, 30.5);
        let ids: Vec<_> = groups[1].antennas.iter().map(|a| a.antenna_id).collect();
        assert_eq!(ids, vec![100, 101, 200]);

        let empty = supports_in(&store, &BoundingBox::degenerate()).await.unwrap();
        assert!(empty.supports.is_empty());
    }

    #[tokio::test]
    async fn test_custom_filter() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_test_db(temp_dir.path(), FIXTURE).await;
        let store = StoreBuilder::new(&path)
            .operator_ids(vec![999])
            .build()
            .await
            .unwrap();

        let rows = store.fetch_rows(&paris_box()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].support_id, 3);
        assert_eq!(rows[0].operator, "PRIVATE NET");
    }

    #[tokio::test]
    async fn test_malformed_height_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_test_db(
            temp_dir.path(),
            &[
                "INSERT INTO SUP_EXPLOITANT VALUES (6, 'ORANGE')",
                "INSERT INTO SUP_TYPE_ANTENNE VALUES (1)",
                "INSERT INTO SUP_SUPPORT VALUES (1, 'S1', 48.80, 2.30)",
                "INSERT INTO SUP_STATION VALUES ('S1', 6)",
                "INSERT INTO SUP_ANTENNE VALUES ('S1', 100, 1, 'haut', '0')",
                "INSERT INTO SUP_EMETTEUR VALUES ('S1', 'LTE 800')",
            ],
        )
        .await;
        let store = StoreBuilder::new(&path).build().await.unwrap();

        let result = store.fetch_rows(&paris_box()).await;
        assert!(matches!(
            result,
            Err(Error::MalformedField { field: "height", .. })
        ));
    }
}
