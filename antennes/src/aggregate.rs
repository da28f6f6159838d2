//! Grouping of flat result rows into the support tree.
//!
//! Rows come ordered by (support id, height, antenna id). A single forward
//! pass compares each row's keys with the previous row's and decides which
//! level of the tree the row opens:
//!
//! | Condition | Opens |
//! |-----------|-------|
//! | support id differs (or first row) | support, height group, antenna |
//! | height differs | height group, antenna |
//! | antenna id differs | antenna |
//! | otherwise | nothing |
//!
//! The operator of every row is then appended to the open antenna. Keys are
//! compared with exact equality.

use crate::model::{Antenna, FlatRow, HeightGroup, SortedRows, Support, SupportsResponse};

/// Which node a row opens relative to the previous row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    NewSupport,
    NewHeight,
    NewAntenna,
    SameAntenna,
}

/// Grouping keys of the last row seen.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    support_id: i64,
    height: f64,
    antenna_id: i64,
}

impl Cursor {
    fn of(row: &FlatRow) -> Self {
        Self {
            support_id: row.support_id,
            height: row.height,
            antenna_id: row.antenna_id,
        }
    }
}

impl Boundary {
    fn between(cursor: Option<Cursor>, row: &FlatRow) -> Self {
        match cursor {
            None => Boundary::NewSupport,
            Some(c) if c.support_id != row.support_id => Boundary::NewSupport,
            Some(c) if c.height != row.height => Boundary::NewHeight,
            Some(c) if c.antenna_id != row.antenna_id => Boundary::NewAntenna,
            Some(_) => Boundary::SameAntenna,
        }
    }
}

/// Build the nested support tree from sorted rows.
///
/// Every node is seeded from the row that opens it, so supports always hold
/// at least one height group, height groups at least one antenna, and
/// antennas at least one operator. Input order is preserved at every level.
///
/// # Examples
///
/// ```
/// use antennes::{aggregate, Azimuth, FlatRow, SortedRows};
///
/// let row = |antenna_id, operator: &str| FlatRow {
///     support_id: 1,
///     lat: 10.0,
///     lon: 20.0,
///     antenna_id,
///     height: 100.0,
///     azimuth: Azimuth::Omnidirectional,
///     operator: operator.to_string(),
/// };
///
/// let rows = SortedRows::try_from_sorted(vec![row(100, "A"), row(100, "B"), row(200, "C")])?;
/// let response = aggregate(rows);
///
/// let antennas = &response.supports[0].height_groups[0].antennas;
/// assert_eq!(antennas[0].operators, ["A", "B"]);
/// assert_eq!(antennas[1].operators, ["C"]);
/// # Ok::<(), antennes::Error>(())
/// ```
pub fn aggregate(rows: SortedRows) -> SupportsResponse {
    let mut supports: Vec<Support> = Vec::new();
    let mut cursor: Option<Cursor> = None;

    for row in rows {
        let boundary = Boundary::between(cursor, &row);
        cursor = Some(Cursor::of(&row));

        // The cursor is only set once a support has been opened, so the
        // `last_mut` lookups below always find a node.
        match boundary {
            Boundary::NewSupport => supports.push(Support::open(row)),
            Boundary::NewHeight => {
                if let Some(support) = supports.last_mut() {
                    support.height_groups.push(HeightGroup::open(row));
                }
            }
            Boundary::NewAntenna => {
                if let Some(group) = open_height_group(&mut supports) {
                    group.antennas.push(Antenna::open(row));
                }
            }
            Boundary::SameAntenna => {
                if let Some(antenna) =
                    open_height_group(&mut supports).and_then(|g| g.antennas.last_mut())
                {
                    antenna.operators.push(row.operator);
                }
            }
        }
    }

    tracing::trace!(supports = supports.len(), "Rows aggregated");

    SupportsResponse { supports }
}

fn open_height_group(supports: &mut [Support]) -> Option<&mut HeightGroup> {
    supports
        .last_mut()
        .and_then(|support| support.height_groups.last_mut())
}
