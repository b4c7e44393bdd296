//! Grid normalization: raw per-page cell grids into frames with a single
//! deduplicated header row.
//!
//! Documents frequently split their real header across two physical rows, or
//! leave first-row cells blank where a heading spans columns. The normalizer
//! repairs both cases by merging row 0 with row 1 before deduplication.

use crate::frame::{dedup_columns, CellGrid, Frame};

/// A primary-header cell textually equal to this token (case-insensitive) is
/// treated as absent and filled from the fallback row.
pub const HEADER_FALLBACK_TOKEN: &str = "none";

/// Grids with more than this many rows get the two-row header merge; smaller
/// grids use row 0 alone.
pub const HEADER_MERGE_MIN_ROWS: usize = 3;

/// Convert one page's cell grid into a [`Frame`].
///
/// With at least [`HEADER_MERGE_MIN_ROWS`] rows, row 0 is the primary header
/// and row 1 the fallback: per column, the resolved name is row 1's value
/// when row 0's is absent or equals [`HEADER_FALLBACK_TOKEN`], otherwise
/// row 0's. Data starts at row 2. Smaller grids skip the merge: row 0 (or an
/// empty placeholder when the grid has no rows) becomes the header and the
/// rest is data. Either way the header is deduplicated with
/// [`dedup_columns`].
pub fn normalize(grid: &CellGrid) -> Frame {
    if grid.len() >= HEADER_MERGE_MIN_ROWS {
        let header = merge_header_rows(&grid[0], &grid[1]);
        let columns = dedup_columns(&header);
        Frame::new(columns, grid[2..].to_vec())
    } else {
        let header: Vec<String> = grid
            .first()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.clone().unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default();
        let columns = dedup_columns(&header);
        Frame::new(columns, grid.iter().skip(1).cloned().collect())
    }
}

/// Resolve a two-row header into a single list of column names.
///
/// The result has one entry per primary-row cell; a fallback cell is only
/// consulted at indices where the primary cell is absent or equals
/// [`HEADER_FALLBACK_TOKEN`] case-insensitively.
pub fn merge_header_rows(primary: &[Option<String>], fallback: &[Option<String>]) -> Vec<String> {
    primary
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let use_fallback = match cell {
                None => true,
                Some(text) => text.eq_ignore_ascii_case(HEADER_FALLBACK_TOKEN),
            };
            if use_fallback {
                fallback.get(i).cloned().flatten().unwrap_or_default()
            } else {
                cell.clone().unwrap_or_default()
            }
        })
        .collect()
}
