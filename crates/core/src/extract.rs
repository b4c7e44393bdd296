//! Table extraction: drive a document source over a resolved page range and
//! normalize each detected grid into a frame.
//!
//! The extractor is pure apart from the two traits it talks through:
//! [`TableSource`] hands it per-page cell grids and [`ProgressObserver`]
//! receives per-page completion fractions. Both exist so the loop can be
//! tested against mock implementations without a real document.

use crate::frame::{CellGrid, Frame};
use crate::normalize::normalize;
use crate::range::resolve_page_range;

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// A paginated document that can detect at most one table per page.
///
/// Implementations own the parsing backend; the core only sees page counts
/// and cell grids. `extract_table` returns `Ok(None)` for a page with no
/// detectable table -- that page is skipped, not represented by a placeholder.
pub trait TableSource {
    type Error;

    /// Total number of pages in the document.
    fn page_count(&self) -> usize;

    /// Detect the table on the page at `page_index` (0-based).
    fn extract_table(&self, page_index: usize) -> Result<Option<CellGrid>, Self::Error>;
}

/// Receives extraction progress as a fraction in `(0, 1]`.
///
/// Called once per processed page; the reported sequence is strictly
/// increasing and ends at 1.0. Purely observational -- reporting is not a
/// suspension or cancellation point.
pub trait ProgressObserver {
    fn report(&mut self, fraction: f64);
}

/// A no-op observer for callers that do not track progress.
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn report(&mut self, _fraction: f64) {}
}

// ---------------------------------------------------------------------------
// Extraction loop
// ---------------------------------------------------------------------------

/// Extract and normalize every detected table on the requested pages.
///
/// `range_text` is resolved with [`resolve_page_range`]; malformed input
/// selects the whole document. Frames are returned in page order. A source
/// error aborts the whole extraction -- no partial result is produced, and
/// re-invoking with the same inputs is deterministic, so manual retry is
/// safe.
pub fn extract_frames<S: TableSource>(
    source: &S,
    range_text: &str,
    progress: &mut dyn ProgressObserver,
) -> Result<Vec<Frame>, S::Error> {
    let range = resolve_page_range(range_text, source.page_count());
    let total = range.len();
    let mut frames = Vec::new();

    for (done, page_index) in range.indices().enumerate() {
        if let Some(grid) = source.extract_table(page_index)? {
            frames.push(normalize(&grid));
        }
        progress.report((done + 1) as f64 / total as f64);
    }

    Ok(frames)
}
