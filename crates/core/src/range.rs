//! Page-range resolution: a free-text `start-end` expression into a concrete
//! 0-based page slice.
//!
//! Parsing is deliberately fail-open: any malformed input selects the whole
//! document rather than raising an error, so a stray character in the range
//! box never blocks an extraction.

use serde::{Deserialize, Serialize};

/// How a [`PageRange`] was arrived at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeOutcome {
    /// The expression parsed and fit the document as-is.
    Parsed,
    /// The expression parsed but one or both bounds were pulled back inside
    /// the document (or the range was inverted and collapsed to empty).
    Clamped,
    /// The expression was empty or malformed; the whole document is selected.
    FullDocument,
}

/// A resolved, clamped selection of pages: `start..end`, 0-based, half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
    pub outcome: RangeOutcome,
}

impl PageRange {
    pub fn indices(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Resolve a textual page-range expression against a document's page count.
///
/// The accepted pattern is `start-end` with 1-based inclusive bounds, e.g.
/// `"1-10"` selects the first ten pages. Both bounds are clamped to the
/// document; an inverted range collapses to an empty selection. Everything
/// else -- empty input, a missing dash, non-numeric bounds -- falls back to the
/// full document.
pub fn resolve_page_range(text: &str, page_count: usize) -> PageRange {
    match parse_bounds(text) {
        Some((start, end)) => {
            let start0 = (start.max(1) - 1).min(page_count);
            let end0 = end.min(page_count).max(start0);
            let outcome = if start >= 1 && start0 == start - 1 && end0 == end {
                RangeOutcome::Parsed
            } else {
                RangeOutcome::Clamped
            };
            PageRange {
                start: start0,
                end: end0,
                outcome,
            }
        }
        None => PageRange {
            start: 0,
            end: page_count,
            outcome: RangeOutcome::FullDocument,
        },
    }
}

/// Parse `start-end` into 1-based inclusive bounds. `None` means "use the
/// full document".
fn parse_bounds(text: &str) -> Option<(usize, usize)> {
    let (start, end) = text.trim().split_once('-')?;
    let start: usize = start.trim().parse().ok()?;
    let end: usize = end.trim().parse().ok()?;
    Some((start, end))
}
