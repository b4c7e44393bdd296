//! Positional cell-grid detection: cluster a page's text spans into the
//! row/column lattice of a table.
//!
//! The detector is layout-driven: spans that share a Y coordinate form rows,
//! and X positions that repeat across enough rows become column boundaries.
//! It deliberately knows nothing about headers -- the output grid includes
//! every detected row, and header policy belongs to the normalizer
//! downstream.

use std::collections::{BTreeMap, HashSet};

use unicode_normalization::UnicodeNormalization;

use tablift_core::CellGrid;

use crate::spans::TextSpan;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for the grid detection heuristic.
#[derive(Debug, Clone)]
pub struct GridDetectorConfig {
    /// Minimum number of rows required for a region to qualify as a table.
    pub min_rows: usize,
    /// Minimum number of columns required.
    pub min_columns: usize,
    /// Maximum number of columns allowed (guards against noise).
    pub max_columns: usize,
    /// Factor applied to the median font size to derive Y-tolerance when
    /// grouping spans into rows.  `y_tolerance = median_font_size * factor`.
    pub y_tolerance_factor: f32,
    /// Fraction of rows that must have spans aligning with a candidate column
    /// position for that position to be accepted as a column boundary.
    pub min_alignment_ratio: f32,
    /// Minimum horizontal gap (in PDF points) between two adjacent column
    /// boundaries.
    pub min_column_gap: f32,
}

impl Default for GridDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 20,
            y_tolerance_factor: 0.3,
            min_alignment_ratio: 0.5,
            min_column_gap: 10.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Detect the table on a page, if any, as a [`CellGrid`].
///
/// Returns `None` when the page's spans do not form a plausible lattice
/// (too few rows or columns, or too little cross-row alignment). Cells with
/// no assigned span come back as `None`; multi-span cells join their texts
/// with single spaces.
pub fn detect_grid(spans: &[TextSpan], config: &GridDetectorConfig) -> Option<CellGrid> {
    if spans.is_empty() {
        return None;
    }

    let y_tolerance = compute_y_tolerance(spans, config.y_tolerance_factor);
    let rows = group_into_rows(spans, y_tolerance);

    if rows.len() < config.min_rows {
        return None;
    }

    let columns = detect_columns(&rows, config);
    if columns.len() < config.min_columns || columns.len() > config.max_columns {
        return None;
    }

    // Count rows with at least half their columns aligned; reject regions
    // where too few rows agree with the lattice.
    let aligned_rows = rows
        .iter()
        .filter(|row| {
            let aligned_cols = columns
                .iter()
                .filter(|&&col_x| {
                    row.iter()
                        .any(|s| (s.x - col_x).abs() < config.min_column_gap)
                })
                .count();
            aligned_cols >= columns.len().div_ceil(2)
        })
        .count();

    let ratio = aligned_rows as f32 / rows.len() as f32;
    if ratio < config.min_alignment_ratio {
        return None;
    }

    Some(rows_to_grid(&rows, &columns))
}

// ---------------------------------------------------------------------------
// Clustering
// ---------------------------------------------------------------------------

/// Group text spans into rows by their Y coordinate.
///
/// Two spans belong to the same row when their Y values differ by no more
/// than `y_tolerance`. Rows come back in reading order (descending Y -- PDF
/// user space grows upward), spans within a row sorted by X.
fn group_into_rows(spans: &[TextSpan], y_tolerance: f32) -> Vec<Vec<TextSpan>> {
    if spans.is_empty() {
        return Vec::new();
    }

    // Sort top of page first, then left to right.
    let mut sorted: Vec<&TextSpan> = spans.iter().collect();
    sorted.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut rows: Vec<Vec<TextSpan>> = Vec::new();
    let mut current_y = sorted[0].y;
    let mut current_spans: Vec<TextSpan> = vec![sorted[0].clone()];

    for span in sorted.iter().skip(1) {
        if (span.y - current_y).abs() <= y_tolerance {
            current_spans.push((*span).clone());
        } else {
            rows.push(finish_row(std::mem::take(&mut current_spans)));
            current_y = span.y;
            current_spans.push((*span).clone());
        }
    }
    if !current_spans.is_empty() {
        rows.push(finish_row(current_spans));
    }

    rows
}

/// Sort a completed row's spans by X.
fn finish_row(mut spans: Vec<TextSpan>) -> Vec<TextSpan> {
    spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
    spans
}

/// Detect column boundaries from the clustered rows.
///
/// X-start positions are bucketed to the nearest point; a bucket that appears
/// in at least `min_alignment_ratio` of the rows becomes a candidate, and
/// candidates closer together than `min_column_gap` merge into one.
fn detect_columns(rows: &[Vec<TextSpan>], config: &GridDetectorConfig) -> Vec<f32> {
    if rows.is_empty() {
        return Vec::new();
    }

    let total_rows = rows.len();

    // One vote per bucket per row; accumulate X for averaging.
    let mut x_freq: BTreeMap<i32, (f32, usize)> = BTreeMap::new();
    for row in rows {
        let mut seen_buckets: HashSet<i32> = HashSet::new();
        for span in row {
            let bucket = span.x.round() as i32;
            if seen_buckets.insert(bucket) {
                let entry = x_freq.entry(bucket).or_insert((0.0, 0));
                entry.0 += span.x;
                entry.1 += 1;
            }
        }
    }

    let min_count = (total_rows as f32 * config.min_alignment_ratio).ceil() as usize;
    let mut candidates: Vec<f32> = x_freq
        .values()
        .filter(|(_, count)| *count >= min_count)
        .map(|(sum, count)| sum / *count as f32)
        .collect();

    candidates.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut columns: Vec<f32> = Vec::new();
    for &x in &candidates {
        if let Some(&last) = columns.last() {
            if (x - last).abs() < config.min_column_gap {
                continue;
            }
        }
        columns.push(x);
    }

    columns
}

/// Compute the Y-tolerance used for row grouping from the median font size.
fn compute_y_tolerance(spans: &[TextSpan], factor: f32) -> f32 {
    let mut sizes: Vec<f32> = spans.iter().map(|s| s.font_size).collect();
    sizes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = sizes[sizes.len() / 2];
    (median * factor).max(1.0)
}

// ---------------------------------------------------------------------------
// Grid assembly
// ---------------------------------------------------------------------------

/// Materialize clustered rows into the cell grid, assigning each span to the
/// column whose boundary is nearest.
fn rows_to_grid(rows: &[Vec<TextSpan>], columns: &[f32]) -> CellGrid {
    rows.iter()
        .map(|row| {
            let mut cells: Vec<Option<String>> = vec![None; columns.len()];
            for span in row {
                let idx = assign_column(span.x, columns);
                let text: String = span.text.trim().nfc().collect();
                if text.is_empty() {
                    continue;
                }
                match &mut cells[idx] {
                    Some(existing) => {
                        existing.push(' ');
                        existing.push_str(&text);
                    }
                    None => cells[idx] = Some(text),
                }
            }
            cells
        })
        .collect()
}

/// Find the column index whose boundary X is closest to the given span X.
fn assign_column(x: f32, columns: &[f32]) -> usize {
    columns
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (x - **a)
                .abs()
                .partial_cmp(&(x - **b).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
