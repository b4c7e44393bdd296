//! Multi-sheet workbook serialization.
//!
//! Writes an ordered sheet collection into an in-memory XLSX artifact: one
//! sheet per entry in collection order, header row first, no index column.
//! Sheet names are truncated to the format's hard limit and residual
//! collisions (possible after truncation, or when the namer's suffixed
//! output overlaps a later candidate) are resolved with numeric suffixes.

use std::collections::HashSet;

use thiserror::Error;

use tablift_core::SheetCollection;

/// Hard sheet-name length limit imposed by the workbook format.
pub const SHEET_NAME_MAX_LEN: usize = 31;

#[derive(Debug, Error)]
pub enum WorkbookError {
    /// Serializing zero sheets would produce a file most readers reject, so
    /// it is refused up front rather than failing silently downstream.
    #[error("cannot serialize an empty sheet collection")]
    EmptyCollection,
    #[error("workbook write error: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
}

/// Serialize the collection into XLSX bytes, positioned for immediate
/// reading.
pub fn write_workbook(collection: &SheetCollection) -> Result<Vec<u8>, WorkbookError> {
    if collection.is_empty() {
        return Err(WorkbookError::EmptyCollection);
    }

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let mut used_names: HashSet<String> = HashSet::new();

    for sheet in collection {
        let name = unique_sheet_name(&sheet.name, &used_names);
        used_names.insert(name.clone());

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&name)?;

        for (col, label) in sheet.frame.columns().iter().enumerate() {
            worksheet.write_string(0, col as u16, label)?;
        }
        for (row, cells) in sheet.frame.rows().iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if let Some(value) = cell {
                    worksheet.write_string(row as u32 + 1, col as u16, value)?;
                }
            }
        }
    }

    let bytes = workbook.save_to_buffer()?;
    log::debug!(
        "serialized {} sheets into {} bytes",
        collection.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Truncate a name to the format limit and disambiguate against the names
/// already written.
///
/// Collision suffixes `_1`, `_2`, ... are appended after shortening the base
/// so the suffix itself always survives truncation; counters are unbounded,
/// so a free name is always found.
fn unique_sheet_name(name: &str, used: &HashSet<String>) -> String {
    let base = truncate_chars(name, SHEET_NAME_MAX_LEN);
    if !used.contains(&base) {
        return base;
    }
    let mut count = 1usize;
    loop {
        let suffix = format!("_{}", count);
        let stem = truncate_chars(name, SHEET_NAME_MAX_LEN.saturating_sub(suffix.chars().count()));
        let candidate = format!("{}{}", stem, suffix);
        if !used.contains(&candidate) {
            return candidate;
        }
        count += 1;
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
