//! Row-wise concatenation of a user-chosen subset of sheets into one
//! combined frame for downstream editing and plotting.

use thiserror::Error;

use crate::frame::{Frame, SheetCollection};

/// A merge or plot request referenced no sheets, or a sheet that is not in
/// the collection. The operation is a no-op when this is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no sheets selected")]
    Empty,
    #[error("unknown sheet: {0}")]
    UnknownSheet(String),
}

/// Concatenate the selected sheets row-wise, in selection order.
///
/// The merged column set is the first-seen-ordered union of the sources'
/// columns; a row from a source lacking one of the union columns carries
/// `None` there. Each source's rows keep their original order.
pub fn merge_sheets(
    collection: &SheetCollection,
    selected: &[String],
) -> Result<Frame, SelectionError> {
    if selected.is_empty() {
        return Err(SelectionError::Empty);
    }

    let mut sources: Vec<&Frame> = Vec::with_capacity(selected.len());
    for name in selected {
        let frame = collection
            .get(name)
            .ok_or_else(|| SelectionError::UnknownSheet(name.clone()))?;
        sources.push(frame);
    }

    // Union of column names, stable on first appearance across the selection.
    let mut columns: Vec<String> = Vec::new();
    for frame in &sources {
        for col in frame.columns() {
            if !columns.contains(col) {
                columns.push(col.clone());
            }
        }
    }

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    for frame in &sources {
        // Map union position -> source position once per frame.
        let mapping: Vec<Option<usize>> = columns
            .iter()
            .map(|col| frame.column_index(col))
            .collect();
        for row in frame.rows() {
            rows.push(
                mapping
                    .iter()
                    .map(|src| src.and_then(|i| row[i].clone()))
                    .collect(),
            );
        }
    }

    Ok(Frame::new(columns, rows))
}
