//! Delimited-text export of a single (typically edited) frame.

use thiserror::Error;

use tablift_core::Frame;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv write error: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv buffer error: {0}")]
    Buffer(String),
}

/// Serialize a frame as UTF-8 CSV: header row first, no index column,
/// absent cells as empty fields.
pub fn frame_to_csv(frame: &Frame) -> Result<Vec<u8>, ExportError> {
    if frame.column_count() == 0 {
        return Ok(Vec::new());
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(frame.columns())?;
    for row in frame.rows() {
        writer.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.to_string()))
}
