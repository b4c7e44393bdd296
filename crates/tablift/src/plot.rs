//! Chart-request validation at the boundary with the charting collaborator.
//!
//! The collaborator draws the chart; this module only checks that a request
//! is satisfiable against the frame it targets, so invalid column selections
//! surface as a user-visible [`PlotError`] instead of a renderer failure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tablift_core::Frame;

/// Supported chart shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Scatter,
    Box,
}

/// A chart request: one x-column, one or more y-columns, and a shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotRequest {
    pub x: String,
    pub y: Vec<String>,
    pub kind: ChartKind,
}

/// The requested columns cannot be plotted from the target frame. Surfaced
/// to the user; the plot operation is a no-op.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlotError {
    #[error("no y-axis columns selected")]
    NoSeries,
    #[error("column not in sheet: {0}")]
    UnknownColumn(String),
}

/// Check a request against the frame it would plot.
pub fn validate_request(frame: &Frame, request: &PlotRequest) -> Result<(), PlotError> {
    if request.y.is_empty() {
        return Err(PlotError::NoSeries);
    }
    if frame.column_index(&request.x).is_none() {
        return Err(PlotError::UnknownColumn(request.x.clone()));
    }
    for column in &request.y {
        if frame.column_index(column).is_none() {
            return Err(PlotError::UnknownColumn(column.clone()));
        }
    }
    Ok(())
}
