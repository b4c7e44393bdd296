//! Imperative shell for the tablift pipeline.
//!
//! This crate orchestrates the functional core (`tablift_core`) and the
//! document source (`tablift_pdf`) into a session-driven workflow:
//!
//! 1. open a document and extract tables from a page range ([`Session::extract`])
//! 2. hand the named sheets to the presentation layer, serialized as a
//!    multi-sheet workbook ([`workbook`])
//! 3. stage one sheet -- or a row-wise merge of several -- for editing and
//!    plotting ([`Session::select_sheet`] / [`Session::merge_selected`])
//! 4. export the edited sheet as CSV ([`export`])
//!
//! There is no CLI or network surface: the consuming UI drives a [`Session`]
//! directly and renders progress through the core's `ProgressObserver`
//! trait. Logging goes through the `log` facade; initialize whatever backend
//! the embedding application prefers.

use thiserror::Error;

pub mod export;
pub mod plot;
pub mod session;
pub mod workbook;

pub use export::ExportError;
pub use plot::{validate_request, ChartKind, PlotError, PlotRequest};
pub use session::{Session, MERGED_SHEET_NAME};
pub use workbook::{write_workbook, WorkbookError, SHEET_NAME_MAX_LEN};

// Re-export the pipeline vocabulary so UI glue needs only this crate.
pub use tablift_core::{
    CellGrid, Frame, NamedFrame, NoProgress, ProgressObserver, SheetCollection, TableSource,
};
pub use tablift_pdf::{PdfDocument, PdfError};

/// Anything the pipeline can surface to the user.
///
/// Range parsing never appears here: malformed ranges deterministically fall
/// back to the whole document instead of failing.
#[derive(Debug, Error)]
pub enum Error {
    /// The document could not be opened or read. Fatal for the extraction.
    #[error("failed to open document: {0}")]
    Document(#[from] PdfError),
    /// A merge/export referenced no sheets or an unknown one. No-op.
    #[error(transparent)]
    Selection(#[from] tablift_core::SelectionError),
    /// The workbook artifact could not be produced.
    #[error(transparent)]
    Workbook(#[from] WorkbookError),
    /// The edited sheet could not be serialized.
    #[error(transparent)]
    Export(#[from] ExportError),
    /// A chart request referenced columns the staged sheet lacks. No-op.
    #[error(transparent)]
    Plot(#[from] PlotError),
}
