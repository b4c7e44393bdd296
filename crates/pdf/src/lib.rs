//! lopdf-backed document source for the tablift pipeline.
//!
//! Opens a PDF from bytes or a path, walks each page's content stream into
//! positioned text spans, and clusters those spans into the per-page
//! [`CellGrid`]s the core pipeline consumes. The crate exposes the document
//! as a [`tablift_core::TableSource`], so everything above this boundary is
//! backend-agnostic.

use std::path::Path;

use thiserror::Error;

use tablift_core::{CellGrid, TableSource};

pub mod backend;
pub mod grid;
pub mod spans;

pub use grid::GridDetectorConfig;

use backend::{LopdfBackend, PageId, PdfBackend};

/// Failure to open or read a document. Fatal: surfaced to the caller and
/// never retried automatically.
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// An opened PDF document positioned for per-page table detection.
///
/// Holds the parsed backend and the ordered page list, so repeated
/// `extract_table` calls never re-parse the file. The handle is a
/// single-reader resource: it is `&self`-threaded but extraction runs
/// sequentially in the pipeline.
pub struct PdfDocument {
    backend: LopdfBackend,
    pages: Vec<PageId>,
    config: GridDetectorConfig,
}

impl PdfDocument {
    /// Parse a PDF from an in-memory byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        let backend = LopdfBackend::load_bytes(bytes)?;
        let pages = backend.pages().values().copied().collect();
        Ok(PdfDocument {
            backend,
            pages,
            config: GridDetectorConfig::default(),
        })
    }

    /// Read and parse a PDF file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PdfError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Replace the default detection tuning.
    pub fn with_config(mut self, config: GridDetectorConfig) -> Self {
        self.config = config;
        self
    }
}

impl TableSource for PdfDocument {
    type Error = PdfError;

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn extract_table(&self, page_index: usize) -> Result<Option<CellGrid>, PdfError> {
        let page_id = match self.pages.get(page_index) {
            Some(id) => *id,
            None => return Ok(None),
        };
        let page_spans = spans::extract_page_spans(&self.backend, page_id)?;
        Ok(grid::detect_grid(&page_spans, &self.config))
    }
}
