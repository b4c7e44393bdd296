//! Explicit per-session pipeline state.
//!
//! One [`Session`] lives for one user session and carries everything the
//! presentation layer used to hold ambiently: the current sheet collection,
//! the serialized workbook artifact, and the frame staged for editing and
//! plotting. Each extraction replaces the whole set, so re-running with the
//! same inputs reproduces the same state and manual retry is always safe.

use std::path::Path;

use tablift_core::{
    extract_frames, merge_sheets, name_sheets, resolve_page_range, Frame, NamedFrame,
    ProgressObserver, RangeOutcome, SelectionError, SheetCollection, TableSource,
};

use crate::workbook::write_workbook;
use crate::Error;

/// Name given to the frame produced by merging selected sheets.
pub const MERGED_SHEET_NAME: &str = "MergedSheet";

/// State for one extraction session.
pub struct Session {
    document_base: String,
    range_text: String,
    sheets: SheetCollection,
    workbook: Option<Vec<u8>>,
    plot_target: Option<NamedFrame>,
}

impl Session {
    /// Start a session for an uploaded document. `file_name` is the
    /// document's original name; its stem becomes the base for output file
    /// names.
    pub fn new(file_name: &str) -> Self {
        let document_base = Path::new(file_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.to_string());
        Session {
            document_base,
            range_text: String::new(),
            sheets: SheetCollection::default(),
            workbook: None,
            plot_target: None,
        }
    }

    // -- extraction ---------------------------------------------------------

    /// Run the full pipeline: extract tables from the requested pages, name
    /// them, and serialize the workbook artifact.
    ///
    /// Replaces any previous collection and clears the staged plot frame.
    /// An extraction that finds no tables leaves the (empty) collection in
    /// place but surfaces the serializer's refusal to write a zero-sheet
    /// artifact.
    pub fn extract<S>(
        &mut self,
        source: &S,
        range_text: &str,
        progress: &mut dyn ProgressObserver,
    ) -> Result<&SheetCollection, Error>
    where
        S: TableSource,
        Error: From<S::Error>,
    {
        let range = resolve_page_range(range_text, source.page_count());
        match range.outcome {
            RangeOutcome::Clamped => log::warn!(
                "page range {:?} clamped to pages {}..{}",
                range_text,
                range.start + 1,
                range.end
            ),
            RangeOutcome::FullDocument if !range_text.trim().is_empty() => log::warn!(
                "unparseable page range {:?}; extracting the whole document",
                range_text
            ),
            _ => {}
        }

        let frames = extract_frames(source, range_text, progress)?;
        log::info!(
            "extracted {} tables from {} pages",
            frames.len(),
            range.len()
        );

        self.sheets = name_sheets(frames);
        self.range_text = range_text.trim().to_string();
        self.plot_target = None;
        self.workbook = None;
        self.workbook = Some(write_workbook(&self.sheets)?);
        Ok(&self.sheets)
    }

    pub fn sheets(&self) -> &SheetCollection {
        &self.sheets
    }

    /// Sheet names offered for selection: the content-derived ones by
    /// default, everything when `show_all` is set.
    pub fn sheet_names(&self, show_all: bool) -> Vec<&str> {
        if show_all {
            self.sheets.all_names()
        } else {
            self.sheets.named_names()
        }
    }

    // -- workbook artifact ---------------------------------------------------

    /// The serialized workbook from the most recent extraction, if any.
    pub fn workbook_bytes(&self) -> Option<&[u8]> {
        self.workbook.as_deref()
    }

    /// Download name for the workbook artifact:
    /// `{base}_pages_{range}.xlsx`, with the range segment omitted when no
    /// range was given.
    pub fn workbook_file_name(&self) -> String {
        if self.range_text.is_empty() {
            format!("{}.xlsx", self.document_base)
        } else {
            format!("{}_pages_{}.xlsx", self.document_base, self.range_text)
        }
    }

    // -- editing / plotting staging ------------------------------------------

    /// Stage a single sheet for editing and plotting.
    pub fn select_sheet(&mut self, name: &str) -> Result<&Frame, Error> {
        let frame = self
            .sheets
            .get(name)
            .ok_or_else(|| SelectionError::UnknownSheet(name.to_string()))?;
        let mut staged = frame.clone();
        staged.rededuplicate_columns();
        let target = self.plot_target.insert(NamedFrame {
            name: name.to_string(),
            frame: staged,
        });
        Ok(&target.frame)
    }

    /// Merge the selected sheets row-wise and stage the result under
    /// [`MERGED_SHEET_NAME`].
    pub fn merge_selected(&mut self, names: &[String]) -> Result<&Frame, Error> {
        let mut merged = merge_sheets(&self.sheets, names)?;
        merged.rededuplicate_columns();
        let target = self.plot_target.insert(NamedFrame {
            name: MERGED_SHEET_NAME.to_string(),
            frame: merged,
        });
        Ok(&target.frame)
    }

    /// The frame currently staged for the editor/plotter, if any.
    pub fn plot_target(&self) -> Option<&NamedFrame> {
        self.plot_target.as_ref()
    }

    /// Serialize an edited version of the staged sheet for download,
    /// returning `(file_name, csv_bytes)`.
    ///
    /// The file name follows `{base}_edited_{sheet}.csv` using the staged
    /// sheet's name.
    pub fn export_edited(&self, edited: &Frame) -> Result<(String, Vec<u8>), Error> {
        let target = self
            .plot_target
            .as_ref()
            .ok_or(SelectionError::Empty)?;
        let file_name = format!("{}_edited_{}.csv", self.document_base, target.name);
        let bytes = crate::export::frame_to_csv(edited)?;
        Ok((file_name, bytes))
    }
}
