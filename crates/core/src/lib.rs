//! Core library for tablift
//!
//! This crate implements the **Functional Core** of the tablift pipeline,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The tablift project uses a multi-crate architecture to enforce separation
//! of concerns:
//!
//! - **`tablift_core`** (this crate): Pure transformation functions with zero I/O
//! - **`tablift_pdf`**: The document-source collaborator (lopdf-backed page
//!   iteration and cell-grid detection)
//! - **`tablift`**: Session orchestration and artifact serialization (the
//!   Imperative Shell)
//!
//! All functions in this crate are deterministic and side-effect free: the
//! extraction loop talks to the outside world only through the
//! [`TableSource`] and [`ProgressObserver`] traits, so every stage can be
//! tested with fixture data and mock implementations, no real document
//! required.
//!
//! # Pipeline
//!
//! ```text
//! document pages -> CellGrid  -> Frame        -> SheetCollection
//!   (TableSource)   (detection)  (normalize)     (naming)
//!                                     |
//!                                     +-> merged Frame (merge)
//! ```
//!
//! - [`normalize`]: turn one page's raw cell grid into a frame with a single
//!   deduplicated header row
//! - [`range`]: resolve a free-text page-range expression against a page count
//! - [`extract`]: drive a [`TableSource`] over the resolved pages
//! - [`naming`]: derive, sanitize, and disambiguate sheet names
//! - [`merge`]: concatenate a selected subset of sheets row-wise

pub mod extract;
pub mod frame;
pub mod merge;
pub mod naming;
pub mod normalize;
pub mod range;

pub use extract::{extract_frames, NoProgress, ProgressObserver, TableSource};
pub use frame::{dedup_columns, CellGrid, Frame, NamedFrame, SheetCollection};
pub use merge::{merge_sheets, SelectionError};
pub use naming::name_sheets;
pub use normalize::normalize;
pub use range::{resolve_page_range, PageRange, RangeOutcome};
