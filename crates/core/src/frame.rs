use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Raw detection output
// ---------------------------------------------------------------------------

/// A rectangular grid of optional cell strings detected on one document page.
///
/// Produced by the document-source collaborator; `None` marks an absent or
/// empty cell. Immutable once returned.
pub type CellGrid = Vec<Vec<Option<String>>>;

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// A normalized tabular structure: named columns over equal-length rows.
///
/// Column names are pairwise distinct (guaranteed by [`dedup_columns`] at
/// every construction site). Every row is padded or truncated to the column
/// count, so `rows()[r][c]` is always addressable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Frame {
    /// Build a frame from a header and data rows, normalizing each row to the
    /// header's width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Frame { columns, rows }
    }

    /// An empty frame with no columns and no rows.
    pub fn empty() -> Self {
        Frame {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by name, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Remove the rows at the given indices, preserving the order of the
    /// survivors. Out-of-range and duplicate indices are ignored.
    pub fn delete_rows(&mut self, indices: &[usize]) {
        if indices.is_empty() {
            return;
        }
        let doomed: std::collections::HashSet<usize> = indices.iter().copied().collect();
        let mut idx = 0usize;
        self.rows.retain(|_| {
            let keep = !doomed.contains(&idx);
            idx += 1;
            keep
        });
    }

    /// Re-run column deduplication on this frame's header.
    ///
    /// A merged frame can carry duplicate labels when its sources used the
    /// same suffixed names; the editable-grid collaborator requires unique
    /// columns.
    pub fn rededuplicate_columns(&mut self) {
        self.columns = dedup_columns(&self.columns);
    }
}

// ---------------------------------------------------------------------------
// NamedFrame / SheetCollection
// ---------------------------------------------------------------------------

/// A frame paired with its display/storage name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedFrame {
    pub name: String,
    pub frame: Frame,
}

/// An ordered, name-unique collection of sheets.
///
/// The order is significant: it determines both listing order and workbook
/// sheet order. Entries are partitioned into a "named" prefix (names derived
/// from content) followed by an "auto" suffix (positionally numbered), with
/// `named_len` marking the boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetCollection {
    sheets: Vec<NamedFrame>,
    named_len: usize,
}

impl SheetCollection {
    /// Assemble a collection from the named group followed by the auto group.
    pub fn from_groups(named: Vec<NamedFrame>, auto: Vec<NamedFrame>) -> Self {
        let named_len = named.len();
        let mut sheets = named;
        sheets.extend(auto);
        SheetCollection { sheets, named_len }
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NamedFrame> {
        self.sheets.iter()
    }

    /// Look up a sheet's frame by name.
    pub fn get(&self, name: &str) -> Option<&Frame> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .map(|s| &s.frame)
    }

    /// All sheet names in collection order.
    pub fn all_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Only the content-derived names, excluding the auto-numbered suffix.
    ///
    /// This is the default option list for the sheet selector UI.
    pub fn named_names(&self) -> Vec<&str> {
        self.sheets[..self.named_len]
            .iter()
            .map(|s| s.name.as_str())
            .collect()
    }
}

impl<'a> IntoIterator for &'a SheetCollection {
    type Item = &'a NamedFrame;
    type IntoIter = std::slice::Iter<'a, NamedFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.sheets.iter()
    }
}

// ---------------------------------------------------------------------------
// Column deduplication
// ---------------------------------------------------------------------------

/// Disambiguate repeated column names, stable on first-seen order.
///
/// The first occurrence of a name keeps it unchanged; the k-th repetition
/// (k >= 1) becomes `{name}_{k}`. The empty string is treated like any other
/// value. Deduplicating an already-unique list returns it unchanged, so the
/// operation is idempotent.
pub fn dedup_columns(columns: &[String]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut result = Vec::with_capacity(columns.len());
    for col in columns {
        match seen.get_mut(col.as_str()) {
            Some(count) => {
                *count += 1;
                result.push(format!("{}_{}", col, count));
            }
            None => {
                seen.insert(col.as_str(), 0);
                result.push(col.clone());
            }
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // -- dedup_columns ------------------------------------------------------

    #[test]
    fn dedup_unique_names_unchanged() {
        let cols = strings(&["a", "b", "c"]);
        assert_eq!(dedup_columns(&cols), cols);
    }

    #[test]
    fn dedup_repeated_names_get_suffixes() {
        let cols = strings(&["a", "a", "a", "b", "a"]);
        assert_eq!(dedup_columns(&cols), strings(&["a", "a_1", "a_2", "b", "a_3"]));
    }

    #[test]
    fn dedup_counters_are_per_base_name() {
        let cols = strings(&["x", "y", "x", "y"]);
        assert_eq!(dedup_columns(&cols), strings(&["x", "y", "x_1", "y_1"]));
    }

    #[test]
    fn dedup_treats_empty_string_as_a_value() {
        let cols = strings(&["", "", "a", ""]);
        assert_eq!(dedup_columns(&cols), strings(&["", "_1", "a", "_2"]));
    }

    #[test]
    fn dedup_is_idempotent() {
        let cols = strings(&["a", "a", "b"]);
        let once = dedup_columns(&cols);
        let twice = dedup_columns(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn dedup_empty_list() {
        assert!(dedup_columns(&[]).is_empty());
    }

    // -- Frame --------------------------------------------------------------

    #[test]
    fn frame_normalizes_row_widths() {
        let frame = Frame::new(
            strings(&["a", "b", "c"]),
            vec![
                vec![Some("1".into())],
                vec![
                    Some("1".into()),
                    Some("2".into()),
                    Some("3".into()),
                    Some("4".into()),
                ],
            ],
        );
        assert_eq!(frame.rows()[0], vec![Some("1".into()), None, None]);
        assert_eq!(
            frame.rows()[1],
            vec![Some("1".into()), Some("2".into()), Some("3".into())]
        );
    }

    #[test]
    fn frame_column_index() {
        let frame = Frame::new(strings(&["a", "b"]), vec![]);
        assert_eq!(frame.column_index("b"), Some(1));
        assert_eq!(frame.column_index("z"), None);
    }

    #[test]
    fn delete_rows_preserves_order() {
        let mut frame = Frame::new(
            strings(&["a"]),
            vec![
                vec![Some("0".into())],
                vec![Some("1".into())],
                vec![Some("2".into())],
                vec![Some("3".into())],
            ],
        );
        frame.delete_rows(&[1, 3]);
        assert_eq!(
            frame.rows(),
            &[vec![Some("0".into())], vec![Some("2".into())]]
        );
    }

    #[test]
    fn delete_rows_ignores_out_of_range() {
        let mut frame = Frame::new(strings(&["a"]), vec![vec![Some("0".into())]]);
        frame.delete_rows(&[5, 99]);
        assert_eq!(frame.row_count(), 1);
    }

    #[test]
    fn rededuplicate_merged_columns() {
        let mut frame = Frame::new(strings(&["a", "a"]), vec![]);
        frame.rededuplicate_columns();
        assert_eq!(frame.columns(), strings(&["a", "a_1"]).as_slice());
    }

    // -- SheetCollection ----------------------------------------------------

    fn named(name: &str) -> NamedFrame {
        NamedFrame {
            name: name.to_string(),
            frame: Frame::empty(),
        }
    }

    #[test]
    fn collection_preserves_group_order() {
        let coll =
            SheetCollection::from_groups(vec![named("Rates"), named("Fees")], vec![named("Table_3")]);
        assert_eq!(coll.all_names(), vec!["Rates", "Fees", "Table_3"]);
        assert_eq!(coll.named_names(), vec!["Rates", "Fees"]);
    }

    #[test]
    fn collection_lookup_by_name() {
        let coll = SheetCollection::from_groups(vec![named("Rates")], vec![]);
        assert!(coll.get("Rates").is_some());
        assert!(coll.get("Missing").is_none());
    }

    #[test]
    fn empty_collection() {
        let coll = SheetCollection::default();
        assert!(coll.is_empty());
        assert!(coll.all_names().is_empty());
        assert!(coll.named_names().is_empty());
    }

    #[test]
    fn frame_survives_serde_round_trip() {
        let frame = Frame::new(
            strings(&["a", "b"]),
            vec![vec![Some("1".into()), None]],
        );
        let json = serde_json::to_string(&frame).unwrap();
        let back: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(back, frame);
    }
}
