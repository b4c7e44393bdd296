//! End-to-end pipeline test: a synthetic PDF through extraction, naming,
//! workbook serialization, and back out through a workbook reader.

use std::io::Cursor;

use calamine::{open_workbook, Data, Reader, Xlsx};
use lopdf::{dictionary, Document, Object, Stream};

use tablift::{
    validate_request, ChartKind, NoProgress, PdfDocument, PlotRequest, ProgressObserver, Session,
    MERGED_SHEET_NAME,
};

/// Build a one-font PDF with one content stream per page.
fn synthetic_pdf(page_contents: &[String]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for content in page_contents {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("in-memory save");
    bytes
}

/// A two-column table whose first header cell is `label`.
///
/// The header spans two physical rows the way scanned rate tables often do:
/// the first row's second cell is the literal `none`, so the normalizer must
/// pull `Value` up from the row beneath.
fn table_page(label: &str, rows: &[(&str, &str)]) -> String {
    let mut content = format!(
        "BT /F1 10 Tf 72 700 Td ({}) Tj 100 0 Td (none) Tj ET \
         BT /F1 10 Tf 72 680 Td (sub) Tj 100 0 Td (Value) Tj ET",
        label
    );
    for (i, (left, right)) in rows.iter().enumerate() {
        let y = 660 - 20 * i as i32;
        content.push_str(&format!(
            " BT /F1 10 Tf 72 {} Td ({}) Tj 100 0 Td ({}) Tj ET",
            y, left, right
        ));
    }
    content
}

fn prose_page() -> String {
    "BT /F1 10 Tf 72 700 Td (Nothing tabular on this page) Tj ET".to_string()
}

fn three_page_document() -> Vec<u8> {
    synthetic_pdf(&[
        table_page("Premium", &[("base", "100"), ("plus", "120")]),
        prose_page(),
        table_page("Deductible", &[("standard", "500")]),
    ])
}

struct Recorder(Vec<f64>);

impl ProgressObserver for Recorder {
    fn report(&mut self, fraction: f64) {
        self.0.push(fraction);
    }
}

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn document_to_workbook_round_trip() {
    init_logs();
    let doc = PdfDocument::from_bytes(&three_page_document()).unwrap();
    let mut session = Session::new("policy.pdf");
    let mut progress = Recorder(Vec::new());

    let sheets = session.extract(&doc, "", &mut progress).unwrap();

    // Page 2 has no table; pages 1 and 3 survive in order.
    assert_eq!(sheets.all_names(), vec!["Premium", "Deductible"]);

    // Progress was reported for all three pages, ending at completion.
    assert_eq!(progress.0, vec![1.0 / 3.0, 2.0 / 3.0, 1.0]);

    // The artifact re-reads with the same names and content.
    let bytes = session.workbook_bytes().unwrap().to_vec();
    let mut workbook = Xlsx::new(Cursor::new(bytes)).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Premium", "Deductible"]);

    let range = workbook.worksheet_range("Premium").unwrap();
    assert_eq!(range.get_value((0, 0)), Some(&Data::String("Premium".into())));
    assert_eq!(range.get_value((0, 1)), Some(&Data::String("Value".into())));
    assert_eq!(range.get_value((1, 0)), Some(&Data::String("base".into())));
    assert_eq!(range.get_value((2, 1)), Some(&Data::String("120".into())));

    let range = workbook.worksheet_range("Deductible").unwrap();
    assert_eq!(
        range.get_value((1, 0)),
        Some(&Data::String("standard".into()))
    );
}

#[test]
fn range_restricts_extraction() {
    let doc = PdfDocument::from_bytes(&three_page_document()).unwrap();
    let mut session = Session::new("policy.pdf");

    session.extract(&doc, "3-3", &mut NoProgress).unwrap();

    assert_eq!(session.sheets().all_names(), vec!["Deductible"]);
    assert_eq!(session.workbook_file_name(), "policy_pages_3-3.xlsx");
}

#[test]
fn malformed_range_extracts_everything() {
    init_logs();
    let doc = PdfDocument::from_bytes(&three_page_document()).unwrap();
    let mut session = Session::new("policy.pdf");

    session.extract(&doc, "pages please", &mut NoProgress).unwrap();

    assert_eq!(session.sheets().len(), 2);
}

#[test]
fn merge_edit_export_flow() {
    let doc = PdfDocument::from_bytes(&three_page_document()).unwrap();
    let mut session = Session::new("policy.pdf");
    session.extract(&doc, "", &mut NoProgress).unwrap();

    let merged = session
        .merge_selected(&["Premium".to_string(), "Deductible".to_string()])
        .unwrap();
    assert_eq!(merged.row_count(), 3);

    // The merged frame supports a plot over its shared column.
    let request = PlotRequest {
        x: "Value".to_string(),
        y: vec!["Premium".to_string()],
        kind: ChartKind::Bar,
    };
    validate_request(merged, &request).unwrap();

    // Simulate an edit (row deletion) and export.
    let mut edited = merged.clone();
    edited.delete_rows(&[0]);
    let (file_name, bytes) = session.export_edited(&edited).unwrap();
    assert_eq!(file_name, format!("policy_edited_{}.csv", MERGED_SHEET_NAME));

    let text = String::from_utf8(bytes).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Premium,Value,Deductible"));
    assert_eq!(lines.clone().count(), 2);
}

#[test]
fn artifact_is_readable_from_disk() {
    init_logs();
    let doc = PdfDocument::from_bytes(&three_page_document()).unwrap();
    let mut session = Session::new("policy.pdf");
    session.extract(&doc, "1-3", &mut NoProgress).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(session.workbook_file_name());
    std::fs::write(&path, session.workbook_bytes().unwrap()).unwrap();

    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Premium", "Deductible"]);
    let range = workbook.worksheet_range("Deductible").unwrap();
    assert_eq!(
        range.get_value((1, 1)),
        Some(&Data::String("500".into()))
    );
}

#[test]
fn reextraction_is_idempotent() {
    let doc = PdfDocument::from_bytes(&three_page_document()).unwrap();
    let mut session = Session::new("policy.pdf");

    session.extract(&doc, "1-3", &mut NoProgress).unwrap();
    let first = session.sheets().clone();
    let first_names = {
        let bytes = session.workbook_bytes().unwrap().to_vec();
        Xlsx::new(Cursor::new(bytes)).unwrap().sheet_names().to_vec()
    };

    session.extract(&doc, "1-3", &mut NoProgress).unwrap();
    assert_eq!(session.sheets(), &first);
    let second_names = {
        let bytes = session.workbook_bytes().unwrap().to_vec();
        Xlsx::new(Cursor::new(bytes)).unwrap().sheet_names().to_vec()
    };
    assert_eq!(second_names, first_names);
}
