//! Content-stream text extraction: raw PDF operators into positioned spans.
//!
//! Implements a simplified text-rendering state machine. Only position and
//! effective font size are tracked -- that is all the grid detector needs to
//! cluster spans into rows and columns. I/O stays behind the
//! [`PdfBackend`] trait supplied by the caller.

use crate::backend::{get_number_from_value, PageId, PdfBackend, PdfValue};
use crate::PdfError;

/// A single run of text at a specific position on the page.
#[derive(Debug, Clone)]
pub struct TextSpan {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub font_size: f32,
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Approximate character width as a fraction of font size when no better
/// metric is available.  0.5 is a reasonable default for proportional fonts.
const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

/// The identity 2x3 text matrix: [a, b, c, d, tx, ty].
const IDENTITY_MATRIX: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

// ---------------------------------------------------------------------------
// Internal: PDF text-state machine
// ---------------------------------------------------------------------------

/// Mutable state tracked while walking a page's content stream.
#[derive(Debug, Clone)]
struct TextState {
    /// Current font resource name (the `/F1`-style key), used for decoding.
    font_key: Vec<u8>,
    /// Current font size in text-space units.
    font_size: f32,
    /// Elements [a, b, c, d, tx, ty] of the current text matrix.
    text_matrix: [f32; 6],
    /// Text line matrix -- set by BT and updated by Td/TD/T*/Tm.
    line_matrix: [f32; 6],
    /// Horizontal scaling factor (percent / 100).  Default 1.0.
    horiz_scale: f32,
    /// Character spacing (Tc).
    char_spacing: f32,
    /// Word spacing (Tw).
    word_spacing: f32,
    /// Text rise (Ts).
    text_rise: f32,
    /// Leading (TL).
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_size: 0.0,
            text_matrix: IDENTITY_MATRIX,
            line_matrix: IDENTITY_MATRIX,
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            text_rise: 0.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn x(&self) -> f32 {
        self.text_matrix[4]
    }

    fn y(&self) -> f32 {
        self.text_matrix[5]
    }

    /// Effective font size accounting for the text matrix vertical scale.
    fn effective_font_size(&self) -> f32 {
        let scale = (self.text_matrix[1].powi(2) + self.text_matrix[3].powi(2)).sqrt();
        (self.font_size * scale).abs()
    }

    /// Advance the text matrix horizontally by `dx` text-space units.
    fn advance_x(&mut self, dx: f32) {
        self.text_matrix[4] += dx * self.text_matrix[0];
        self.text_matrix[5] += dx * self.text_matrix[1];
    }

    /// Multiply the text line matrix by a translation (used by Td / TD).
    fn translate_line(&mut self, tx: f32, ty: f32) {
        let new_tx = self.line_matrix[0] * tx + self.line_matrix[2] * ty + self.line_matrix[4];
        let new_ty = self.line_matrix[1] * tx + self.line_matrix[3] * ty + self.line_matrix[5];
        self.line_matrix[4] = new_tx;
        self.line_matrix[5] = new_ty;
        self.text_matrix = self.line_matrix;
    }
}

/// Estimate the rendered width of a text string given the current state.
fn estimate_text_width(text: &str, state: &TextState) -> f32 {
    let n = text.chars().count() as f32;
    n * state.font_size * APPROX_CHAR_WIDTH_RATIO * state.horiz_scale
}

/// Advance the text matrix after rendering `text`.
fn advance_after_show(text: &str, state: &mut TextState) {
    let mut total_dx: f32 = 0.0;
    for ch in text.chars() {
        let char_w = state.font_size * APPROX_CHAR_WIDTH_RATIO * state.horiz_scale;
        total_dx += char_w + state.char_spacing;
        if ch == ' ' {
            total_dx += state.word_spacing;
        }
    }
    state.advance_x(total_dx);
}

/// Decode a single [`PdfValue::Str`] operand into a `String`, using the
/// backend's font-aware decoder.
fn decode_string(
    val: &PdfValue,
    backend: &dyn PdfBackend,
    page_id: PageId,
    font_key: &[u8],
) -> String {
    match val {
        PdfValue::Str(bytes) => backend.decode_text(page_id, font_key, bytes),
        _ => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Public API: span extraction
// ---------------------------------------------------------------------------

/// Walk a single page's content stream and produce a flat list of
/// [`TextSpan`]s.
///
/// Handled operators: `BT`/`ET` (text object delimiters), `Tf` (font size),
/// `Tm`/`Td`/`TD`/`T*`/`TL` (matrix and line movement), `Tc`/`Tw`/`Tz`/`Ts`
/// (spacing and scaling), and the showing operators `Tj`, `TJ`, `'`, `"`.
/// Everything else is ignored.
pub fn extract_page_spans(
    backend: &dyn PdfBackend,
    page_id: PageId,
) -> Result<Vec<TextSpan>, PdfError> {
    let raw_content = backend.page_content(page_id)?;
    let ops = backend.decode_content(&raw_content)?;

    let mut state = TextState::default();
    let mut spans: Vec<TextSpan> = Vec::new();

    for op in &ops {
        match op.operator.as_str() {
            "BT" => {
                state.text_matrix = IDENTITY_MATRIX;
                state.line_matrix = IDENTITY_MATRIX;
            }
            "ET" => {
                // Font state is kept across text objects; some PDFs reuse the
                // font set earlier.
            }

            "Tf" => {
                if op.operands.len() >= 2 {
                    if let PdfValue::Name(key) = &op.operands[0] {
                        state.font_key = key.clone();
                    }
                    state.font_size = get_number_from_value(&op.operands[1]).unwrap_or(0.0);
                }
            }

            "Tm" => {
                if op.operands.len() >= 6 {
                    let vals: Vec<f32> = op
                        .operands
                        .iter()
                        .take(6)
                        .filter_map(get_number_from_value)
                        .collect();
                    if vals.len() == 6 {
                        state.text_matrix = [vals[0], vals[1], vals[2], vals[3], vals[4], vals[5]];
                        state.line_matrix = state.text_matrix;
                    }
                }
            }
            "Td" => {
                if op.operands.len() >= 2 {
                    let tx = get_number_from_value(&op.operands[0]).unwrap_or(0.0);
                    let ty = get_number_from_value(&op.operands[1]).unwrap_or(0.0);
                    state.translate_line(tx, ty);
                }
            }
            "TD" => {
                // TD is equivalent to: -ty TL ; tx ty Td
                if op.operands.len() >= 2 {
                    let tx = get_number_from_value(&op.operands[0]).unwrap_or(0.0);
                    let ty = get_number_from_value(&op.operands[1]).unwrap_or(0.0);
                    state.leading = -ty;
                    state.translate_line(tx, ty);
                }
            }
            "T*" => {
                state.translate_line(0.0, -state.leading);
            }
            "TL" => {
                if let Some(v) = op.operands.first().and_then(get_number_from_value) {
                    state.leading = v;
                }
            }

            "Tc" => {
                if let Some(v) = op.operands.first().and_then(get_number_from_value) {
                    state.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some(v) = op.operands.first().and_then(get_number_from_value) {
                    state.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some(v) = op.operands.first().and_then(get_number_from_value) {
                    state.horiz_scale = v / 100.0;
                }
            }
            "Ts" => {
                if let Some(v) = op.operands.first().and_then(get_number_from_value) {
                    state.text_rise = v;
                }
            }

            "Tj" => {
                if let Some(first) = op.operands.first() {
                    emit_show_string(first, backend, page_id, &mut state, &mut spans);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(arr)) = op.operands.first() {
                    handle_tj_array(arr, backend, page_id, &mut state, &mut spans);
                }
            }
            "'" => {
                state.translate_line(0.0, -state.leading);
                if let Some(first) = op.operands.first() {
                    emit_show_string(first, backend, page_id, &mut state, &mut spans);
                }
            }
            "\"" => {
                // " aw ac string  =>  set Tw, Tc, T*, Tj
                if op.operands.len() >= 3 {
                    if let Some(aw) = get_number_from_value(&op.operands[0]) {
                        state.word_spacing = aw;
                    }
                    if let Some(ac) = get_number_from_value(&op.operands[1]) {
                        state.char_spacing = ac;
                    }
                    state.translate_line(0.0, -state.leading);
                    emit_show_string(&op.operands[2], backend, page_id, &mut state, &mut spans);
                }
            }

            _ => { /* Ignore non-text operators */ }
        }
    }

    Ok(spans)
}

/// Decode an operand as a string, create a [`TextSpan`], and advance the
/// text position.  Shared by `Tj`, `'`, and `"` operators.
fn emit_show_string(
    operand: &PdfValue,
    backend: &dyn PdfBackend,
    page_id: PageId,
    state: &mut TextState,
    spans: &mut Vec<TextSpan>,
) {
    let text = decode_string(operand, backend, page_id, &state.font_key);
    if text.trim().is_empty() {
        advance_after_show(&text, state);
        return;
    }
    let span = TextSpan {
        text: text.clone(),
        x: state.x(),
        y: state.y() + state.text_rise,
        width: estimate_text_width(&text, state),
        font_size: state.effective_font_size(),
    };
    spans.push(span);
    advance_after_show(&text, state);
}

/// Process a `TJ` array: elements are either strings to render or numeric
/// kerning adjustments (in thousandths of a unit of text space).
fn handle_tj_array(
    arr: &[PdfValue],
    backend: &dyn PdfBackend,
    page_id: PageId,
    state: &mut TextState,
    spans: &mut Vec<TextSpan>,
) {
    // Accumulate fragments into a single span, inserting a space wherever a
    // kerning adjustment is large enough to look like a word gap.
    let mut buf = String::new();
    let mut span_x = state.x();
    let span_y = state.y() + state.text_rise;

    for elem in arr {
        match elem {
            PdfValue::Str(_) => {
                let fragment = decode_string(elem, backend, page_id, &state.font_key);
                if buf.is_empty() {
                    span_x = state.x();
                }
                buf.push_str(&fragment);
                advance_after_show(&fragment, state);
            }
            val => {
                // Negative adjustment = move right, positive = move left.
                if let Some(adj) = get_number_from_value(val) {
                    let dx = -adj / 1000.0 * state.font_size * state.horiz_scale;
                    let gap_threshold =
                        state.font_size * APPROX_CHAR_WIDTH_RATIO * state.horiz_scale * 0.3;
                    if dx > gap_threshold && !buf.is_empty() {
                        buf.push(' ');
                    }
                    state.advance_x(dx);
                }
            }
        }
    }

    let trimmed = buf.trim_end();
    if !trimmed.is_empty() {
        spans.push(TextSpan {
            text: trimmed.to_string(),
            x: span_x,
            y: span_y,
            width: estimate_text_width(trimmed, state),
            font_size: state.effective_font_size(),
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ContentOp;
    use std::collections::BTreeMap;

    /// Backend that replays a fixed operator list for every page.
    struct ScriptedBackend {
        ops: Vec<ContentOp>,
    }

    impl PdfBackend for ScriptedBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            let mut map = BTreeMap::new();
            map.insert(1, (1, 0));
            map
        }

        fn page_content(&self, _page: PageId) -> Result<Vec<u8>, PdfError> {
            Ok(Vec::new())
        }

        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
            Ok(self.ops.clone())
        }

        fn decode_text(&self, _page: PageId, _font: &[u8], bytes: &[u8]) -> String {
            String::from_utf8_lossy(bytes).into_owned()
        }
    }

    fn op(operator: &str, operands: Vec<PdfValue>) -> ContentOp {
        ContentOp {
            operator: operator.to_string(),
            operands,
        }
    }

    fn show(text: &str) -> ContentOp {
        op("Tj", vec![PdfValue::Str(text.as_bytes().to_vec())])
    }

    fn tf(size: f32) -> ContentOp {
        op(
            "Tf",
            vec![PdfValue::Name(b"F1".to_vec()), PdfValue::Real(size)],
        )
    }

    fn td(x: f32, y: f32) -> ContentOp {
        op("Td", vec![PdfValue::Real(x), PdfValue::Real(y)])
    }

    fn extract(ops: Vec<ContentOp>) -> Vec<TextSpan> {
        let backend = ScriptedBackend { ops };
        extract_page_spans(&backend, (1, 0)).unwrap()
    }

    #[test]
    fn tj_emits_span_at_current_position() {
        let spans = extract(vec![
            op("BT", vec![]),
            tf(10.0),
            td(72.0, 700.0),
            show("Hello"),
            op("ET", vec![]),
        ]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Hello");
        assert_eq!(spans[0].x, 72.0);
        assert_eq!(spans[0].y, 700.0);
        assert_eq!(spans[0].font_size, 10.0);
    }

    #[test]
    fn td_moves_between_spans() {
        let spans = extract(vec![
            op("BT", vec![]),
            tf(10.0),
            td(72.0, 700.0),
            show("A"),
            td(0.0, -20.0),
            show("B"),
        ]);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].y, 680.0);
        // Td translates relative to the line matrix, not the show position.
        assert_eq!(spans[1].x, 72.0);
    }

    #[test]
    fn showing_advances_x_within_a_line() {
        let spans = extract(vec![
            op("BT", vec![]),
            tf(10.0),
            td(0.0, 0.0),
            show("abcd"),
            show("e"),
        ]);
        assert_eq!(spans.len(), 2);
        // 4 chars * 10pt * 0.5 ratio = 20pt advance.
        assert_eq!(spans[1].x, 20.0);
    }

    #[test]
    fn t_star_applies_leading() {
        let spans = extract(vec![
            op("BT", vec![]),
            tf(10.0),
            op("TL", vec![PdfValue::Real(14.0)]),
            td(10.0, 100.0),
            show("first"),
            op("T*", vec![]),
            show("second"),
        ]);
        assert_eq!(spans[1].y, 86.0);
        assert_eq!(spans[1].x, 10.0);
    }

    #[test]
    fn tm_sets_absolute_position_and_scale() {
        let spans = extract(vec![
            op("BT", vec![]),
            tf(6.0),
            op(
                "Tm",
                vec![
                    PdfValue::Real(2.0),
                    PdfValue::Real(0.0),
                    PdfValue::Real(0.0),
                    PdfValue::Real(2.0),
                    PdfValue::Real(50.0),
                    PdfValue::Real(60.0),
                ],
            ),
            show("scaled"),
        ]);
        assert_eq!(spans[0].x, 50.0);
        assert_eq!(spans[0].y, 60.0);
        // Effective size doubles under the matrix scale.
        assert_eq!(spans[0].font_size, 12.0);
    }

    #[test]
    fn tj_array_joins_fragments_and_inserts_word_gaps() {
        let arr = vec![
            PdfValue::Str(b"Net".to_vec()),
            PdfValue::Real(-500.0), // large gap: half the font size
            PdfValue::Str(b"premium".to_vec()),
        ];
        let spans = extract(vec![
            op("BT", vec![]),
            tf(10.0),
            td(0.0, 0.0),
            op("TJ", vec![PdfValue::Array(arr)]),
        ]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Net premium");
    }

    #[test]
    fn tj_array_small_kerning_does_not_split_words() {
        let arr = vec![
            PdfValue::Str(b"To".to_vec()),
            PdfValue::Real(-10.0),
            PdfValue::Str(b"tal".to_vec()),
        ];
        let spans = extract(vec![
            op("BT", vec![]),
            tf(10.0),
            td(0.0, 0.0),
            op("TJ", vec![PdfValue::Array(arr)]),
        ]);
        assert_eq!(spans[0].text, "Total");
    }

    #[test]
    fn whitespace_only_show_is_skipped() {
        let spans = extract(vec![op("BT", vec![]), tf(10.0), show("   ")]);
        assert!(spans.is_empty());
    }

    #[test]
    fn quote_operator_moves_line_then_shows() {
        let spans = extract(vec![
            op("BT", vec![]),
            tf(10.0),
            op("TL", vec![PdfValue::Real(12.0)]),
            td(5.0, 50.0),
            op("'", vec![PdfValue::Str(b"next".to_vec())]),
        ]);
        assert_eq!(spans[0].y, 38.0);
    }

    #[test]
    fn text_rise_offsets_y() {
        let spans = extract(vec![
            op("BT", vec![]),
            tf(10.0),
            td(0.0, 100.0),
            op("Ts", vec![PdfValue::Real(3.0)]),
            show("super"),
        ]);
        assert_eq!(spans[0].y, 103.0);
    }
}
