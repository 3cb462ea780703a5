use std::collections::BTreeMap;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object};

use crate::{PageId, PdfError};

/// A `TJ` kerning adjustment at or below this value (thousandths of an em,
/// negative = rightward gap) is rendered as a word gap by most generators.
const TJ_WORD_GAP: f32 = -100.0;

// ---------------------------------------------------------------------------
// Page text extraction
// ---------------------------------------------------------------------------

/// Walk a page's content stream and collect the text it shows, as one
/// flat string.
///
/// This is a deliberately small reading of the PDF text operators -- no
/// geometry, no font metrics, no layout reconstruction. Classification only
/// needs the words, so the extractor tracks just enough cursor state to
/// decide whether a position move is a line break (newline) or an in-line
/// hop (space):
///
/// | Operator | Action |
/// |----------|--------|
/// | `BT`     | Begin text object -- reset the cursor |
/// | `Tf`     | Select font (drives string decoding) |
/// | `Tm`     | Set text matrix; vertical jump becomes a newline |
/// | `Td`/`TD`| Translate; non-zero `ty` becomes a newline, else a space |
/// | `TL`     | Set leading |
/// | `T*`     | Next line |
/// | `Tj`     | Show a string |
/// | `TJ`     | Show strings with kerning; large gaps become spaces |
/// | `'`, `"` | Next line, then show |
pub(crate) fn extract_page_text(doc: &Document, page_id: PageId) -> Result<String, PdfError> {
    let raw = doc
        .get_page_content(page_id)
        .map_err(|e| PdfError::Parse(format!("cannot get page content: {e}")))?;
    let content = Content::decode(&raw)
        .map_err(|e| PdfError::Parse(format!("content stream decode error: {e}")))?;
    let fonts = doc.get_page_fonts(page_id).unwrap_or_default();

    let mut out = String::new();
    let mut cursor = Cursor::default();
    let mut font_key: Option<Vec<u8>> = None;

    for op in &content.operations {
        match op.operator.as_str() {
            "BT" => cursor.reset(),

            "Tf" => {
                if let Some(name) = op.operands.first().and_then(|o| o.as_name().ok()) {
                    font_key = Some(name.to_vec());
                }
            }

            "Tm" => {
                // Only the translation components matter for separator
                // decisions.
                if op.operands.len() >= 6 {
                    let x = number(&op.operands[4]).unwrap_or(0.0);
                    let y = number(&op.operands[5]).unwrap_or(0.0);
                    cursor.jump_to(x, y);
                }
            }
            "Td" | "TD" => {
                if op.operands.len() >= 2 {
                    let tx = number(&op.operands[0]).unwrap_or(0.0);
                    let ty = number(&op.operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        cursor.leading = -ty;
                    }
                    cursor.translate(tx, ty);
                }
            }
            "TL" => {
                if let Some(v) = op.operands.first().and_then(number) {
                    cursor.leading = v;
                }
            }
            "T*" => cursor.next_line(),

            "Tj" => {
                if let Some(first) = op.operands.first() {
                    show(first, &fonts, font_key.as_deref(), &mut cursor, &mut out);
                }
            }
            "TJ" => {
                if let Some(Object::Array(parts)) = op.operands.first() {
                    for part in parts {
                        match part {
                            Object::String(..) => {
                                show(part, &fonts, font_key.as_deref(), &mut cursor, &mut out)
                            }
                            other => {
                                if number(other).is_some_and(|adj| adj <= TJ_WORD_GAP) {
                                    cursor.pending_space();
                                }
                            }
                        }
                    }
                }
            }
            "'" => {
                cursor.next_line();
                if let Some(first) = op.operands.first() {
                    show(first, &fonts, font_key.as_deref(), &mut cursor, &mut out);
                }
            }
            "\"" => {
                // " aw ac string  =>  set spacing, next line, show. Spacing
                // does not affect extraction.
                cursor.next_line();
                if let Some(third) = op.operands.get(2) {
                    show(third, &fonts, font_key.as_deref(), &mut cursor, &mut out);
                }
            }

            _ => { /* Ignore non-text operators */ }
        }
    }

    Ok(out)
}

/// Decode one shown string and append it, flushing any pending separator.
fn show(
    operand: &Object,
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
    font_key: Option<&[u8]>,
    cursor: &mut Cursor,
    out: &mut String,
) {
    let Object::String(bytes, _) = operand else {
        return;
    };
    let decoded = decode_string(fonts, font_key, bytes);
    if decoded.is_empty() {
        return;
    }
    if let Some(sep) = cursor.take_separator() {
        if !out.is_empty() {
            out.push(sep);
        }
    }
    out.push_str(&decoded);
}

// ---------------------------------------------------------------------------
// Cursor state
// ---------------------------------------------------------------------------

/// Minimal text-positioning state: enough to classify each move as a line
/// break or an in-line hop, emitted lazily before the next shown string.
#[derive(Debug, Default)]
struct Cursor {
    y: f32,
    leading: f32,
    separator: Option<char>,
}

impl Cursor {
    fn reset(&mut self) {
        self.y = 0.0;
    }

    fn jump_to(&mut self, _x: f32, y: f32) {
        if (y - self.y).abs() > f32::EPSILON {
            self.separator = Some('\n');
        } else {
            self.separator.get_or_insert(' ');
        }
        self.y = y;
    }

    fn translate(&mut self, _tx: f32, ty: f32) {
        if ty != 0.0 {
            self.separator = Some('\n');
        } else {
            self.separator.get_or_insert(' ');
        }
        self.y += ty;
    }

    fn next_line(&mut self) {
        self.y -= self.leading;
        self.separator = Some('\n');
    }

    fn pending_space(&mut self) {
        self.separator.get_or_insert(' ');
    }

    fn take_separator(&mut self) -> Option<char> {
        self.separator.take()
    }
}

// ---------------------------------------------------------------------------
// String decoding
// ---------------------------------------------------------------------------

/// Decode raw string bytes from a text-showing operator.
///
/// Fonts declaring an `Identity` encoding carry 2-byte CID codes, tried as
/// UTF-16BE first; everything else goes through the generic heuristic.
fn decode_string(
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
    font_key: Option<&[u8]>,
    bytes: &[u8],
) -> String {
    if let Some(enc) = font_key.and_then(|key| font_encoding(fonts, key)) {
        if enc.contains("Identity") && bytes.len() >= 2 && bytes.len() % 2 == 0 {
            let code_units: Vec<u16> = bytes
                .chunks(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .collect();
            let decoded = String::from_utf16_lossy(&code_units);
            if !decoded.is_empty() && !decoded.chars().all(|c| c == '\u{FFFD}' || c == '\0') {
                return decoded;
            }
        }
    }

    decode_bytes_simple(bytes)
}

/// Best-effort decoding of raw PDF string bytes into a Rust `String`:
/// UTF-16BE with BOM, then valid UTF-8, then Latin-1 byte mapping.
fn decode_bytes_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let code_units: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter(|chunk| chunk.len() == 2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        return String::from_utf16_lossy(&code_units);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    bytes.iter().map(|&b| b as char).collect()
}

/// Encoding name declared by the font, if any.
fn font_encoding(fonts: &BTreeMap<Vec<u8>, &Dictionary>, key: &[u8]) -> Option<String> {
    let dict = fonts.get(key)?;
    match dict.get(b"Encoding").ok()? {
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

/// Extract an `f32` from an operand, accepting both `Integer` and `Real`.
fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(f) => Some(*f),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Operation;
    use lopdf::{dictionary, Stream};

    /// One-page document with the given content operations.
    fn doc_with_ops(operations: Vec<Operation>) -> (Document, PageId) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        (doc, page_id)
    }

    fn tj(text: &str) -> Operation {
        Operation::new("Tj", vec![Object::string_literal(text)])
    }

    // -- extract_page_text --------------------------------------------------

    #[test]
    fn single_string() {
        let (doc, page) = doc_with_ops(vec![
            Operation::new("BT", vec![]),
            tj("Shadowfax AWB 123"),
            Operation::new("ET", vec![]),
        ]);
        assert_eq!(extract_page_text(&doc, page).unwrap(), "Shadowfax AWB 123");
    }

    #[test]
    fn vertical_move_becomes_newline() {
        let (doc, page) = doc_with_ops(vec![
            Operation::new("BT", vec![]),
            tj("line one"),
            Operation::new("Td", vec![0.into(), Object::Real(-14.0)]),
            tj("line two"),
            Operation::new("ET", vec![]),
        ]);
        assert_eq!(extract_page_text(&doc, page).unwrap(), "line one\nline two");
    }

    #[test]
    fn horizontal_move_becomes_space() {
        // Two words positioned separately on the same baseline must not be
        // glued together, or multi-word patterns would never match.
        let (doc, page) = doc_with_ops(vec![
            Operation::new("BT", vec![]),
            tj("Xpress"),
            Operation::new("Td", vec![40.into(), 0.into()]),
            tj("Bees"),
            Operation::new("ET", vec![]),
        ]);
        assert_eq!(extract_page_text(&doc, page).unwrap(), "Xpress Bees");
    }

    #[test]
    fn tj_array_inserts_word_gaps() {
        let parts = vec![
            Object::string_literal("Size:"),
            Object::Integer(-250),
            Object::string_literal("M"),
        ];
        let (doc, page) = doc_with_ops(vec![
            Operation::new("BT", vec![]),
            Operation::new("TJ", vec![Object::Array(parts)]),
            Operation::new("ET", vec![]),
        ]);
        assert_eq!(extract_page_text(&doc, page).unwrap(), "Size: M");
    }

    #[test]
    fn tj_array_small_kerning_is_not_a_gap() {
        let parts = vec![
            Object::string_literal("Sha"),
            Object::Integer(-20),
            Object::string_literal("dowfax"),
        ];
        let (doc, page) = doc_with_ops(vec![
            Operation::new("BT", vec![]),
            Operation::new("TJ", vec![Object::Array(parts)]),
            Operation::new("ET", vec![]),
        ]);
        assert_eq!(extract_page_text(&doc, page).unwrap(), "Shadowfax");
    }

    #[test]
    fn t_star_breaks_line() {
        let (doc, page) = doc_with_ops(vec![
            Operation::new("BT", vec![]),
            Operation::new("TL", vec![14.into()]),
            tj("first"),
            Operation::new("T*", vec![]),
            tj("second"),
            Operation::new("ET", vec![]),
        ]);
        assert_eq!(extract_page_text(&doc, page).unwrap(), "first\nsecond");
    }

    #[test]
    fn empty_content_yields_empty_string() {
        let (doc, page) = doc_with_ops(vec![]);
        assert_eq!(extract_page_text(&doc, page).unwrap(), "");
    }

    #[test]
    fn leading_separator_is_not_emitted() {
        let (doc, page) = doc_with_ops(vec![
            Operation::new("BT", vec![]),
            Operation::new("Td", vec![50.into(), 700.into()]),
            tj("only"),
            Operation::new("ET", vec![]),
        ]);
        assert_eq!(extract_page_text(&doc, page).unwrap(), "only");
    }

    // -- decode_bytes_simple ------------------------------------------------

    #[test]
    fn decode_utf8() {
        assert_eq!(decode_bytes_simple(b"Hello, world!"), "Hello, world!");
    }

    #[test]
    fn decode_latin1_fallback() {
        // 0xE9 is U+00E9 in Latin-1 but not valid standalone UTF-8.
        assert_eq!(decode_bytes_simple(&[0x63, 0x61, 0x66, 0xE9]), "caf\u{00E9}");
    }

    #[test]
    fn decode_utf16be_with_bom() {
        assert_eq!(
            decode_bytes_simple(&[0xFE, 0xFF, 0x00, 0x41, 0x00, 0x42]),
            "AB"
        );
    }

    #[test]
    fn decode_empty() {
        assert_eq!(decode_bytes_simple(&[]), "");
    }
}
