//! Content stream decoding into positioned text spans.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object};

use crate::error::{Error, Result};

/// Approximate glyph advance as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// TJ adjustments larger than this (thousandths of an em) act as word spaces.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// A run of text drawn at one position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// Decoded text
    pub text: String,
    /// X position of the left edge (PDF user space)
    pub x: f32,
    /// Baseline Y position (PDF user space, bottom-up)
    pub y: f32,
    /// Estimated width
    pub width: f32,
    /// Effective font size in points
    pub font_size: f32,
}

impl TextSpan {
    /// Create a span, estimating its width from the character count.
    pub fn new(text: impl Into<String>, x: f32, y: f32, font_size: f32) -> Self {
        let text = text.into();
        let width = text.chars().count() as f32 * font_size * AVG_GLYPH_WIDTH;
        Self {
            text,
            x,
            y,
            width,
            font_size,
        }
    }

    /// Approximate top edge (baseline plus ascender).
    pub fn top(&self) -> f32 {
        self.y + self.font_size * 0.8
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Text state tracked while walking a content stream.
#[derive(Debug, Clone)]
struct TextState {
    matrix: [f32; 6],
    line_start: [f32; 6],
    leading: f32,
    font_size: f32,
    font: Vec<u8>,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: IDENTITY,
            line_start: IDENTITY,
            leading: 0.0,
            font_size: 12.0,
            font: Vec::new(),
        }
    }
}

const IDENTITY: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

impl TextState {
    fn begin_text(&mut self) {
        self.matrix = IDENTITY;
        self.line_start = IDENTITY;
    }

    fn set_matrix(&mut self, m: [f32; 6]) {
        self.matrix = m;
        self.line_start = m;
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        let [a, b, c, d, e, f] = self.line_start;
        self.line_start = [a, b, c, d, e + tx * a + ty * c, f + tx * b + ty * d];
        self.matrix = self.line_start;
    }

    fn next_line(&mut self) {
        let leading = if self.leading > 0.0 {
            self.leading
        } else {
            self.font_size * 1.2
        };
        self.move_line(0.0, -leading);
    }

    fn advance(&mut self, tx: f32) {
        let [a, b, ..] = self.matrix;
        self.matrix[4] += tx * a;
        self.matrix[5] += tx * b;
    }

    fn position(&self) -> (f32, f32) {
        (self.matrix[4], self.matrix[5])
    }

    fn scale(&self) -> f32 {
        let [a, _, c, ..] = self.matrix;
        let scale = (a * a + c * c).sqrt();
        if scale > 0.0 {
            scale
        } else {
            1.0
        }
    }
}

/// Decodes page content streams into text spans.
pub struct SpanDecoder<'a> {
    doc: &'a LopdfDocument,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
}

impl<'a> SpanDecoder<'a> {
    /// Prepare a decoder for one page given its font resources.
    pub fn for_page(doc: &'a LopdfDocument, fonts: BTreeMap<Vec<u8>, &'a Dictionary>) -> Self {
        Self { doc, fonts }
    }

    /// Decode the raw (decompressed) content stream.
    pub fn decode(&self, content: &[u8]) -> Result<Vec<TextSpan>> {
        let content = lopdf::content::Content::decode(content)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut spans = Vec::new();
        let mut state = TextState::default();
        let mut in_text = false;

        for op in content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "BT" => {
                    in_text = true;
                    state.begin_text();
                }
                "ET" => in_text = false,
                "Tf" if operands.len() >= 2 => {
                    if let Object::Name(name) = &operands[0] {
                        state.font = name.clone();
                    }
                    state.font_size = number(&operands[1]).unwrap_or(12.0);
                }
                "TL" => state.leading = operands.first().and_then(number).unwrap_or(0.0),
                "Td" | "TD" if operands.len() >= 2 => {
                    let tx = number(&operands[0]).unwrap_or(0.0);
                    let ty = number(&operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.move_line(tx, ty);
                }
                "Tm" if operands.len() >= 6 => {
                    let mut m = IDENTITY;
                    for (slot, operand) in m.iter_mut().zip(operands.iter()) {
                        *slot = number(operand).unwrap_or(*slot);
                    }
                    state.set_matrix(m);
                }
                "T*" => state.next_line(),
                "Tj" if in_text => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        let text = self.decode_bytes(&state.font, bytes);
                        self.push_span(&mut spans, &mut state, text);
                    }
                }
                "TJ" if in_text => {
                    if let Some(Object::Array(items)) = operands.first() {
                        let text = self.decode_array(&state.font, items);
                        self.push_span(&mut spans, &mut state, text);
                    }
                }
                "'" | "\"" => {
                    state.next_line();
                    let index = if op.operator == "\"" { 2 } else { 0 };
                    if in_text {
                        if let Some(Object::String(bytes, _)) = operands.get(index) {
                            let text = self.decode_bytes(&state.font, bytes);
                            self.push_span(&mut spans, &mut state, text);
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(spans)
    }

    fn push_span(&self, spans: &mut Vec<TextSpan>, state: &mut TextState, text: String) {
        let advance = text.chars().count() as f32 * state.font_size * AVG_GLYPH_WIDTH;
        if !text.trim().is_empty() {
            let (x, y) = state.position();
            spans.push(TextSpan::new(text, x, y, state.font_size * state.scale()));
        }
        state.advance(advance);
    }

    fn decode_bytes(&self, font: &[u8], bytes: &[u8]) -> String {
        self.fonts
            .get(font)
            .and_then(|dict| dict.get_font_encoding(self.doc).ok())
            .and_then(|encoding| LopdfDocument::decode_text(&encoding, bytes).ok())
            .unwrap_or_else(|| decode_text_simple(bytes))
    }

    /// Decode a TJ array, turning large negative kerning into word spaces.
    fn decode_array(&self, font: &[u8], items: &[Object]) -> String {
        let mut combined = String::new();
        for item in items {
            match item {
                Object::String(bytes, _) => combined.push_str(&self.decode_bytes(font, bytes)),
                other => {
                    let Some(adjustment) = number(other) else {
                        continue;
                    };
                    if -adjustment > TJ_SPACE_THRESHOLD && needs_space_after(&combined) {
                        combined.push(' ');
                    }
                }
            }
        }
        combined
    }
}

fn needs_space_after(text: &str) -> bool {
    match text.chars().last() {
        Some(c) => !c.is_whitespace() && !is_spaceless_script_char(c),
        None => false,
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Scripts written without spaces between words (Chinese, Japanese kana).
pub fn is_spaceless_script_char(c: char) -> bool {
    matches!(c as u32,
        0x3000..=0x303F   // CJK symbols and punctuation
        | 0x3040..=0x309F // Hiragana
        | 0x30A0..=0x30FF // Katakana
        | 0x3400..=0x4DBF // CJK extension A
        | 0x4E00..=0x9FFF // CJK unified ideographs
        | 0x20000..=0x2EBEF)
}

/// Decode string bytes without a font encoding: UTF-16BE with BOM, then
/// UTF-8, then Latin-1.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(stream: &str) -> Vec<TextSpan> {
        let doc = LopdfDocument::with_version("1.5");
        let decoder = SpanDecoder::for_page(&doc, BTreeMap::new());
        decoder.decode(stream.as_bytes()).unwrap()
    }

    #[test]
    fn test_decode_positions() {
        let spans = decode("BT /F1 12 Tf 72 700 Td (Hello) Tj 0 -14 Td (World) Tj ET");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Hello");
        assert_eq!((spans[0].x, spans[0].y), (72.0, 700.0));
        assert_eq!((spans[1].x, spans[1].y), (72.0, 686.0));
        assert_eq!(spans[1].font_size, 12.0);
    }

    #[test]
    fn test_text_matrix_scale() {
        let spans = decode("BT /F1 1 Tf 10 0 0 10 50 400 Tm (Big) Tj ET");
        assert_eq!(spans[0].font_size, 10.0);
        assert_eq!((spans[0].x, spans[0].y), (50.0, 400.0));
    }

    #[test]
    fn test_leading_and_next_line() {
        let spans = decode("BT /F1 10 Tf 16 TL 72 700 Td (One) Tj T* (Two) Tj ET");
        assert_eq!(spans[1].y, 684.0);
        assert_eq!(spans[1].x, 72.0);
    }

    #[test]
    fn test_tj_array_word_spacing() {
        let spans = decode("BT /F1 12 Tf 72 700 Td [(Hello) -250 (world) -20 (!)] TJ ET");
        assert_eq!(spans[0].text, "Hello world!");
    }

    #[test]
    fn test_consecutive_tj_advance() {
        let spans = decode("BT /F1 10 Tf 0 0 Td (ab) Tj (cd) Tj ET");
        assert_eq!(spans[0].x, 0.0);
        assert_eq!(spans[1].x, 10.0);
    }

    #[test]
    fn test_text_outside_bt_ignored() {
        let spans = decode("(stray) Tj BT /F1 12 Tf (kept) Tj ET");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "kept");
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
        assert_eq!(decode_text_simple(&[0x48, 0x65, 0x6C, 0x6C, 0xE9]), "Hellé");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]), "Hi");
    }

    #[test]
    fn test_spaceless_scripts() {
        assert!(is_spaceless_script_char('漢'));
        assert!(is_spaceless_script_char('か'));
        assert!(!is_spaceless_script_char('한'));
        assert!(!is_spaceless_script_char('a'));
    }
}
