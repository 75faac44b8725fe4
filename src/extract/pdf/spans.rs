//! Positioned text spans from page content streams.
//!
//! The walker follows the text operators of a content stream (`BT`, `Tf`,
//! `Td`, `Tm`, `Tj`, `TJ` and friends), tracking the text matrix so every
//! drawn string gets a page position. Spans are then grouped into lines by
//! baseline and read top to bottom, left to right.

use std::cmp::Ordering;

use super::backend::{ContentOp, PageId, PdfBackend, PdfValue};
use crate::error::Result;

/// Kerning adjustment (thousandths of an em) that reads as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;
const DEFAULT_LEADING: f32 = 12.0;

/// A string drawn at a position on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    /// Left edge
    pub x: f32,
    /// Baseline
    pub y: f32,
    /// Estimated advance width
    pub width: f32,
    pub font_size: f32,
}

impl TextSpan {
    pub fn new(text: impl Into<String>, x: f32, y: f32, font_size: f32) -> Self {
        let text = text.into();
        // no glyph metrics here; half an em per character is close enough
        // to decide word gaps
        let width = text.chars().count() as f32 * font_size * 0.5;
        Self {
            text,
            x,
            y,
            width,
            font_size,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            leading: DEFAULT_LEADING,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        self.translate(0.0, -self.leading);
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Walk one page's content stream and collect its text spans.
pub fn page_spans<B: PdfBackend>(backend: &B, page: PageId) -> Result<Vec<TextSpan>> {
    let content = backend.page_content(page)?;
    if content.is_empty() {
        return Ok(Vec::new());
    }
    let ops = backend.decode_content(&content)?;
    Ok(SpanWalker::new(backend, page).run(&ops))
}

struct SpanWalker<'a, B: PdfBackend> {
    backend: &'a B,
    page: PageId,
    font: Vec<u8>,
    font_size: f32,
    matrix: TextMatrix,
    in_text: bool,
    spans: Vec<TextSpan>,
}

impl<'a, B: PdfBackend> SpanWalker<'a, B> {
    fn new(backend: &'a B, page: PageId) -> Self {
        Self {
            backend,
            page,
            font: Vec::new(),
            font_size: 12.0,
            matrix: TextMatrix::default(),
            in_text: false,
            spans: Vec::new(),
        }
    }

    fn run(mut self, ops: &[ContentOp]) -> Vec<TextSpan> {
        for op in ops {
            match op.operator.as_str() {
                "BT" => {
                    self.in_text = true;
                    let leading = self.matrix.leading;
                    self.matrix = TextMatrix {
                        leading,
                        ..TextMatrix::default()
                    };
                }
                "ET" => self.in_text = false,
                "Tf" => {
                    if let Some(PdfValue::Name(name)) = op.operands.first() {
                        self.font = name.clone();
                    }
                    self.font_size = op.number(1, 12.0);
                }
                "TL" => self.matrix.leading = op.number(0, DEFAULT_LEADING),
                "Td" => self.matrix.translate(op.number(0, 0.0), op.number(1, 0.0)),
                "TD" => {
                    let ty = op.number(1, 0.0);
                    self.matrix.leading = -ty;
                    self.matrix.translate(op.number(0, 0.0), ty);
                }
                "Tm" => self.matrix.set(
                    op.number(0, 1.0),
                    op.number(1, 0.0),
                    op.number(2, 0.0),
                    op.number(3, 1.0),
                    op.number(4, 0.0),
                    op.number(5, 0.0),
                ),
                "T*" => self.matrix.next_line(),
                "Tj" => {
                    if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                        let text = self.decode(bytes);
                        self.push(text);
                    }
                }
                "TJ" => {
                    if let Some(PdfValue::Array(items)) = op.operands.first() {
                        let text = self.decode_array(items);
                        self.push(text);
                    }
                }
                "'" | "\"" => {
                    self.matrix.next_line();
                    let index = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(PdfValue::Str(bytes)) = op.operands.get(index) {
                        let text = self.decode(bytes);
                        self.push(text);
                    }
                }
                _ => {}
            }
        }
        self.spans
    }

    fn decode(&self, bytes: &[u8]) -> String {
        self.backend.decode_text(self.page, &self.font, bytes)
    }

    /// `TJ` arrays mix strings with kerning numbers; large negative
    /// adjustments are word gaps.
    fn decode_array(&self, items: &[PdfValue]) -> String {
        let mut combined = String::new();
        for item in items {
            match item {
                PdfValue::Str(bytes) => combined.push_str(&self.decode(bytes)),
                other => {
                    let Some(n) = other.as_number() else { continue };
                    if -n > TJ_SPACE_THRESHOLD && needs_space_after(&combined) {
                        combined.push(' ');
                    }
                }
            }
        }
        combined
    }

    fn push(&mut self, text: String) {
        if !self.in_text || text.trim().is_empty() {
            return;
        }
        let (x, y) = self.matrix.position();
        let size = self.font_size * self.matrix.scale();
        self.spans.push(TextSpan::new(text, x, y, size));
    }
}

fn needs_space_after(text: &str) -> bool {
    match text.chars().last() {
        Some(c) => !c.is_whitespace() && !is_spaceless_script_char(c),
        None => false,
    }
}

/// Chinese and Japanese scripts run words together without spaces.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        || (0x3040..=0x30FF).contains(&code)
        || (0x3000..=0x303F).contains(&code)
}

/// Order spans top to bottom, then left to right.
pub(crate) fn reading_order(a: &TextSpan, b: &TextSpan) -> Ordering {
    b.y.partial_cmp(&a.y)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
}

/// Group spans sharing a baseline into lines, in reading order.
pub fn group_into_lines(mut spans: Vec<TextSpan>) -> Vec<Vec<TextSpan>> {
    spans.sort_by(reading_order);

    let mut lines: Vec<Vec<TextSpan>> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let tolerance = span.font_size * 0.3;
        match current_y {
            Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    for line in &mut lines {
        line.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
    }
    lines
}

/// Join a line's spans, inserting a space where the horizontal gap
/// between them is wider than a fifth of a character.
pub fn line_text(line: &[TextSpan]) -> String {
    let mut out = String::new();
    for (i, span) in line.iter().enumerate() {
        if i > 0 {
            let prev = &line[i - 1];
            let gap = span.x - prev.right();
            let threshold = span.font_size * 0.1;
            let joined_script = prev.text.chars().last().is_some_and(is_spaceless_script_char)
                && span.text.chars().next().is_some_and(is_spaceless_script_char);
            if gap > threshold
                && !joined_script
                && needs_space_after(&out)
                && !span.text.starts_with(char::is_whitespace)
            {
                out.push(' ');
            }
        }
        out.push_str(&span.text);
    }
    out
}

/// Page text: one output line per baseline.
pub fn spans_to_text(spans: Vec<TextSpan>) -> String {
    group_into_lines(spans)
        .iter()
        .map(|line| line_text(line))
        .map(|line| line.trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// Backend serving a fixed operation list for page (1, 0).
    struct OpsBackend(Vec<ContentOp>);

    impl PdfBackend for OpsBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            BTreeMap::from([(1, (1, 0))])
        }
        fn page_content(&self, _page: PageId) -> Result<Vec<u8>> {
            Ok(b"ops".to_vec())
        }
        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>> {
            Ok(self.0.clone())
        }
        fn decode_text(&self, _page: PageId, _font: &[u8], bytes: &[u8]) -> String {
            String::from_utf8_lossy(bytes).into_owned()
        }
        fn plain_text(&self, _page_number: u32) -> Result<String> {
            Ok(String::new())
        }
    }

    fn op(operator: &str, operands: Vec<PdfValue>) -> ContentOp {
        ContentOp {
            operator: operator.to_string(),
            operands,
        }
    }

    fn s(text: &str) -> PdfValue {
        PdfValue::Str(text.as_bytes().to_vec())
    }

    fn int(n: i64) -> PdfValue {
        PdfValue::Integer(n)
    }

    #[test]
    fn test_walker_positions_and_tj_spacing() {
        let backend = OpsBackend(vec![
            op("BT", vec![]),
            op("Tf", vec![PdfValue::Name(b"F1".to_vec()), int(10)]),
            op("Td", vec![int(72), int(700)]),
            op("Tj", vec![s("First")]),
            op("T*", vec![]),
            op("TJ", vec![PdfValue::Array(vec![s("two"), int(-300), s("words")])]),
            op("ET", vec![]),
            op("Tj", vec![s("outside")]),
        ]);
        let spans = page_spans(&backend, (1, 0)).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].x, spans[0].y), (72.0, 700.0));
        assert_eq!(spans[0].font_size, 10.0);
        assert_eq!(spans[1].text, "two words");
        assert_eq!(spans[1].y, 688.0);
    }

    #[test]
    fn test_td_sets_leading() {
        let backend = OpsBackend(vec![
            op("BT", vec![]),
            op("TD", vec![int(50), int(-20)]),
            op("Tj", vec![s("a")]),
            op("T*", vec![]),
            op("Tj", vec![s("b")]),
            op("ET", vec![]),
        ]);
        let spans = page_spans(&backend, (1, 0)).unwrap();
        assert_eq!(spans[0].y, -20.0);
        assert_eq!(spans[1].y, -40.0);
    }

    #[test]
    fn test_lines_top_to_bottom_left_to_right() {
        let spans = vec![
            TextSpan::new("world", 110.0, 700.0, 12.0),
            TextSpan::new("Second line", 72.0, 680.0, 12.0),
            TextSpan::new("Hello", 72.0, 700.5, 12.0),
        ];
        assert_eq!(spans_to_text(spans), "Hello world\nSecond line");
    }

    #[test]
    fn test_adjacent_spans_not_split() {
        let line = vec![
            TextSpan::new("Hel", 72.0, 700.0, 10.0),
            TextSpan::new("lo", 87.0, 700.0, 10.0),
        ];
        assert_eq!(line_text(&line), "Hello");
    }

    #[test]
    fn test_no_space_between_ideographs() {
        let line = vec![
            TextSpan::new("\u{4E2D}", 72.0, 700.0, 10.0),
            TextSpan::new("\u{6587}", 100.0, 700.0, 10.0),
        ];
        assert_eq!(line_text(&line), "\u{4E2D}\u{6587}");
    }
}
