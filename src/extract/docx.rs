//! Word-processor (`.docx`) extraction.
//!
//! The body is walked once in document order. Paragraphs and tables are
//! appended to their own lists and a [`BlockRef`] records where each one
//! sits, so renderers can interleave them again.

use super::ooxml::{Package, XmlElement};
use super::FormatExtractor;
use crate::error::{Error, Result};
use crate::model::{BlockRef, ContentModel, FormatContent, Heading, Metadata, Paragraph, Table};
use std::collections::HashMap;
use std::path::Path;

const DEFAULT_STYLE: &str = "Normal";

/// Extractor for Word documents.
#[derive(Debug, Clone, Default)]
pub struct DocxExtractor {
    _private: (),
}

impl DocxExtractor {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl FormatExtractor for DocxExtractor {
    fn name(&self) -> &str {
        "docx"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["docx"]
    }

    fn extract(&self, path: &Path) -> Result<ContentModel> {
        let mut package = Package::open(path)?;
        let document = package
            .read_xml("word/document.xml")?
            .ok_or_else(|| Error::MissingPart("word/document.xml".to_string()))?;
        let styles = match package.read_xml("word/styles.xml") {
            Ok(Some(root)) => style_names(&root),
            Ok(None) => HashMap::new(),
            Err(err) => {
                log::warn!("Ignoring unreadable styles part: {}", err);
                HashMap::new()
            }
        };

        let body = document
            .child("body")
            .ok_or_else(|| Error::MissingPart("word/document.xml body".to_string()))?;

        let mut builder = BodyBuilder::new(&styles);
        builder.walk(body);
        let model = builder.finish();
        log::debug!(
            "docx: {} paragraphs, {} tables",
            model.paragraphs.len(),
            model.tables.len()
        );
        Ok(model)
    }
}

/// Map style ids to display names (`Heading1` -> `Heading 1`).
fn style_names(styles: &XmlElement) -> HashMap<String, String> {
    styles
        .children_named("style")
        .filter_map(|style| {
            let id = style.attr("styleId")?;
            let name = style.child("name").and_then(|n| n.attr("val"))?;
            Some((id.to_string(), display_name(name)))
        })
        .collect()
}

/// Built-in style names are stored lower-case (`heading 1`).
fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

struct BodyBuilder<'a> {
    styles: &'a HashMap<String, String>,
    model: ContentModel,
    order: Vec<BlockRef>,
    texts: Vec<String>,
}

impl<'a> BodyBuilder<'a> {
    fn new(styles: &'a HashMap<String, String>) -> Self {
        Self {
            styles,
            model: ContentModel::new(FormatContent::Document { order: Vec::new() }),
            order: Vec::new(),
            texts: Vec::new(),
        }
    }

    fn walk(&mut self, container: &XmlElement) {
        for el in container.elements() {
            match el.name.as_str() {
                "p" => self.paragraph(el),
                "tbl" => self.table(el),
                // content controls wrap ordinary body elements
                "sdt" => {
                    if let Some(content) = el.child("sdtContent") {
                        self.walk(content);
                    }
                }
                _ => {}
            }
        }
    }

    fn paragraph(&mut self, p: &XmlElement) {
        let text = paragraph_text(p);
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let style = p
            .path(&["pPr", "pStyle"])
            .and_then(|s| s.attr("val"))
            .map(|id| self.styles.get(id).cloned().unwrap_or_else(|| id.to_string()))
            .unwrap_or_else(|| DEFAULT_STYLE.to_string());

        let paragraph = Paragraph::new(text, style);
        if let Some(level) = paragraph.heading_level() {
            self.model.headings.push(Heading::new(level, text));
        }
        self.texts.push(text.to_string());
        self.order.push(BlockRef::Paragraph(self.model.paragraphs.len()));
        self.model.paragraphs.push(paragraph);
    }

    fn table(&mut self, tbl: &XmlElement) {
        match table_rows(tbl) {
            Ok(rows) if !rows.is_empty() => {
                self.order.push(BlockRef::Table(self.model.tables.len()));
                self.model.tables.push(Table::from_rows(rows));
            }
            Ok(_) => log::debug!("Skipping table without rows"),
            Err(err) => log::warn!("Skipping unreadable table: {}", err),
        }
    }

    fn finish(mut self) -> ContentModel {
        self.model.text = self.texts.join("\n\n");
        self.model.metadata = Metadata {
            paragraph_count: Some(self.model.paragraphs.len()),
            table_count: Some(self.model.tables.len()),
            heading_count: Some(self.model.headings.len()),
            word_count: Some(self.model.word_count()),
            ..Metadata::default()
        };
        self.model.body = FormatContent::Document { order: self.order };
        self.model
    }
}

/// Visible text of a paragraph: runs, tabs and breaks, including runs
/// nested in hyperlinks or tracked insertions.
fn paragraph_text(p: &XmlElement) -> String {
    let mut out = String::new();
    push_run_text(p, &mut out);
    out
}

fn push_run_text(el: &XmlElement, out: &mut String) {
    for child in el.elements() {
        match child.name.as_str() {
            "t" => out.push_str(&child.text()),
            "tab" => out.push('\t'),
            "br" | "cr" => out.push('\n'),
            // deleted text and field instructions are not visible
            "del" | "instrText" | "pPr" | "rPr" => {}
            _ => push_run_text(child, out),
        }
    }
}

/// Word tables have at most 63 grid columns.
const MAX_GRID_COLUMNS: usize = 63;

/// Cell text per row. Cells spanning several grid columns repeat their
/// text, and vertically merged continuation cells take the text above.
fn table_rows(tbl: &XmlElement) -> Result<Vec<Vec<String>>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    for tr in tbl.children_named("tr") {
        let mut row = Vec::new();
        for tc in tr.children_named("tc") {
            let props = tc.child("tcPr");
            let span = match props.and_then(|p| p.child("gridSpan")).and_then(|g| g.attr("val")) {
                Some(val) => val
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|&n| n <= MAX_GRID_COLUMNS)
                    .ok_or_else(|| Error::Xml(format!("invalid gridSpan '{}'", val)))?
                    .max(1),
                None => 1,
            };
            let continues_merge = props
                .and_then(|p| p.child("vMerge"))
                .map(|m| m.attr("val") != Some("restart"))
                .unwrap_or(false);

            let text = if continues_merge {
                rows.last()
                    .and_then(|above| above.get(row.len()))
                    .cloned()
                    .unwrap_or_default()
            } else {
                cell_text(tc)
            };
            for _ in 0..span {
                row.push(text.clone());
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

fn cell_text(tc: &XmlElement) -> String {
    tc.children_named("p")
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ooxml::parse_xml;

    const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn body(inner: &str) -> XmlElement {
        parse_xml(&format!("<w:body {}>{}</w:body>", W, inner)).unwrap()
    }

    fn styles() -> HashMap<String, String> {
        let xml = format!(
            r#"<w:styles {}>
                <w:style w:styleId="Heading2"><w:name w:val="heading 2"/></w:style>
                <w:style w:styleId="Title"><w:name w:val="Title"/></w:style>
            </w:styles>"#,
            W
        );
        style_names(&parse_xml(&xml).unwrap())
    }

    #[test]
    fn test_style_names() {
        let styles = styles();
        assert_eq!(styles["Heading2"], "Heading 2");
        assert_eq!(styles["Title"], "Title");
    }

    #[test]
    fn test_document_order_and_headings() {
        let styles = styles();
        let body = body(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr><w:r><w:t>Intro</w:t></w:r></w:p>
               <w:tbl>
                 <w:tr><w:tc><w:p><w:r><w:t>A</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>B</w:t></w:r></w:p></w:tc></w:tr>
                 <w:tr><w:tc><w:p><w:r><w:t>1</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>2</w:t></w:r></w:p></w:tc></w:tr>
               </w:tbl>
               <w:p><w:r><w:t xml:space="preserve">Closing </w:t></w:r><w:r><w:t>words</w:t></w:r></w:p>
               <w:p><w:r><w:t>   </w:t></w:r></w:p>"#,
        );
        let mut builder = BodyBuilder::new(&styles);
        builder.walk(&body);
        let model = builder.finish();

        assert_eq!(model.paragraphs.len(), 2);
        assert_eq!(model.paragraphs[0].style_label, "Heading 2");
        assert_eq!(model.paragraphs[1].style_label, "Normal");
        assert_eq!(model.paragraphs[1].text, "Closing words");
        assert_eq!(model.headings, vec![Heading::new(2, "Intro")]);
        assert_eq!(model.tables[0].headers, vec!["A", "B"]);
        assert_eq!(model.tables[0].rows[0], model.tables[0].headers);
        assert_eq!(model.text, "Intro\n\nClosing words");
        assert_eq!(model.metadata.word_count, Some(3));
        match &model.body {
            FormatContent::Document { order } => assert_eq!(
                order,
                &vec![BlockRef::Paragraph(0), BlockRef::Table(0), BlockRef::Paragraph(1)]
            ),
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[test]
    fn test_unknown_style_id_used_verbatim() {
        let styles = HashMap::new();
        let body = body(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading3"/></w:pPr><w:r><w:t>Deep</w:t></w:r></w:p>"#,
        );
        let mut builder = BodyBuilder::new(&styles);
        builder.walk(&body);
        let model = builder.finish();
        assert_eq!(model.paragraphs[0].style_label, "Heading3");
        assert_eq!(model.headings[0].level, 3);
    }

    #[test]
    fn test_grid_span_and_vertical_merge() {
        let tbl = parse_xml(&format!(
            r#"<w:tbl {}>
                <w:tr>
                  <w:tc><w:tcPr><w:gridSpan w:val="2"/></w:tcPr><w:p><w:r><w:t>Wide</w:t></w:r></w:p></w:tc>
                  <w:tc><w:tcPr><w:vMerge w:val="restart"/></w:tcPr><w:p><w:r><w:t>Tall</w:t></w:r></w:p></w:tc>
                </w:tr>
                <w:tr>
                  <w:tc><w:p><w:r><w:t>a</w:t></w:r></w:p></w:tc>
                  <w:tc><w:p><w:r><w:t>b</w:t></w:r></w:p></w:tc>
                  <w:tc><w:tcPr><w:vMerge/></w:tcPr><w:p/></w:tc>
                </w:tr>
            </w:tbl>"#,
            W
        ))
        .unwrap();
        let rows = table_rows(&tbl).unwrap();
        assert_eq!(rows[0], vec!["Wide", "Wide", "Tall"]);
        assert_eq!(rows[1], vec!["a", "b", "Tall"]);
    }

    #[test]
    fn test_bad_table_dropped_document_kept() {
        let styles = HashMap::new();
        let body = body(
            r#"<w:tbl><w:tr><w:tc><w:tcPr><w:gridSpan w:val="two"/></w:tcPr><w:p/></w:tc></w:tr></w:tbl>
               <w:p><w:r><w:t>Survivor</w:t></w:r></w:p>"#,
        );
        let mut builder = BodyBuilder::new(&styles);
        builder.walk(&body);
        let model = builder.finish();
        assert!(model.tables.is_empty());
        assert_eq!(model.paragraphs[0].text, "Survivor");
    }

    #[test]
    fn test_oversized_grid_span_drops_table() {
        let styles = HashMap::new();
        let body = body(
            r#"<w:tbl><w:tr><w:tc><w:tcPr><w:gridSpan w:val="5000000"/></w:tcPr><w:p><w:r><w:t>x</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
               <w:p><w:r><w:t>Survivor</w:t></w:r></w:p>"#,
        );
        let mut builder = BodyBuilder::new(&styles);
        builder.walk(&body);
        let model = builder.finish();
        assert!(model.tables.is_empty());
        assert_eq!(model.paragraphs[0].text, "Survivor");
    }

    #[test]
    fn test_grid_span_at_limit() {
        let tbl = parse_xml(&format!(
            r#"<w:tbl {}><w:tr><w:tc><w:tcPr><w:gridSpan w:val="63"/></w:tcPr><w:p/></w:tc></w:tr></w:tbl>"#,
            W
        ))
        .unwrap();
        assert_eq!(table_rows(&tbl).unwrap()[0].len(), 63);
    }

    #[test]
    fn test_tabs_breaks_and_hyperlinks() {
        let p = parse_xml(&format!(
            r#"<w:p {}><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/></w:r><w:hyperlink><w:r><w:t>link</w:t></w:r></w:hyperlink><w:del><w:r><w:delText>gone</w:delText></w:r></w:del></w:p>"#,
            W
        ))
        .unwrap();
        assert_eq!(paragraph_text(&p), "a\tb\nlink");
    }
}
