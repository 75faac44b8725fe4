//! Word document tree and the OOXML package writer.
//!
//! The tree holds only what reverse conversion produces: styled
//! paragraphs of formatted runs, external hyperlinks and simple grid
//! tables. [`WordDocument::to_bytes`] writes a minimal but complete
//! `.docx` package.

use crate::error::{Error, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_NUMBERING: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
const REL_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

const CT_DOCUMENT: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
const CT_NUMBERING: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";

pub(crate) const HYPERLINK_COLOR: &str = "0563C1";
const CODE_FONT: &str = "Courier New";
/// Half-points
const CODE_FONT_SIZE: &str = "20";
const CODE_SHADING: &str = "E8E8E8";

/// A quarter inch in twentieths of a point.
pub const QUARTER_INCH: u32 = 360;

/// Formatting of a single run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    /// Courier New at 10 pt
    pub monospace: bool,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn monospace(mut self) -> Self {
        self.monospace = true;
        self
    }
}

/// Paragraph content in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParagraphItem {
    Run(Run),
    /// Blue, underlined link to an external URL
    Hyperlink { url: String, text: String },
}

impl ParagraphItem {
    pub fn text(&self) -> &str {
        match self {
            ParagraphItem::Run(run) => &run.text,
            ParagraphItem::Hyperlink { text, .. } => text,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordParagraph {
    /// Style id, `Normal` when `None`
    pub style: Option<String>,
    /// Left indent in twips
    pub indent: Option<u32>,
    /// Drawn as a horizontal rule
    pub bottom_border: bool,
    pub items: Vec<ParagraphItem>,
}

impl WordParagraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn styled(style: impl Into<String>) -> Self {
        Self {
            style: Some(style.into()),
            ..Self::default()
        }
    }

    pub fn with_indent(mut self, twips: u32) -> Self {
        self.indent = Some(twips);
        self
    }

    pub fn push_run(&mut self, run: Run) {
        self.items.push(ParagraphItem::Run(run));
    }

    pub fn push_hyperlink(&mut self, url: impl Into<String>, text: impl Into<String>) {
        self.items.push(ParagraphItem::Hyperlink {
            url: url.into(),
            text: text.into(),
        });
    }

    /// Concatenated text of all items.
    pub fn text(&self) -> String {
        self.items.iter().map(ParagraphItem::text).collect()
    }

    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.items.iter().filter_map(|item| match item {
            ParagraphItem::Run(run) => Some(run),
            ParagraphItem::Hyperlink { .. } => None,
        })
    }
}

/// A grid table; every row has `columns` cells of one run each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordTable {
    pub columns: usize,
    pub rows: Vec<Vec<Run>>,
}

impl WordTable {
    pub fn cell_text(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(|run| run.text.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyElement {
    Paragraph(WordParagraph),
    Table(WordTable),
}

/// A word-processor document under construction.
#[derive(Debug, Clone, Default)]
pub struct WordDocument {
    body: Vec<BodyElement>,
}

impl WordDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_paragraph(&mut self, paragraph: WordParagraph) {
        self.body.push(BodyElement::Paragraph(paragraph));
    }

    pub fn push_table(&mut self, table: WordTable) {
        self.body.push(BodyElement::Table(table));
    }

    pub fn body(&self) -> &[BodyElement] {
        &self.body
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &WordParagraph> {
        self.body.iter().filter_map(|el| match el {
            BodyElement::Paragraph(p) => Some(p),
            BodyElement::Table(_) => None,
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = &WordTable> {
        self.body.iter().filter_map(|el| match el {
            BodyElement::Table(t) => Some(t),
            BodyElement::Paragraph(_) => None,
        })
    }

    /// Distinct hyperlink targets in first-use order.
    pub fn hyperlinks(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = Vec::new();
        for paragraph in self.paragraphs() {
            for item in &paragraph.items {
                if let ParagraphItem::Hyperlink { url, .. } = item {
                    if !urls.contains(&url.as_str()) {
                        urls.push(url);
                    }
                }
            }
        }
        urls
    }

    /// Serialize as a `.docx` package.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let links = self.hyperlinks();
        let parts: [(&str, Vec<u8>); 6] = [
            ("[Content_Types].xml", content_types_xml()?),
            ("_rels/.rels", package_rels_xml()?),
            ("word/document.xml", self.document_xml(&links)?),
            ("word/styles.xml", styles_xml()?),
            ("word/numbering.xml", numbering_xml()?),
            ("word/_rels/document.xml.rels", document_rels_xml(&links)?),
        ];

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, xml) in parts {
            zip.start_file(name, options)?;
            zip.write_all(&xml)?;
        }
        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    fn document_xml(&self, links: &[&str]) -> Result<Vec<u8>> {
        let mut xml = XmlOut::new()?;
        xml.open("w:document", &[("xmlns:w", NS_W), ("xmlns:r", NS_R)])?;
        xml.open("w:body", &[])?;
        for element in &self.body {
            match element {
                BodyElement::Paragraph(p) => write_paragraph(&mut xml, p, links)?,
                BodyElement::Table(t) => write_table(&mut xml, t)?,
            }
        }
        xml.open("w:sectPr", &[])?;
        xml.empty("w:pgSz", &[("w:w", "12240"), ("w:h", "15840")])?;
        xml.empty(
            "w:pgMar",
            &[
                ("w:top", "1440"),
                ("w:right", "1440"),
                ("w:bottom", "1440"),
                ("w:left", "1440"),
                ("w:header", "720"),
                ("w:footer", "720"),
                ("w:gutter", "0"),
            ],
        )?;
        xml.close("w:sectPr")?;
        xml.close("w:body")?;
        xml.close("w:document")?;
        Ok(xml.finish())
    }
}

/// Relationship id of the n-th hyperlink; `rId1` and `rId2` are styles
/// and numbering.
fn hyperlink_rel_id(index: usize) -> String {
    format!("rId{}", index + 3)
}

fn write_paragraph(xml: &mut XmlOut, p: &WordParagraph, links: &[&str]) -> Result<()> {
    xml.open("w:p", &[])?;
    if p.style.is_some() || p.indent.is_some() || p.bottom_border {
        xml.open("w:pPr", &[])?;
        if let Some(style) = &p.style {
            xml.empty("w:pStyle", &[("w:val", style.as_str())])?;
        }
        if p.bottom_border {
            xml.open("w:pBdr", &[])?;
            xml.empty(
                "w:bottom",
                &[("w:val", "single"), ("w:sz", "6"), ("w:space", "1"), ("w:color", "auto")],
            )?;
            xml.close("w:pBdr")?;
        }
        if let Some(indent) = p.indent {
            xml.empty("w:ind", &[("w:left", indent.to_string().as_str()), ("w:firstLine", "0")])?;
        }
        xml.close("w:pPr")?;
    }

    for item in &p.items {
        match item {
            ParagraphItem::Run(run) => write_run(xml, run)?,
            ParagraphItem::Hyperlink { url, text } => {
                let index = links
                    .iter()
                    .position(|u| *u == url.as_str())
                    .ok_or_else(|| Error::Render(format!("unregistered hyperlink {}", url)))?;
                let rel_id = hyperlink_rel_id(index);
                xml.open("w:hyperlink", &[("r:id", rel_id.as_str())])?;
                xml.open("w:r", &[])?;
                xml.open("w:rPr", &[])?;
                xml.empty("w:color", &[("w:val", HYPERLINK_COLOR)])?;
                xml.empty("w:u", &[("w:val", "single")])?;
                xml.close("w:rPr")?;
                xml.text_element(text)?;
                xml.close("w:r")?;
                xml.close("w:hyperlink")?;
            }
        }
    }
    xml.close("w:p")
}

fn write_run(xml: &mut XmlOut, run: &Run) -> Result<()> {
    xml.open("w:r", &[])?;
    if run.bold || run.italic || run.monospace {
        xml.open("w:rPr", &[])?;
        if run.monospace {
            xml.empty("w:rFonts", &[("w:ascii", CODE_FONT), ("w:hAnsi", CODE_FONT), ("w:cs", CODE_FONT)])?;
        }
        if run.bold {
            xml.empty("w:b", &[])?;
        }
        if run.italic {
            xml.empty("w:i", &[])?;
        }
        if run.monospace {
            xml.empty("w:sz", &[("w:val", CODE_FONT_SIZE)])?;
        }
        xml.close("w:rPr")?;
    }
    xml.text_element(&run.text)?;
    xml.close("w:r")
}

fn write_table(xml: &mut XmlOut, table: &WordTable) -> Result<()> {
    // full text width of a letter page with 1 in margins, split evenly
    let width = 9360 / table.columns.max(1);
    let width = width.to_string();

    xml.open("w:tbl", &[])?;
    xml.open("w:tblPr", &[])?;
    xml.empty("w:tblStyle", &[("w:val", "TableGrid")])?;
    xml.empty("w:tblW", &[("w:w", "0"), ("w:type", "auto")])?;
    xml.empty("w:tblLook", &[("w:val", "04A0")])?;
    xml.close("w:tblPr")?;

    xml.open("w:tblGrid", &[])?;
    for _ in 0..table.columns {
        xml.empty("w:gridCol", &[("w:w", width.as_str())])?;
    }
    xml.close("w:tblGrid")?;

    for row in &table.rows {
        xml.open("w:tr", &[])?;
        for col in 0..table.columns {
            xml.open("w:tc", &[])?;
            xml.open("w:tcPr", &[])?;
            xml.empty("w:tcW", &[("w:w", width.as_str()), ("w:type", "dxa")])?;
            xml.close("w:tcPr")?;
            // a cell must hold at least one paragraph
            xml.open("w:p", &[])?;
            if let Some(run) = row.get(col).filter(|run| !run.text.is_empty()) {
                write_run(xml, run)?;
            }
            xml.close("w:p")?;
            xml.close("w:tc")?;
        }
        xml.close("w:tr")?;
    }
    xml.close("w:tbl")
}

fn content_types_xml() -> Result<Vec<u8>> {
    let mut xml = XmlOut::new()?;
    xml.open("Types", &[("xmlns", NS_CONTENT_TYPES)])?;
    xml.empty(
        "Default",
        &[
            ("Extension", "rels"),
            ("ContentType", "application/vnd.openxmlformats-package.relationships+xml"),
        ],
    )?;
    xml.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
    for (part, content_type) in [
        ("/word/document.xml", CT_DOCUMENT),
        ("/word/styles.xml", CT_STYLES),
        ("/word/numbering.xml", CT_NUMBERING),
    ] {
        xml.empty("Override", &[("PartName", part), ("ContentType", content_type)])?;
    }
    xml.close("Types")?;
    Ok(xml.finish())
}

fn package_rels_xml() -> Result<Vec<u8>> {
    let mut xml = XmlOut::new()?;
    xml.open("Relationships", &[("xmlns", NS_PKG_RELS)])?;
    xml.empty(
        "Relationship",
        &[("Id", "rId1"), ("Type", REL_OFFICE_DOCUMENT), ("Target", "word/document.xml")],
    )?;
    xml.close("Relationships")?;
    Ok(xml.finish())
}

fn document_rels_xml(links: &[&str]) -> Result<Vec<u8>> {
    let mut xml = XmlOut::new()?;
    xml.open("Relationships", &[("xmlns", NS_PKG_RELS)])?;
    xml.empty(
        "Relationship",
        &[("Id", "rId1"), ("Type", REL_STYLES), ("Target", "styles.xml")],
    )?;
    xml.empty(
        "Relationship",
        &[("Id", "rId2"), ("Type", REL_NUMBERING), ("Target", "numbering.xml")],
    )?;
    for (index, url) in links.iter().enumerate() {
        let id = hyperlink_rel_id(index);
        xml.empty(
            "Relationship",
            &[
                ("Id", id.as_str()),
                ("Type", REL_HYPERLINK),
                ("Target", *url),
                ("TargetMode", "External"),
            ],
        )?;
    }
    xml.close("Relationships")?;
    Ok(xml.finish())
}

/// Paragraph style written to `styles.xml`.
struct StyleDef<'a> {
    id: &'a str,
    name: &'a str,
    /// Half-points
    size: Option<u32>,
    bold: bool,
    num_id: Option<&'a str>,
    outline: Option<usize>,
}

fn styles_xml() -> Result<Vec<u8>> {
    let mut xml = XmlOut::new()?;
    xml.open("w:styles", &[("xmlns:w", NS_W)])?;

    xml.open("w:docDefaults", &[])?;
    xml.open("w:rPrDefault", &[])?;
    xml.open("w:rPr", &[])?;
    xml.empty("w:rFonts", &[("w:ascii", "Calibri"), ("w:hAnsi", "Calibri"), ("w:cs", "Calibri")])?;
    xml.empty("w:sz", &[("w:val", "22")])?;
    xml.close("w:rPr")?;
    xml.close("w:rPrDefault")?;
    xml.close("w:docDefaults")?;

    write_style(
        &mut xml,
        &StyleDef { id: "Normal", name: "Normal", size: None, bold: false, num_id: None, outline: None },
    )?;

    let heading_sizes = [32u32, 26, 24, 22, 22, 22, 22, 22, 22];
    for (i, size) in heading_sizes.iter().enumerate() {
        let id = format!("Heading{}", i + 1);
        let name = format!("heading {}", i + 1);
        write_style(
            &mut xml,
            &StyleDef { id: &id, name: &name, size: Some(*size), bold: true, num_id: None, outline: Some(i) },
        )?;
    }

    write_style(
        &mut xml,
        &StyleDef { id: "ListBullet", name: "List Bullet", size: None, bold: false, num_id: Some("1"), outline: None },
    )?;
    write_style(
        &mut xml,
        &StyleDef { id: "ListNumber", name: "List Number", size: None, bold: false, num_id: Some("2"), outline: None },
    )?;

    xml.open("w:style", &[("w:type", "paragraph"), ("w:customStyle", "1"), ("w:styleId", "CodeBlock")])?;
    xml.empty("w:name", &[("w:val", "CodeBlock")])?;
    xml.empty("w:basedOn", &[("w:val", "Normal")])?;
    xml.empty("w:qFormat", &[])?;
    xml.open("w:pPr", &[])?;
    xml.empty("w:shd", &[("w:val", "clear"), ("w:color", "auto"), ("w:fill", CODE_SHADING)])?;
    xml.empty("w:spacing", &[("w:after", "0")])?;
    xml.empty("w:ind", &[("w:left", QUARTER_INCH.to_string().as_str())])?;
    xml.close("w:pPr")?;
    xml.open("w:rPr", &[])?;
    xml.empty("w:rFonts", &[("w:ascii", CODE_FONT), ("w:hAnsi", CODE_FONT), ("w:cs", CODE_FONT)])?;
    xml.empty("w:sz", &[("w:val", CODE_FONT_SIZE)])?;
    xml.close("w:rPr")?;
    xml.close("w:style")?;

    xml.open("w:style", &[("w:type", "table"), ("w:styleId", "TableGrid")])?;
    xml.empty("w:name", &[("w:val", "Table Grid")])?;
    xml.open("w:tblPr", &[])?;
    xml.open("w:tblBorders", &[])?;
    for edge in ["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"] {
        xml.empty(edge, &[("w:val", "single"), ("w:sz", "4"), ("w:space", "0"), ("w:color", "auto")])?;
    }
    xml.close("w:tblBorders")?;
    xml.close("w:tblPr")?;
    xml.close("w:style")?;

    xml.close("w:styles")?;
    Ok(xml.finish())
}

fn write_style(xml: &mut XmlOut, style: &StyleDef<'_>) -> Result<()> {
    let mut attrs = vec![("w:type", "paragraph"), ("w:styleId", style.id)];
    if style.id == "Normal" {
        attrs.push(("w:default", "1"));
    }
    xml.open("w:style", &attrs)?;
    xml.empty("w:name", &[("w:val", style.name)])?;
    if style.id != "Normal" {
        xml.empty("w:basedOn", &[("w:val", "Normal")])?;
        xml.empty("w:next", &[("w:val", "Normal")])?;
    }
    xml.empty("w:qFormat", &[])?;

    if style.num_id.is_some() || style.outline.is_some() {
        xml.open("w:pPr", &[])?;
        if let Some(num_id) = style.num_id {
            xml.open("w:numPr", &[])?;
            xml.empty("w:numId", &[("w:val", num_id)])?;
            xml.close("w:numPr")?;
        }
        if let Some(level) = style.outline {
            xml.empty("w:keepNext", &[])?;
            xml.empty("w:spacing", &[("w:before", "240"), ("w:after", "60")])?;
            xml.empty("w:outlineLvl", &[("w:val", level.to_string().as_str())])?;
        }
        xml.close("w:pPr")?;
    }

    if style.bold || style.size.is_some() {
        xml.open("w:rPr", &[])?;
        if style.bold {
            xml.empty("w:b", &[])?;
        }
        if let Some(size) = style.size {
            xml.empty("w:sz", &[("w:val", size.to_string().as_str())])?;
        }
        xml.close("w:rPr")?;
    }
    xml.close("w:style")
}

/// Bullet list is `numId` 1, decimal list is `numId` 2.
fn numbering_xml() -> Result<Vec<u8>> {
    let mut xml = XmlOut::new()?;
    xml.open("w:numbering", &[("xmlns:w", NS_W)])?;

    for (abstract_id, format, text) in [("0", "bullet", "\u{2022}"), ("1", "decimal", "%1.")] {
        xml.open("w:abstractNum", &[("w:abstractNumId", abstract_id)])?;
        xml.empty("w:multiLevelType", &[("w:val", "singleLevel")])?;
        xml.open("w:lvl", &[("w:ilvl", "0")])?;
        xml.empty("w:start", &[("w:val", "1")])?;
        xml.empty("w:numFmt", &[("w:val", format)])?;
        xml.empty("w:lvlText", &[("w:val", text)])?;
        xml.empty("w:lvlJc", &[("w:val", "left")])?;
        xml.open("w:pPr", &[])?;
        xml.empty("w:ind", &[("w:left", "360"), ("w:hanging", "360")])?;
        xml.close("w:pPr")?;
        xml.close("w:lvl")?;
        xml.close("w:abstractNum")?;
    }
    for (num_id, abstract_id) in [("1", "0"), ("2", "1")] {
        xml.open("w:num", &[("w:numId", num_id)])?;
        xml.empty("w:abstractNumId", &[("w:val", abstract_id)])?;
        xml.close("w:num")?;
    }

    xml.close("w:numbering")?;
    Ok(xml.finish())
}

/// Thin wrapper over the quick-xml writer for the element shapes used
/// here.
struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Result<Self> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(Self { writer })
    }

    fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let start = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Start(start))?;
        Ok(())
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let start = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Empty(start))?;
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// `<w:t xml:space="preserve">text</w:t>`
    fn text_element(&mut self, text: &str) -> Result<()> {
        self.open("w:t", &[("xml:space", "preserve")])?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.close("w:t")
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ooxml::parse_xml;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut out = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut out).unwrap();
        out
    }

    fn sample() -> WordDocument {
        let mut doc = WordDocument::new();
        let mut heading = WordParagraph::styled("Heading2");
        heading.push_run(Run::plain("Fish & Chips"));
        doc.push_paragraph(heading);

        let mut p = WordParagraph::new();
        p.push_run(Run::plain("see "));
        p.push_hyperlink("https://example.com/?a=1&b=2", "here");
        p.push_run(Run::plain(" and "));
        p.push_hyperlink("https://example.com/?a=1&b=2", "again");
        doc.push_paragraph(p);

        doc.push_table(WordTable {
            columns: 2,
            rows: vec![
                vec![Run::plain("A").bold(), Run::plain("B").bold()],
                vec![Run::plain("1")],
            ],
        });
        doc
    }

    #[test]
    fn test_package_parts_present() {
        let bytes = sample().to_bytes().unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let mut names: Vec<_> = archive.file_names().collect();
        names.sort_unstable();
        assert_eq!(
            names,
            vec![
                "[Content_Types].xml",
                "_rels/.rels",
                "word/_rels/document.xml.rels",
                "word/document.xml",
                "word/numbering.xml",
                "word/styles.xml",
            ]
        );
    }

    #[test]
    fn test_document_xml_is_escaped_and_well_formed() {
        let bytes = sample().to_bytes().unwrap();
        let document = read_part(&bytes, "word/document.xml");
        assert!(document.contains("Fish &amp; Chips"));

        let root = parse_xml(&document).unwrap();
        let body = root.child("body").unwrap();
        let links = body.descendants("hyperlink");
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].attr("r:id"), Some("rId3"));
        assert_eq!(links[1].attr("r:id"), Some("rId3"));
        let color = links[0].find("color").and_then(|c| c.attr("val"));
        assert_eq!(color, Some(HYPERLINK_COLOR));

        // the short row is padded with an empty cell
        let rows = body.descendants("tr");
        assert_eq!(rows[1].children_named("tc").count(), 2);
    }

    #[test]
    fn test_hyperlink_relationships_deduplicated() {
        let doc = sample();
        assert_eq!(doc.hyperlinks(), vec!["https://example.com/?a=1&b=2"]);

        let rels = read_part(&doc.to_bytes().unwrap(), "word/_rels/document.xml.rels");
        let root = parse_xml(&rels).unwrap();
        let external: Vec<_> = root
            .children_named("Relationship")
            .filter(|r| r.attr("TargetMode") == Some("External"))
            .collect();
        assert_eq!(external.len(), 1);
        assert_eq!(external[0].attr("Target"), Some("https://example.com/?a=1&b=2"));
    }

    #[test]
    fn test_styles_cover_headings_lists_and_code() {
        let styles = read_part(&sample().to_bytes().unwrap(), "word/styles.xml");
        let root = parse_xml(&styles).unwrap();
        let ids: Vec<_> = root
            .children_named("style")
            .filter_map(|s| s.attr("styleId"))
            .collect();
        for id in ["Normal", "Heading1", "Heading9", "ListBullet", "ListNumber", "CodeBlock", "TableGrid"] {
            assert!(ids.contains(&id), "{}", id);
        }
        assert!(styles.contains(CODE_SHADING));
    }

    #[test]
    fn test_accessors() {
        let doc = sample();
        assert_eq!(doc.paragraphs().count(), 2);
        assert_eq!(doc.paragraphs().nth(1).unwrap().text(), "see here and again");
        let table = doc.tables().next().unwrap();
        assert_eq!(table.cell_text(0, 1), Some("B"));
        assert_eq!(table.cell_text(1, 1), None);
    }
}
