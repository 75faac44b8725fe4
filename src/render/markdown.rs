//! Markdown rendering.

use crate::model::{BlockRef, ContentModel, FormatContent, ImageContent, PdfPage, Sheet, Slide, Table};
use crate::vision::VisionAnalysis;

use super::SourceInfo;

/// Characters of base64 shown in the Markdown preview.
const BASE64_PREVIEW_CHARS: usize = 200;

/// Convert a content model to Markdown, provenance header first.
pub fn to_markdown(model: &ContentModel, source: &SourceInfo) -> String {
    let mut output = provenance_header(source);
    output.push_str(&MarkdownRenderer::new().render(model));
    output
}

/// The title, provenance line and rule that open every Markdown output.
pub fn provenance_header(source: &SourceInfo) -> String {
    format!(
        "# {}\n\n> Converted from {} on {}\n\n---\n\n",
        source.filename,
        source.file_type,
        source.converted_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Render a table as a pipe table.
///
/// With headers, every row is padded or truncated to the header width and
/// the duplicated header row is skipped.
pub fn pipe_table(table: &Table) -> String {
    let mut lines = Vec::new();
    if table.headers.is_empty() {
        for row in &table.rows {
            lines.push(pipe_row(row, row.len()));
        }
    } else {
        let width = table.headers.len();
        lines.push(pipe_row(&table.headers, width));
        lines.push(format!("|{}", " --- |".repeat(width)));
        for row in table.body_rows() {
            lines.push(pipe_row(row, width));
        }
    }
    lines.join("\n")
}

fn pipe_row(cells: &[String], width: usize) -> String {
    let cells: Vec<String> = (0..width)
        .map(|i| cells.get(i).map(|c| escape_cell(c)).unwrap_or_default())
        .collect();
    format!("| {} |", cells.join(" | "))
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Line-oriented Markdown body renderer.
#[derive(Debug, Default)]
pub struct MarkdownRenderer {
    lines: Vec<String>,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the body of a content model (no provenance header).
    pub fn render(mut self, model: &ContentModel) -> String {
        match &model.body {
            FormatContent::Document { order } => return render_document(model, order),
            FormatContent::Pdf { pages } => pages.iter().for_each(|p| self.render_page(p)),
            FormatContent::Deck { slides, .. } => slides.iter().for_each(|s| self.render_slide(s)),
            FormatContent::Spreadsheet { sheets } => {
                sheets.iter().for_each(|s| self.render_sheet(s))
            }
            FormatContent::Image(image) => self.render_image(image),
        }
        self.lines.join("\n")
    }

    fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn table(&mut self, table: &Table) {
        self.blank();
        self.line(pipe_table(table));
        self.blank();
    }

    fn separator(&mut self) {
        self.blank();
        self.line("---");
        self.blank();
    }

    fn render_page(&mut self, page: &PdfPage) {
        self.line(format!("## Page {}", page.page_number));
        self.blank();
        self.line(page.text.trim());
        for table in &page.tables {
            self.table(table);
        }
        self.separator();
    }

    fn render_slide(&mut self, slide: &Slide) {
        self.line(format!("## Slide {}", slide.slide_number));
        if let Some(title) = &slide.title {
            self.line(format!("### {}", title));
        }
        self.blank();
        for item in &slide.content {
            self.line(format!("- {}", item));
        }
        for table in slide.tables() {
            self.table(table);
        }
        if !slide.notes.is_empty() {
            self.blank();
            self.line(format!("**Speaker Notes:** {}", slide.notes));
        }
        self.separator();
    }

    fn render_sheet(&mut self, sheet: &Sheet) {
        self.line(format!("## {}", sheet.name));
        self.blank();
        if sheet.is_empty() {
            self.line("*Empty sheet*");
            self.blank();
            return;
        }
        self.line(pipe_table(&Table::from_rows(sheet.rows.clone())));
        self.separator();
    }

    fn render_image(&mut self, image: &ImageContent) {
        self.line("## Image Information");
        self.blank();
        self.line(format!("- **Format:** {}", image.format));
        self.line(format!(
            "- **Dimensions:** {} x {} pixels",
            image.width, image.height
        ));
        self.blank();

        self.line("## AI Vision Analysis");
        self.blank();
        self.render_vision(&image.vision_analysis);

        self.line("## Extracted Text (OCR)");
        self.blank();
        if image.has_ocr_text() {
            self.line("```");
            self.line(image.ocr_text.as_str());
            self.line("```");
        } else if image.ocr_text.is_empty() {
            self.line("*No text detected*");
        } else {
            self.line(format!("*{}*", image.ocr_text));
        }
        self.blank();

        self.line("## Base64 Encoded Image");
        self.blank();
        self.line(format!("*MIME Type:* `{}`", image.base64_mime));
        self.blank();
        self.line("```");
        let total = image.base64_data.len();
        if total > BASE64_PREVIEW_CHARS {
            self.line(format!("{}...", &image.base64_data[..BASE64_PREVIEW_CHARS]));
            self.line(format!("[{} total characters]", total));
        } else {
            self.line(image.base64_data.as_str());
        }
        self.line("```");
    }

    fn render_vision(&mut self, vision: &VisionAnalysis) {
        let (provider, model, analysis) = match vision {
            VisionAnalysis::Success {
                provider,
                model,
                analysis,
            } => (provider, model, analysis),
            VisionAnalysis::Failure { error, .. } => {
                self.line(format!("*Analysis unavailable: {}*", error));
                self.blank();
                return;
            }
        };

        self.line(format!("*Analyzed by: {} ({})*", provider, model));
        self.blank();

        if let Some(summary) = &analysis.summary {
            self.line("### Summary");
            self.blank();
            self.line(summary.as_str());
            self.blank();
        }

        if let Some(prompt) = &analysis.reproduction_prompt {
            self.line("### Reproduction Prompt");
            self.blank();
            self.line("```");
            self.line(prompt.as_str());
            self.line("```");
            self.blank();
        }

        if let Some(style) = &analysis.style {
            self.line("### Style & Mood");
            self.blank();
            if let Some(v) = &style.artistic_style {
                self.line(format!("- **Artistic Style:** {}", v));
            }
            if let Some(v) = &style.mood {
                self.line(format!("- **Mood:** {}", v));
            }
            if let Some(v) = &style.atmosphere {
                self.line(format!("- **Atmosphere:** {}", v));
            }
            self.blank();
        }

        if let Some(colors) = &analysis.colors {
            self.line("### Colors");
            self.blank();
            if !colors.dominant_colors.is_empty() {
                self.line("**Dominant Colors:**");
                for color in colors.dominant_colors.iter().take(5) {
                    let pct = color
                        .percentage
                        .map(|p| format!("{}", p))
                        .unwrap_or_else(|| "?".to_string());
                    self.line(format!(
                        "- {} ({}) - {}%",
                        color.name.as_deref().unwrap_or("Unknown"),
                        color.hex.as_deref().unwrap_or(""),
                        pct
                    ));
                }
            }
            if let Some(palette) = &colors.palette_type {
                self.blank();
                self.line(format!("**Palette Type:** {}", palette));
            }
            self.blank();
        }
    }
}

/// Word bodies interleave paragraphs and tables in document order and
/// separate blocks with blank lines.
fn render_document(model: &ContentModel, order: &[BlockRef]) -> String {
    let fallback: Vec<BlockRef>;
    let order = if order.is_empty() {
        fallback = (0..model.paragraphs.len())
            .map(BlockRef::Paragraph)
            .chain((0..model.tables.len()).map(BlockRef::Table))
            .collect();
        &fallback
    } else {
        order
    };

    let mut blocks = Vec::with_capacity(order.len());
    for block in order {
        match *block {
            BlockRef::Paragraph(i) => {
                if let Some(para) = model.paragraphs.get(i) {
                    match para.heading_level() {
                        Some(level) => blocks.push(format!(
                            "{} {}",
                            "#".repeat(level as usize),
                            para.text
                        )),
                        None => blocks.push(para.text.clone()),
                    }
                }
            }
            BlockRef::Table(i) => {
                if let Some(table) = model.tables.get(i) {
                    blocks.push(pipe_table(table));
                }
            }
        }
    }
    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Paragraph;
    use chrono::TimeZone;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn fixed_source() -> SourceInfo {
        let at = chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        SourceInfo::at("report.docx", "word_document", at)
    }

    #[test]
    fn test_provenance_header() {
        assert_eq!(
            provenance_header(&fixed_source()),
            "# report.docx\n\n> Converted from word_document on 2024-01-01 00:00:00 UTC\n\n---\n\n"
        );
    }

    #[test]
    fn test_pipe_table_skips_duplicate_header() {
        let table = Table::from_rows(vec![strings(&["A", "B"]), strings(&["1", "2"])]);
        assert_eq!(pipe_table(&table), "| A | B |\n| --- | --- |\n| 1 | 2 |");
    }

    #[test]
    fn test_pipe_table_pads_and_truncates() {
        let table = Table::from_rows(vec![
            strings(&["A", "B", "C"]),
            strings(&["1"]),
            strings(&["1", "2", "3", "4"]),
        ]);
        let md = pipe_table(&table);
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines[1].matches("---").count(), 3);
        assert_eq!(lines[2], "| 1 |  |  |");
        assert_eq!(lines[3], "| 1 | 2 | 3 |");
    }

    #[test]
    fn test_pipe_table_escapes_cells() {
        let table = Table::from_rows(vec![strings(&["a|b", "line\nbreak"])]);
        assert!(pipe_table(&table).starts_with("| a\\|b | line break |"));
    }

    #[test]
    fn test_document_interleaves_blocks() {
        let mut model = ContentModel::new(FormatContent::Document {
            order: vec![
                BlockRef::Paragraph(0),
                BlockRef::Table(0),
                BlockRef::Paragraph(1),
            ],
        });
        model.paragraphs.push(Paragraph::new("Intro", "Heading 2"));
        model.paragraphs.push(Paragraph::new("After the table.", "Normal"));
        model
            .tables
            .push(Table::from_rows(vec![strings(&["X"]), strings(&["1"])]));

        let md = to_markdown(&model, &fixed_source());
        assert!(md.ends_with("## Intro\n\n| X |\n| --- |\n| 1 |\n\nAfter the table."));
    }

    #[test]
    fn test_pdf_pages() {
        let mut page = PdfPage::new(1);
        page.text = "  Hello page  \n".to_string();
        let model = ContentModel::new(FormatContent::Pdf { pages: vec![page] });
        let body = MarkdownRenderer::new().render(&model);
        assert_eq!(body, "## Page 1\n\nHello page\n\n---\n");
    }

    #[test]
    fn test_slide_layout() {
        let mut slide = Slide::new(2);
        slide.title = Some("Plan".to_string());
        slide.content = strings(&["First", "Second"]);
        slide.notes = "Say hi".to_string();
        let model = ContentModel::new(FormatContent::Deck {
            slides: vec![slide],
            total_slides: 1,
        });
        let body = MarkdownRenderer::new().render(&model);
        assert_eq!(
            body,
            "## Slide 2\n### Plan\n\n- First\n- Second\n\n**Speaker Notes:** Say hi\n\n---\n"
        );
    }

    #[test]
    fn test_empty_sheet_marker() {
        let model = ContentModel::new(FormatContent::Spreadsheet {
            sheets: vec![Sheet::new("Blank", Vec::new())],
        });
        let body = MarkdownRenderer::new().render(&model);
        assert_eq!(body, "## Blank\n\n*Empty sheet*\n");
    }
}
