//! Slide deck (`.pptx`) extraction.

use super::ooxml::{Package, XmlElement};
use super::FormatExtractor;
use crate::error::Result;
use crate::model::{ContentModel, FormatContent, Heading, Metadata, Paragraph, Shape, Slide, Table};
use std::path::Path;

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const NOTES_SLIDE_REL: &str = "notesSlide";

/// Extractor for slide decks.
#[derive(Debug, Clone, Default)]
pub struct PptxExtractor {
    _private: (),
}

impl PptxExtractor {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl FormatExtractor for PptxExtractor {
    fn name(&self) -> &str {
        "pptx"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pptx"]
    }

    fn extract(&self, path: &Path) -> Result<ContentModel> {
        let mut package = Package::open(path)?;
        let presentation = parse_required(&mut package, PRESENTATION_PART)?;
        let rels = package.relationships(PRESENTATION_PART)?;

        let slide_parts: Vec<Option<String>> = presentation
            .path(&["sldIdLst"])
            .map(|list| {
                list.children_named("sldId")
                    .map(|id| id.attr("r:id").and_then(|rid| rels.get(rid)).cloned())
                    .collect()
            })
            .unwrap_or_default();

        let mut slides = Vec::with_capacity(slide_parts.len());
        for (index, part) in slide_parts.into_iter().enumerate() {
            let number = index + 1;
            let slide = match part {
                Some(part) => read_slide(&mut package, &part, number).unwrap_or_else(|err| {
                    log::warn!("Could not read slide {}: {}", number, err);
                    Slide::new(number)
                }),
                None => {
                    log::warn!("Slide {} has no resolvable part", number);
                    Slide::new(number)
                }
            };
            slides.push(slide);
        }

        let model = build_model(slides);
        log::debug!("pptx: {} slides", model.slides().len());
        Ok(model)
    }
}

fn parse_required(package: &mut Package, part: &str) -> Result<XmlElement> {
    let xml = package.require_part(part)?;
    super::ooxml::parse_xml(&xml)
}

fn read_slide(package: &mut Package, part: &str, number: usize) -> Result<Slide> {
    let root = parse_required(package, part)?;
    let mut slide = Slide::new(number);
    if let Some(tree) = root.path(&["cSld", "spTree"]) {
        collect_shapes(tree, &mut slide);
    }

    let notes_part = package
        .relationships_of_type(part, NOTES_SLIDE_REL)?
        .into_iter()
        .next();
    if let Some(notes_part) = notes_part {
        match package.read_xml(&notes_part) {
            Ok(Some(notes)) => slide.notes = notes_text(&notes),
            Ok(None) => {}
            Err(err) => log::warn!("Ignoring unreadable notes of slide {}: {}", number, err),
        }
    }
    Ok(slide)
}

/// Walk a shape tree in z-order; group shapes contribute their children.
fn collect_shapes(tree: &XmlElement, slide: &mut Slide) {
    for el in tree.elements() {
        match el.name.as_str() {
            "sp" => text_shape(el, slide),
            "grpSp" => collect_shapes(el, slide),
            "graphicFrame" => {
                if let Some(tbl) = el.find("tbl") {
                    let rows = table_rows(tbl);
                    if !rows.is_empty() {
                        slide.shapes.push(Shape::Table {
                            table: Table::from_rows(rows),
                        });
                    }
                }
            }
            _ => {}
        }
    }
}

fn text_shape(sp: &XmlElement, slide: &mut Slide) {
    let lines: Vec<String> = sp
        .child("txBody")
        .map(|body| {
            body.children_named("p")
                .map(paragraph_text)
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default();
    if lines.is_empty() {
        return;
    }

    let placeholder = sp.path(&["nvSpPr", "nvPr", "ph"]);
    let is_title = placeholder
        .and_then(|ph| ph.attr("type"))
        .is_some_and(|t| t == "title" || t == "ctrTitle");

    if is_title && slide.title.is_none() {
        slide.title = Some(lines.join("\n"));
    } else {
        slide.content.extend(lines.iter().cloned());
    }

    let text_box = sp
        .path(&["nvSpPr", "cNvSpPr"])
        .and_then(|c| c.attr("txBox"))
        .is_some_and(|v| v == "1" || v == "true");
    let shape = if placeholder.is_some() {
        Shape::Placeholder { text: lines }
    } else if text_box {
        Shape::TextBox { text: lines }
    } else {
        Shape::AutoShape { text: lines }
    };
    slide.shapes.push(shape);
}

/// Runs and fields of a DrawingML paragraph; line breaks become `\n`.
fn paragraph_text(p: &XmlElement) -> String {
    let mut out = String::new();
    for child in p.elements() {
        match child.name.as_str() {
            "r" | "fld" => {
                if let Some(t) = child.child("t") {
                    out.push_str(&t.text());
                }
            }
            "br" => out.push('\n'),
            _ => {}
        }
    }
    out
}

fn table_rows(tbl: &XmlElement) -> Vec<Vec<String>> {
    tbl.children_named("tr")
        .map(|tr| {
            tr.children_named("tc")
                .map(|tc| {
                    tc.child("txBody")
                        .map(|body| {
                            body.children_named("p")
                                .map(paragraph_text)
                                .collect::<Vec<_>>()
                                .join("\n")
                        })
                        .unwrap_or_default()
                        .trim()
                        .to_string()
                })
                .collect()
        })
        .collect()
}

/// Text of the notes slide's body placeholder.
fn notes_text(notes: &XmlElement) -> String {
    let Some(tree) = notes.path(&["cSld", "spTree"]) else {
        return String::new();
    };
    tree.descendants("sp")
        .into_iter()
        .find(|sp| {
            sp.path(&["nvSpPr", "nvPr", "ph"])
                .and_then(|ph| ph.attr("type"))
                == Some("body")
        })
        .and_then(|sp| sp.child("txBody"))
        .map(|body| {
            body.children_named("p")
                .map(paragraph_text)
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        })
        .unwrap_or_default()
}

fn build_model(slides: Vec<Slide>) -> ContentModel {
    let mut model = ContentModel::new(FormatContent::Deck {
        slides: Vec::new(),
        total_slides: 0,
    });
    let mut texts = Vec::new();

    for slide in &slides {
        if let Some(title) = &slide.title {
            texts.push(title.clone());
            model.paragraphs.push(Paragraph::new(title.as_str(), "Title"));
            model.headings.push(Heading::new(1, title.as_str()));
        }
        for line in &slide.content {
            texts.push(line.clone());
            model.paragraphs.push(Paragraph::new(line.as_str(), "Body"));
        }
        model.tables.extend(slide.tables().cloned());
    }

    model.text = texts.join("\n\n");
    model.metadata = Metadata {
        slide_count: Some(slides.len()),
        table_count: Some(model.tables.len()),
        word_count: Some(model.word_count()),
        ..Metadata::default()
    };
    model.body = FormatContent::Deck {
        total_slides: slides.len(),
        slides,
    };
    model
}
