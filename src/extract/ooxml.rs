//! Shared plumbing for Office Open XML packages (`.docx`, `.pptx`).
//!
//! Parts are read out of the ZIP container and parsed into a small owned
//! element tree. Element names are stored without their namespace prefix;
//! attribute keys keep theirs so `id` and `r:id` stay distinct.

use crate::detect::{self, Container};
use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

/// An opened OOXML package.
pub(crate) struct Package {
    archive: ZipArchive<BufReader<File>>,
}

impl Package {
    pub fn open(path: &Path) -> Result<Self> {
        detect::expect_container(path, Container::Zip)?;
        let file = File::open(path)?;
        let archive = ZipArchive::new(BufReader::new(file))?;
        Ok(Self { archive })
    }

    /// Read a part as text; `None` when the package has no such part.
    pub fn read_part(&mut self, name: &str) -> Result<Option<String>> {
        let mut entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut xml = String::new();
        entry.read_to_string(&mut xml)?;
        Ok(Some(xml))
    }

    pub fn require_part(&mut self, name: &str) -> Result<String> {
        self.read_part(name)?
            .ok_or_else(|| Error::MissingPart(name.to_string()))
    }

    /// Parse a part into an element tree.
    pub fn read_xml(&mut self, name: &str) -> Result<Option<XmlElement>> {
        match self.read_part(name)? {
            Some(xml) => Ok(Some(parse_xml(&xml)?)),
            None => Ok(None),
        }
    }

    /// Relationships of a part, keyed by relationship id, with targets
    /// resolved to package paths.
    pub fn relationships(&mut self, part: &str) -> Result<HashMap<String, String>> {
        let Some(root) = self.read_xml(&rels_path(part))? else {
            return Ok(HashMap::new());
        };
        let rels = root
            .descendants("Relationship")
            .into_iter()
            .filter(|rel| rel.attr("TargetMode") != Some("External"))
            .filter_map(|rel| {
                let id = rel.attr("Id")?;
                let target = rel.attr("Target")?;
                Some((id.to_string(), resolve_target(part, target)))
            })
            .collect();
        Ok(rels)
    }

    /// Resolved targets of a part's relationships whose type URI ends in
    /// `/{kind}`, in declaration order.
    pub fn relationships_of_type(&mut self, part: &str, kind: &str) -> Result<Vec<String>> {
        let Some(root) = self.read_xml(&rels_path(part))? else {
            return Ok(Vec::new());
        };
        let suffix = format!("/{}", kind);
        Ok(root
            .descendants("Relationship")
            .into_iter()
            .filter(|rel| rel.attr("Type").is_some_and(|t| t.ends_with(&suffix)))
            .filter_map(|rel| rel.attr("Target"))
            .map(|target| resolve_target(part, target))
            .collect())
    }
}

/// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`
pub(crate) fn rels_path(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the directory of its source part.
pub(crate) fn resolve_target(part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = match part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// A parsed XML element.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct XmlElement {
    /// Local name, prefix stripped
    pub name: String,
    /// Attributes with their qualified keys
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum XmlNode {
    Element(XmlElement),
    Text(String),
}

impl XmlElement {
    /// Attribute by exact qualified key, else by local name.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .or_else(|| {
                self.attrs
                    .iter()
                    .find(|(k, _)| k.rsplit(':').next() == Some(key))
            })
            .map(|(_, v)| v.as_str())
    }

    /// Child elements in order.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |el| el.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|el| el.name == name)
    }

    /// Follow a path of child names, e.g. `["nvSpPr", "nvPr", "ph"]`.
    pub fn path(&self, names: &[&str]) -> Option<&XmlElement> {
        names
            .iter()
            .try_fold(self, |el, name| el.child(name))
    }

    /// First descendant with the given name, depth-first.
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        for el in self.elements() {
            if el.name == name {
                return Some(el);
            }
            if let Some(found) = el.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants with the given name, in document order.
    pub fn descendants(&self, name: &str) -> Vec<&XmlElement> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        for el in self.elements() {
            if el.name == name {
                found.push(el);
            }
            el.collect_named(name, found);
        }
    }

    /// Concatenated text content.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(t) => out.push_str(t),
                XmlNode::Element(el) => el.push_text(out),
            }
        }
    }
}

/// Parse XML text into a tree; the returned element is the document root.
pub(crate) fn parse_xml(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlElement> = vec![XmlElement::default()];

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(element_from(&e, &reader)?),
            Event::Empty(e) => {
                let el = element_from(&e, &reader)?;
                push_node(&mut stack, XmlNode::Element(el))?;
            }
            Event::End(_) => {
                let el = stack
                    .pop()
                    .ok_or_else(|| Error::Xml("unbalanced end tag".to_string()))?;
                push_node(&mut stack, XmlNode::Element(el))?;
            }
            Event::Text(t) => {
                let text = t.unescape()?.into_owned();
                push_node(&mut stack, XmlNode::Text(text))?;
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                push_node(&mut stack, XmlNode::Text(text))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(Error::Xml("unexpected end of document".to_string()));
    }
    let container = stack.pop().unwrap_or_default();
    container
        .children
        .into_iter()
        .find_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
        .ok_or_else(|| Error::Xml("document has no root element".to_string()))
}

fn element_from(start: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<XmlElement> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.decode_and_unescape_value(reader)?.into_owned();
        attrs.push((key, value));
    }
    Ok(XmlElement {
        name,
        attrs,
        children: Vec::new(),
    })
}

fn push_node(stack: &mut [XmlElement], node: XmlNode) -> Result<()> {
    let parent = stack
        .last_mut()
        .ok_or_else(|| Error::Xml("unbalanced end tag".to_string()))?;
    parent.children.push(node);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tree_and_attrs() {
        let xml = r#"<?xml version="1.0"?>
<p:sldIdLst xmlns:p="p" xmlns:r="r">
  <p:sldId id="256" r:id="rId2"/>
  <p:sldId id="257" r:id="rId3"/>
</p:sldIdLst>"#;
        let root = parse_xml(xml).unwrap();
        assert_eq!(root.name, "sldIdLst");
        let ids: Vec<_> = root.children_named("sldId").collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].attr("id"), Some("256"));
        assert_eq!(ids[0].attr("r:id"), Some("rId2"));
    }

    #[test]
    fn test_attr_unescaped() {
        let root = parse_xml(r#"<a:hlink xmlns:a="a" tooltip="Q&amp;A &lt;1&gt;"/>"#).unwrap();
        assert_eq!(root.attr("tooltip"), Some("Q&A <1>"));
    }

    #[test]
    fn test_text_unescaped() {
        let root = parse_xml("<w:t xmlns:w=\"w\">Fish &amp; Chips</w:t>").unwrap();
        assert_eq!(root.text(), "Fish & Chips");
        assert_eq!(root.attr("val"), None);
    }

    #[test]
    fn test_path_and_find() {
        let root = parse_xml("<a><b><c x=\"1\"/></b><d><c x=\"2\"/></d></a>").unwrap();
        assert_eq!(root.path(&["b", "c"]).and_then(|c| c.attr("x")), Some("1"));
        assert_eq!(root.find("c").and_then(|c| c.attr("x")), Some("1"));
        assert_eq!(root.descendants("c").len(), 2);
    }

    #[test]
    fn test_malformed_xml() {
        assert!(parse_xml("<a><b></a>").is_err());
        assert!(parse_xml("").is_err());
    }

    #[test]
    fn test_rels_and_targets() {
        assert_eq!(rels_path("ppt/presentation.xml"), "ppt/_rels/presentation.xml.rels");
        assert_eq!(
            resolve_target("ppt/slides/slide1.xml", "../notesSlides/notesSlide1.xml"),
            "ppt/notesSlides/notesSlide1.xml"
        );
        assert_eq!(resolve_target("ppt/presentation.xml", "slides/slide2.xml"), "ppt/slides/slide2.xml");
        assert_eq!(resolve_target("word/document.xml", "/word/styles.xml"), "word/styles.xml");
    }
}
