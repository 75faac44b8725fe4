//! Paragraph and heading types.

use serde::Serialize;

/// A block of body text with the style it was written in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub text: String,

    /// Style display name, e.g. `Normal` or `Heading 2`
    #[serde(rename = "style")]
    pub style_label: String,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, style_label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style_label: style_label.into(),
        }
    }

    /// Heading level if the style is a `Heading N` style.
    ///
    /// The number is clamped to 1..=6; a missing or non-numeric suffix
    /// counts as level 1.
    pub fn heading_level(&self) -> Option<u8> {
        let rest = self.style_label.trim().strip_prefix("Heading")?;
        let level = rest
            .trim()
            .parse::<u32>()
            .map(|n| n.clamp(1, 6) as u8)
            .unwrap_or(1);
        Some(level)
    }
}

/// A heading derived from a heading-styled paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Level in 1..=6
    pub level: u8,
    pub text: String,
}

impl Heading {
    pub fn new(level: u8, text: impl Into<String>) -> Self {
        Self {
            level: level.clamp(1, 6),
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_parsing() {
        assert_eq!(Paragraph::new("x", "Heading 1").heading_level(), Some(1));
        assert_eq!(Paragraph::new("x", "Heading 4").heading_level(), Some(4));
        assert_eq!(Paragraph::new("x", "Heading 9").heading_level(), Some(6));
        assert_eq!(Paragraph::new("x", "Heading 12").heading_level(), Some(6));
        assert_eq!(Paragraph::new("x", "Heading Two").heading_level(), Some(1));
        assert_eq!(Paragraph::new("x", "Heading").heading_level(), Some(1));
        assert_eq!(Paragraph::new("x", "Normal").heading_level(), None);
        assert_eq!(Paragraph::new("x", "Title").heading_level(), None);
    }

    #[test]
    fn test_heading_clamps() {
        assert_eq!(Heading::new(0, "a").level, 1);
        assert_eq!(Heading::new(8, "a").level, 6);
    }

    #[test]
    fn test_paragraph_serializes_style_key() {
        let json = serde_json::to_value(Paragraph::new("Hi", "Normal")).unwrap();
        assert_eq!(json, serde_json::json!({"text": "Hi", "style": "Normal"}));
    }
}
