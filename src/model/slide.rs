//! Slide deck content.

use super::Table;
use serde::Serialize;

/// One slide of a deck.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Slide {
    /// 1-based position in the deck
    pub slide_number: usize,

    /// Text of the title placeholder
    pub title: Option<String>,

    /// Text lines from every other text-bearing shape
    pub content: Vec<String>,

    /// Speaker notes, empty when the slide has none
    pub notes: String,

    pub shapes: Vec<Shape>,
}

impl Slide {
    pub fn new(slide_number: usize) -> Self {
        Self {
            slide_number,
            ..Default::default()
        }
    }

    /// Tables found in the slide's table shapes.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.shapes.iter().filter_map(|shape| match shape {
            Shape::Table { table } => Some(table),
            _ => None,
        })
    }
}

/// A shape on a slide, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Shape {
    Placeholder { text: Vec<String> },
    TextBox { text: Vec<String> },
    AutoShape { text: Vec<String> },
    Table { table: Table },
}

impl Shape {
    /// Text lines of a text-bearing shape.
    pub fn text(&self) -> &[String] {
        match self {
            Shape::Placeholder { text } | Shape::TextBox { text } | Shape::AutoShape { text } => {
                text
            }
            Shape::Table { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_serialization() {
        let shape = Shape::TextBox {
            text: vec!["hello".to_string()],
        };
        assert_eq!(
            serde_json::to_value(&shape).unwrap(),
            serde_json::json!({"type": "TEXT_BOX", "text": ["hello"]})
        );

        let table = Shape::Table {
            table: Table::from_rows(vec![vec!["a".to_string()]]),
        };
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["type"], "TABLE");
        assert_eq!(json["table"]["headers"][0], "a");
    }

    #[test]
    fn test_slide_tables() {
        let mut slide = Slide::new(1);
        slide.shapes.push(Shape::Placeholder { text: vec![] });
        slide.shapes.push(Shape::Table {
            table: Table::default(),
        });
        assert_eq!(slide.tables().count(), 1);
    }
}
