//! Typed view of the structured image analysis returned by vision models.
//!
//! Only the fields the renderers read are typed. Everything else the model
//! returns is kept verbatim in the `extra` maps so the JSON output carries
//! the full analysis object.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Structured description of an image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub objects: Vec<DetectedObject>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<ColorAnalysis>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleAnalysis>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reproduction_prompt: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Object placement as percentages of the image, 0 to 100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default, deserialize_with = "lenient_percent")]
    pub x_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_percent")]
    pub y_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quadrant: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    #[serde(default, deserialize_with = "lenient_percent")]
    pub width_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_percent")]
    pub height_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_scale: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorAnalysis {
    #[serde(default, deserialize_with = "null_as_default")]
    pub dominant_colors: Vec<DominantColor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette_type: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DominantColor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_percent")]
    pub percentage: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artistic_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atmosphere: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `42`, `42.5`, `"42%"` or null; clamps into 0..=100.
fn lenient_percent<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.map(|n| n.clamp(0.0, 100.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_typed_fields_and_keeps_rest() {
        let raw = json!({
            "summary": "A red ball on grass",
            "objects": [{
                "name": "ball",
                "category": "object",
                "position": {"x_percent": 50, "y_percent": "40%", "quadrant": "center"},
                "size": {"width_percent": 120, "height_percent": null}
            }],
            "colors": {
                "dominant_colors": [{"hex": "#FF0000", "name": "red", "percentage": 35}],
                "palette_type": "warm",
                "contrast_level": "high"
            },
            "lighting": {"type": "natural"},
            "reproduction_prompt": "red ball, green grass"
        });

        let analysis: ImageAnalysis = serde_json::from_value(raw).unwrap();
        assert_eq!(analysis.summary.as_deref(), Some("A red ball on grass"));
        let object = &analysis.objects[0];
        let position = object.position.as_ref().unwrap();
        assert_eq!(position.y_percent, Some(40.0));
        assert_eq!(object.size.as_ref().unwrap().width_percent, Some(100.0));
        assert_eq!(object.extra["category"], "object");
        let colors = analysis.colors.as_ref().unwrap();
        assert_eq!(colors.dominant_colors[0].percentage, Some(35.0));
        assert_eq!(colors.extra["contrast_level"], "high");
        assert_eq!(analysis.extra["lighting"]["type"], "natural");

        let back = serde_json::to_value(&analysis).unwrap();
        assert_eq!(back["lighting"]["type"], "natural");
        assert_eq!(back["colors"]["palette_type"], "warm");
    }

    #[test]
    fn test_null_collections() {
        let analysis: ImageAnalysis =
            serde_json::from_value(json!({"objects": null, "colors": {"dominant_colors": null}}))
                .unwrap();
        assert!(analysis.objects.is_empty());
        assert!(analysis.colors.unwrap().dominant_colors.is_empty());
    }
}
