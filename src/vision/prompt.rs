//! The instruction sent with every image to the vision model.

/// Shared analysis prompt. Every provider sends this text unchanged so the
/// responses follow one JSON schema.
pub const ANALYSIS_PROMPT: &str = r##"You are an expert image analyst. Describe this image in enough structured detail that it could be reproduced almost exactly.

Return a single JSON object with this structure:

{
  "summary": "One or two sentences describing what the image shows",

  "scene_composition": {
    "layout": "centered / rule-of-thirds / symmetrical / asymmetrical / diagonal / radial / golden-ratio",
    "orientation": "landscape / portrait / square",
    "depth_layers": {
      "foreground": ["elements in the foreground"],
      "midground": ["elements in the middle ground"],
      "background": ["elements in the background"]
    },
    "focal_points": [
      {
        "description": "what draws the eye",
        "position": {"x_percent": 0-100, "y_percent": 0-100},
        "visual_weight": "primary / secondary / tertiary"
      }
    ],
    "negative_space": "how empty space is used",
    "visual_flow": "how the eye travels through the image"
  },

  "objects": [
    {
      "name": "element name",
      "category": "person / animal / object / text / shape / nature / architecture / other",
      "description": "state, pose, expression and other details",
      "position": {
        "x_percent": 0-100,
        "y_percent": 0-100,
        "quadrant": "top-left / top-center / top-right / center-left / center / center-right / bottom-left / bottom-center / bottom-right"
      },
      "size": {
        "width_percent": 0-100,
        "height_percent": 0-100,
        "relative_scale": "dominant / large / medium / small / tiny"
      },
      "attributes": {
        "primary_color": "#hexcode",
        "secondary_colors": ["#hexcode"],
        "material": "material or texture",
        "opacity": "opaque / semi-transparent / transparent",
        "state": "open, closed, lit, unlit and so on",
        "orientation": "facing direction, rotation or angle"
      },
      "relationships": ["spatial relationships to other elements"]
    }
  ],

  "colors": {
    "dominant_colors": [
      {
        "hex": "#hexcode",
        "name": "descriptive color name",
        "percentage": 0-100,
        "location": "where the color appears"
      }
    ],
    "palette_type": "warm / cool / neutral / monochromatic / complementary / analogous / triadic / split-complementary",
    "color_temperature": "warm / cool / neutral, with a short description",
    "saturation_level": "vibrant / muted / desaturated / mixed",
    "contrast_level": "high / medium / low",
    "gradients": [
      {
        "type": "linear / radial / angular",
        "from_color": "#hexcode",
        "to_color": "#hexcode",
        "location": "where the gradient appears"
      }
    ],
    "color_harmony": "how the colors work together"
  },

  "text_content": [
    {
      "text": "exact text",
      "font_style": "serif / sans-serif / script / decorative / monospace",
      "font_weight": "light / regular / medium / bold / black",
      "case": "uppercase / lowercase / title-case / mixed",
      "size": "large / medium / small relative to the image",
      "color": "#hexcode",
      "background_color": "#hexcode or null",
      "position": {"x_percent": 0-100, "y_percent": 0-100},
      "alignment": "left / center / right / justified",
      "effects": ["shadow", "outline", "glow", "3d", "none"]
    }
  ],

  "lighting": {
    "type": "natural / artificial / mixed / ambient / dramatic / studio",
    "sources": [
      {
        "type": "sun / lamp / window / neon / fire / screen / other",
        "direction": "top / bottom / left / right / top-left / top-right / bottom-left / bottom-right / behind / front",
        "intensity": "bright / moderate / dim / subtle",
        "color_temperature": "warm / cool / neutral, with a kelvin estimate when possible"
      }
    ],
    "overall_brightness": "bright / moderate / dark / high-key / low-key",
    "contrast": "high / medium / low / flat",
    "shadows": {
      "presence": "strong / soft / minimal / none",
      "direction": "where shadows fall",
      "hardness": "hard-edged / soft / diffused"
    },
    "highlights": {
      "presence": "prominent / subtle / none",
      "type": "specular / diffused / rim"
    },
    "time_of_day_suggestion": "time of day implied by the light, if any"
  },

  "textures": [
    {
      "surface": "surface or object",
      "type": "smooth / rough / bumpy / grainy / glossy / matte / metallic / fabric / organic / other",
      "pattern": "solid / striped / checkered / spotted / geometric / organic / random / none",
      "detail_level": "highly detailed / moderately detailed / smooth / stylized"
    }
  ],

  "style": {
    "artistic_style": "photorealistic / illustration / 3d-render / cartoon / anime / watercolor / oil-painting / digital-art / vector / sketch / pixel-art / other",
    "rendering_quality": "photographic / hyper-realistic / realistic / stylized / abstract",
    "mood": "cheerful / somber / energetic / calm / dramatic / mysterious / romantic / nostalgic / futuristic / other",
    "atmosphere": "the overall feeling of the image",
    "era_influence": "modern / vintage / retro / futuristic / a specific historical period",
    "genre": "portrait / landscape / still-life / abstract / conceptual / other",
    "visual_effects": ["blur", "bokeh", "vignette", "grain", "lens-flare", "motion-blur", "none"]
  },

  "technical": {
    "aspect_ratio": "16:9 / 4:3 / 1:1 / 3:2 / other",
    "perceived_resolution": "high / medium / low",
    "quality_assessment": "professional / amateur / ai-generated / stock-photo / screenshot / other",
    "noise_level": "none / minimal / moderate / heavy",
    "sharpness": "tack-sharp / sharp / soft / blurry",
    "depth_of_field": "deep / shallow / selective, with a description",
    "perspective": "eye-level / bird's-eye / worm's-eye / isometric / forced / other",
    "distortion": "none / barrel / pincushion / fisheye / other"
  },

  "reproduction_prompt": "A complete text-to-image prompt that would recreate this image as closely as possible, covering subject, composition, style, lighting, colors and mood"
}

Rules:
1. Give exact hex codes for every color you mention.
2. Give positions and sizes as percentages from 0 to 100.
3. Include every visible element.
4. Make the reproduction_prompt detailed enough to regenerate the image.
5. Use null or an empty array for fields that do not apply.
6. Return only the JSON object, with no surrounding text or Markdown.
7. Estimate when exact measurement is impossible, as accurately as you can."##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_schema_sections() {
        for key in [
            "\"summary\"",
            "\"scene_composition\"",
            "\"objects\"",
            "\"colors\"",
            "\"text_content\"",
            "\"lighting\"",
            "\"style\"",
            "\"reproduction_prompt\"",
        ] {
            assert!(ANALYSIS_PROMPT.contains(key), "missing {}", key);
        }
    }
}
