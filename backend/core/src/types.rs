use serde::{Deserialize, Serialize};

pub const DEFAULT_FONT_SIZE: u32 = 20;
pub const DEFAULT_FONT_FAMILY: &str = "Arial";
pub const DEFAULT_TEXT_COLOR: &str = "#000000";
pub const DEFAULT_BACKGROUND_COLOR: &str = "#FFFFFF";

/// A recognised (or user-edited) run of text and how it should be drawn.
///
/// Geometry comes from the OCR pass; styling fields start at their defaults
/// and are changed by the editor before the block is sent back for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub confidence: f32,

    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default = "default_background_color")]
    pub background_color: String,
    #[serde(default = "default_true")]
    pub background_transparent: bool,
}

impl TextBlock {
    /// A block at the given geometry with default styling.
    pub fn new(text: impl Into<String>, x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            height,
            confidence: 0.0,
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            bold: false,
            italic: false,
            underline: false,
            text_color: DEFAULT_TEXT_COLOR.to_string(),
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            background_transparent: true,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }
}

fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}

fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}

fn default_text_color() -> String {
    DEFAULT_TEXT_COLOR.to_string()
}

fn default_background_color() -> String {
    DEFAULT_BACKGROUND_COLOR.to_string()
}

fn default_true() -> bool {
    true
}

/// Join block texts the way the editor shows the page: single spaces.
pub fn full_text(blocks: &[TextBlock]) -> String {
    blocks
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Response body of `POST /extract_text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub text_blocks: Vec<TextBlock>,
    pub full_text: String,
    /// `data:image/png;base64,...` preview of the uploaded image.
    pub image_base64: String,
    /// Where the upload was stored; the client echoes this to `/update_image`.
    pub image_path: String,
}

/// Request body of `POST /update_image`.
///
/// Blocks stay as raw JSON so one malformed block does not reject the
/// whole request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateImageRequest {
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub text_blocks: Option<Vec<serde_json::Value>>,
}

/// Response body of `POST /update_image`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateImageResponse {
    pub success: bool,
    pub edited_image: String,
    pub filename: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn block_styling_defaults_when_absent() {
        let block: TextBlock = serde_json::from_value(json!({
            "text": "Hello", "x": 4, "y": 8, "width": 40, "height": 12
        }))
        .unwrap();
        assert_eq!(block.font_size, 20);
        assert_eq!(block.font_family, "Arial");
        assert!(block.background_transparent);
        assert_eq!(block.text_color, "#000000");
    }

    #[test]
    fn block_serializes_camel_case() {
        let v = serde_json::to_value(TextBlock::new("a", 0, 0, 1, 1)).unwrap();
        assert!(v.get("fontSize").is_some());
        assert!(v.get("backgroundTransparent").is_some());
        assert!(v.get("font_size").is_none());
    }

    #[test]
    fn full_text_joins_with_spaces() {
        let blocks = vec![
            TextBlock::new("Hello", 0, 0, 1, 1),
            TextBlock::new("world", 5, 0, 1, 1),
        ];
        assert_eq!(full_text(&blocks), "Hello world");
        assert_eq!(full_text(&[]), "");
    }

    #[test]
    fn update_request_tolerates_missing_fields() {
        let req: UpdateImageRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.image_path.is_none());
        assert!(req.text_blocks.is_none());
    }
}
