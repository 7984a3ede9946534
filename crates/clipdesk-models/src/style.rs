//! Caption style intent and the compiled, renderer-ready style record.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::AssColor;

/// Vertical placement of captions chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaptionPosition {
    Top,
    #[default]
    Center,
    Bottom,
}

impl CaptionPosition {
    pub const ALL: &'static [CaptionPosition] = &[
        CaptionPosition::Top,
        CaptionPosition::Center,
        CaptionPosition::Bottom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaptionPosition::Top => "top",
            CaptionPosition::Center => "center",
            CaptionPosition::Bottom => "bottom",
        }
    }

    /// Keypad alignment for this position. Horizontal centering is fixed.
    pub fn alignment(&self) -> Alignment {
        match self {
            CaptionPosition::Top => Alignment::TOP_CENTER,
            CaptionPosition::Center => Alignment::MIDDLE_CENTER,
            CaptionPosition::Bottom => Alignment::BOTTOM_CENTER,
        }
    }
}

impl fmt::Display for CaptionPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CaptionPosition {
    type Err = CaptionPositionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "top" => Ok(CaptionPosition::Top),
            "center" | "middle" => Ok(CaptionPosition::Center),
            "bottom" => Ok(CaptionPosition::Bottom),
            _ => Err(CaptionPositionParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown caption position: {0}")]
pub struct CaptionPositionParseError(String);

/// Numeric-keypad alignment (1..=9).
///
/// Rows: 1-3 bottom, 4-6 middle, 7-9 top. Columns: left, center, right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Alignment(u8);

impl Alignment {
    pub const BOTTOM_CENTER: Alignment = Alignment(2);
    pub const MIDDLE_CENTER: Alignment = Alignment(5);
    pub const TOP_CENTER: Alignment = Alignment(8);

    /// Returns `None` outside 1..=9.
    pub fn new(value: u8) -> Option<Self> {
        (1..=9).contains(&value).then_some(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// 0 = bottom, 1 = middle, 2 = top.
    pub fn row(&self) -> u8 {
        (self.0 - 1) / 3
    }

    /// 0 = left, 1 = center, 2 = right.
    pub fn column(&self) -> u8 {
        (self.0 - 1) % 3
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Self::MIDDLE_CENTER
    }
}

impl TryFrom<u8> for Alignment {
    type Error = AlignmentError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Alignment::new(value).ok_or(AlignmentError(value))
    }
}

impl From<Alignment> for u8 {
    fn from(alignment: Alignment) -> Self {
        alignment.0
    }
}

#[derive(Debug, Error)]
#[error("Alignment must be within 1..=9, got {0}")]
pub struct AlignmentError(u8);

/// Caption border mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum BorderStyle {
    /// Outline plus drop shadow
    #[default]
    Outline,
    /// Opaque box behind the text
    Boxed,
}

impl BorderStyle {
    pub fn code(&self) -> u8 {
        match self {
            BorderStyle::Outline => 1,
            BorderStyle::Boxed => 3,
        }
    }
}

impl TryFrom<u8> for BorderStyle {
    type Error = BorderStyleError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(BorderStyle::Outline),
            3 => Ok(BorderStyle::Boxed),
            other => Err(BorderStyleError(other)),
        }
    }
}

impl From<BorderStyle> for u8 {
    fn from(style: BorderStyle) -> Self {
        style.code()
    }
}

#[derive(Debug, Error)]
#[error("Border style must be 1 or 3, got {0}")]
pub struct BorderStyleError(u8);

/// Caption style as the user configures it.
///
/// Colors are raw `#RRGGBB` / `#RGB` strings straight from color pickers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StyleConfig {
    /// Preset name (ignored in custom mode)
    pub preset_name: String,
    /// Build from the custom fields instead of a preset
    pub custom_mode_enabled: bool,
    pub custom_font: String,
    pub custom_primary_color: String,
    pub custom_highlight_color: String,
    pub stroke_enabled: bool,
    pub stroke_width: f64,
    pub background_enabled: bool,
    /// Background box opacity (0.0 = transparent, 1.0 = opaque)
    pub background_opacity: f64,
    pub outline_color: String,
    pub background_color: String,
    /// Caption font size in pixels
    pub caption_size: u32,
    pub caption_position: CaptionPosition,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            preset_name: "Hormozi".to_string(),
            custom_mode_enabled: false,
            custom_font: "Arial".to_string(),
            custom_primary_color: "#FFFFFF".to_string(),
            custom_highlight_color: "#00FF00".to_string(),
            stroke_enabled: true,
            stroke_width: 3.0,
            background_enabled: false,
            background_opacity: 0.5,
            outline_color: "#000000".to_string(),
            background_color: "#000000".to_string(),
            caption_size: 60,
            caption_position: CaptionPosition::Center,
        }
    }
}

/// Renderer-ready style record.
///
/// Serializes with the key names the rendering engine reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CompiledStyle {
    #[serde(rename = "Fontname")]
    pub font_name: String,
    #[serde(rename = "PrimaryColour")]
    #[schemars(with = "String")]
    pub primary_color: AssColor,
    #[serde(rename = "HighlightColour")]
    #[schemars(with = "String")]
    pub highlight_color: AssColor,
    #[serde(rename = "OutlineColour")]
    #[schemars(with = "String")]
    pub outline_color: AssColor,
    #[serde(rename = "BackColour")]
    #[schemars(with = "String")]
    pub background_color: AssColor,
    #[serde(rename = "BorderStyle")]
    #[schemars(with = "u8")]
    pub border_style: BorderStyle,
    #[serde(rename = "Outline")]
    pub outline_width: f64,
    #[serde(rename = "Shadow")]
    pub shadow_width: f64,
    #[serde(rename = "Alignment")]
    #[schemars(with = "u8")]
    pub alignment: Alignment,
    #[serde(rename = "MarginV")]
    pub margin_vertical: u32,
}

/// Partial style override for re-rendering an existing clip.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct StylePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_v: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_h: Option<u32>,
    #[serde(rename = "Alignment", default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<u8>")]
    pub alignment: Option<Alignment>,
}

impl StylePatch {
    pub fn is_empty(&self) -> bool {
        self.font.is_none()
            && self.margin_v.is_none()
            && self.margin_h.is_none()
            && self.alignment.is_none()
    }
}

/// Style carried by an outbound request: a full compiled record or a patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum StyleOverride {
    Full(CompiledStyle),
    Partial(StylePatch),
}

impl From<CompiledStyle> for StyleOverride {
    fn from(style: CompiledStyle) -> Self {
        StyleOverride::Full(style)
    }
}

impl From<StylePatch> for StyleOverride {
    fn from(patch: StylePatch) -> Self {
        StyleOverride::Partial(patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption_position_parse() {
        assert_eq!("TOP".parse::<CaptionPosition>().unwrap(), CaptionPosition::Top);
        assert_eq!(
            "bottom".parse::<CaptionPosition>().unwrap(),
            CaptionPosition::Bottom
        );
        assert!("left".parse::<CaptionPosition>().is_err());
    }

    #[test]
    fn test_alignment_keypad_layout() {
        assert_eq!(Alignment::TOP_CENTER.row(), 2);
        assert_eq!(Alignment::BOTTOM_CENTER.row(), 0);
        assert_eq!(Alignment::MIDDLE_CENTER.column(), 1);
        assert!(Alignment::new(0).is_none());
        assert!(Alignment::new(10).is_none());
        assert_eq!(Alignment::new(7).unwrap().row(), 2);
    }

    #[test]
    fn test_border_style_wire_codes() {
        assert_eq!(serde_json::to_string(&BorderStyle::Boxed).unwrap(), "3");
        assert_eq!(
            serde_json::from_str::<BorderStyle>("1").unwrap(),
            BorderStyle::Outline
        );
        assert!(serde_json::from_str::<BorderStyle>("2").is_err());
    }

    #[test]
    fn test_compiled_style_uses_engine_keys() {
        let style = CompiledStyle {
            font_name: "Arial".to_string(),
            primary_color: AssColor::WHITE,
            highlight_color: AssColor::opaque(0, 0xFF, 0),
            outline_color: AssColor::BLACK,
            background_color: AssColor::BLACK.with_alpha(0x80),
            border_style: BorderStyle::Outline,
            outline_width: 3.0,
            shadow_width: 0.0,
            alignment: Alignment::TOP_CENTER,
            margin_vertical: 250,
        };
        let json = serde_json::to_value(&style).unwrap();
        assert_eq!(json["Fontname"], "Arial");
        assert_eq!(json["HighlightColour"], "&H0000FF00");
        assert_eq!(json["BackColour"], "&H80000000");
        assert_eq!(json["BorderStyle"], 1);
        assert_eq!(json["Alignment"], 8);
        assert_eq!(json["MarginV"], 250);
    }

    #[test]
    fn test_style_override_untagged() {
        let patch: StyleOverride = serde_json::from_str(r#"{"margin_v": 20}"#).unwrap();
        assert_eq!(
            patch,
            StyleOverride::Partial(StylePatch {
                margin_v: Some(20),
                ..Default::default()
            })
        );
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"margin_v":20}"#);
    }

    #[test]
    fn test_style_config_defaults_fill_missing_fields() {
        let config: StyleConfig = serde_json::from_str(r#"{"preset_name": "Neon"}"#).unwrap();
        assert_eq!(config.preset_name, "Neon");
        assert_eq!(config.caption_size, 60);
        assert_eq!(config.caption_position, CaptionPosition::Center);
    }
}
