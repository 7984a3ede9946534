//! Renderer color values in `&HAABBGGRR` form.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A color as consumed by the rendering engine.
///
/// Always renders as `&H` followed by eight uppercase hex digits in
/// alpha-blue-green-red order. Alpha `00` is fully opaque and `FF` is
/// fully transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssColor {
    pub alpha: u8,
    pub blue: u8,
    pub green: u8,
    pub red: u8,
}

impl AssColor {
    pub const WHITE: AssColor = AssColor::opaque(0xFF, 0xFF, 0xFF);
    pub const BLACK: AssColor = AssColor::opaque(0x00, 0x00, 0x00);

    /// Build an opaque color from its RGB components.
    pub const fn opaque(red: u8, green: u8, blue: u8) -> Self {
        Self {
            alpha: 0x00,
            blue,
            green,
            red,
        }
    }

    /// Build a color from components in wire order.
    pub const fn from_abgr(alpha: u8, blue: u8, green: u8, red: u8) -> Self {
        Self {
            alpha,
            blue,
            green,
            red,
        }
    }

    /// Same color with a different alpha byte.
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self { alpha, ..self }
    }

    /// Whether the alpha byte marks the color fully opaque.
    pub fn is_opaque(&self) -> bool {
        self.alpha == 0
    }

    /// CSS `#RRGGBB` form, ignoring alpha.
    pub fn to_css_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

impl Default for AssColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for AssColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "&H{:02X}{:02X}{:02X}{:02X}",
            self.alpha, self.blue, self.green, self.red
        )
    }
}

impl FromStr for AssColor {
    type Err = AssColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("&H")
            .or_else(|| s.strip_prefix("&h"))
            .ok_or_else(|| AssColorParseError::MissingPrefix(s.to_string()))?;

        if digits.len() != 8 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AssColorParseError::InvalidDigits(s.to_string()));
        }

        let value = u32::from_str_radix(digits, 16)
            .map_err(|_| AssColorParseError::InvalidDigits(s.to_string()))?;
        let [alpha, blue, green, red] = value.to_be_bytes();

        Ok(Self::from_abgr(alpha, blue, green, red))
    }
}

#[derive(Debug, Error)]
pub enum AssColorParseError {
    #[error("Color must start with '&H': {0}")]
    MissingPrefix(String),
    #[error("Color must have exactly 8 hex digits: {0}")]
    InvalidDigits(String),
}

impl Serialize for AssColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AssColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_abgr_uppercase() {
        let color = AssColor::opaque(0x12, 0xab, 0xcd);
        assert_eq!(color.to_string(), "&H00CDAB12");
        assert_eq!(color.with_alpha(0x80).to_string(), "&H80CDAB12");
    }

    #[test]
    fn test_parse_roundtrip() {
        let color: AssColor = "&H80FFFFFF".parse().unwrap();
        assert_eq!(color.alpha, 0x80);
        assert_eq!(color.red, 0xFF);
        assert_eq!(color.to_string(), "&H80FFFFFF");

        let lower: AssColor = "&h0000ff00".parse().unwrap();
        assert_eq!(lower, AssColor::opaque(0x00, 0x00, 0xFF));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("#FFFFFF".parse::<AssColor>().is_err());
        assert!("&H00FFFFF".parse::<AssColor>().is_err());
        assert!("&H00GGFFFF".parse::<AssColor>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&AssColor::BLACK.with_alpha(0x60)).unwrap();
        assert_eq!(json, "\"&H60000000\"");
        let back: AssColor = serde_json::from_str(&json).unwrap();
        assert_eq!(back.alpha, 0x60);
    }

    #[test]
    fn test_css_hex() {
        assert_eq!(AssColor::opaque(0x00, 0xFF, 0x00).to_css_hex(), "#00FF00");
    }
}
