//! Hex color input to renderer color encoding.
//!
//! Input is `#RRGGBB` or the `#RGB` shorthand (the `#` is optional).
//! Output component order is reversed and alpha is prefixed:
//! `#11AA22` becomes `&H0022AA11`.

use clipdesk_models::AssColor;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexColorError {
    #[error("Expected 3 or 6 hex digits, got {0} in {1:?}")]
    BadLength(usize, String),
    #[error("Invalid hex digit in {0:?}")]
    BadDigit(String),
}

/// Parse `#RRGGBB` / `#RGB` into RGB components.
pub fn parse_hex(input: &str) -> Result<(u8, u8, u8), HexColorError> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(HexColorError::BadDigit(input.to_string()));
    }

    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        n => return Err(HexColorError::BadLength(n, input.to_string())),
    };

    let component = |i: usize| {
        u8::from_str_radix(&expanded[i..i + 2], 16)
            .map_err(|_| HexColorError::BadDigit(input.to_string()))
    };

    Ok((component(0)?, component(2)?, component(4)?))
}

/// Encode an opaque color. Malformed input falls back to opaque white.
pub fn encode(input: &str) -> AssColor {
    match parse_hex(input) {
        Ok((r, g, b)) => AssColor::opaque(r, g, b),
        Err(_) => AssColor::WHITE,
    }
}

/// Encode with an explicit alpha byte. Malformed input falls back to opaque white.
pub fn encode_with_alpha(input: &str, alpha: u8) -> AssColor {
    match parse_hex(input) {
        Ok((r, g, b)) => AssColor::opaque(r, g, b).with_alpha(alpha),
        Err(_) => AssColor::WHITE,
    }
}

/// Encode with alpha derived from an opacity in `[0, 1]`.
pub fn encode_with_opacity(input: &str, opacity: f64) -> AssColor {
    encode_with_alpha(input, opacity_to_alpha(opacity))
}

/// `round((1 - opacity) * 255)`.
///
/// Opacity is clamped to `[0, 1]`; NaN counts as fully opaque.
pub fn opacity_to_alpha(opacity: f64) -> u8 {
    let opacity = if opacity.is_nan() {
        1.0
    } else {
        opacity.clamp(0.0, 1.0)
    };
    ((1.0 - opacity) * 255.0).round() as u8
}
