//! Style config to compiled style.
//!
//! Rule table, applied in order:
//!
//! | step | preset mode | custom mode |
//! |---|---|---|
//! | base | named preset record | custom font/colors, shadow 0, margin 250, alignment 5 |
//! | stroke on | `outline = strokeWidth`, `outlineColor = encode(outlineColor)` | same |
//! | stroke off | `outline = 0` | same |
//! | background on | `borderStyle = 3`, `backColor = encode(bg, opacity)` | same |
//! | background off | `borderStyle = 1` | same |
//! | position | `top → 8`, `center → 5`, `bottom → 2` | same |

use clipdesk_models::{Alignment, BorderStyle, CompiledStyle, StyleConfig};
use tracing::warn;

use crate::color::{encode, encode_with_opacity};
use crate::preset::PresetCatalog;

const CUSTOM_MARGIN_VERTICAL: u32 = 250;

/// Compile user style intent into the renderer's style record.
pub fn compile(catalog: &PresetCatalog, config: &StyleConfig) -> CompiledStyle {
    let mut style = if config.custom_mode_enabled {
        custom_base(config)
    } else {
        preset_base(catalog, &config.preset_name)
    };

    apply_stroke(&mut style, config);
    apply_background(&mut style, config);
    style.alignment = config.caption_position.alignment();

    style
}

fn preset_base(catalog: &PresetCatalog, name: &str) -> CompiledStyle {
    let preset = catalog.resolve(name);
    if preset.name != name {
        warn!(
            requested = %name,
            fallback = %preset.name,
            "Unknown caption preset, using fallback"
        );
    }
    preset.style.clone()
}

fn custom_base(config: &StyleConfig) -> CompiledStyle {
    CompiledStyle {
        font_name: config.custom_font.clone(),
        primary_color: encode(&config.custom_primary_color),
        highlight_color: encode(&config.custom_highlight_color),
        outline_color: encode(&config.outline_color),
        background_color: encode_with_opacity(&config.background_color, config.background_opacity),
        border_style: BorderStyle::Outline,
        outline_width: 0.0,
        shadow_width: 0.0,
        alignment: Alignment::MIDDLE_CENTER,
        margin_vertical: CUSTOM_MARGIN_VERTICAL,
    }
}

fn apply_stroke(style: &mut CompiledStyle, config: &StyleConfig) {
    if config.stroke_enabled {
        style.outline_width = sanitize_width(config.stroke_width);
        style.outline_color = encode(&config.outline_color);
    } else {
        style.outline_width = 0.0;
    }
}

fn apply_background(style: &mut CompiledStyle, config: &StyleConfig) {
    if config.background_enabled {
        style.border_style = BorderStyle::Boxed;
        style.background_color =
            encode_with_opacity(&config.background_color, config.background_opacity);
    } else {
        style.border_style = BorderStyle::Outline;
    }
}

fn sanitize_width(width: f64) -> f64 {
    if width.is_finite() {
        width.max(0.0)
    } else {
        0.0
    }
}
