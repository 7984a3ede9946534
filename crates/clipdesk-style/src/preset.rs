//! Built-in caption presets.

use clipdesk_models::{Alignment, AssColor, BorderStyle, CompiledStyle};

/// Preset used when a requested name is unknown.
pub const DEFAULT_PRESET: &str = "Hormozi";

/// Fixed constant record for one preset.
#[derive(Debug, Clone, Copy)]
struct PresetDef {
    name: &'static str,
    font: &'static str,
    primary: AssColor,
    highlight: AssColor,
    outline: AssColor,
    background: AssColor,
    border_style: BorderStyle,
    outline_width: f64,
    shadow_width: f64,
    alignment: Alignment,
    margin_vertical: u32,
}

const BUILTIN: [PresetDef; 6] = [
    PresetDef {
        name: "Hormozi",
        font: "The Bold Font",
        primary: AssColor::WHITE,
        highlight: AssColor::opaque(0xFF, 0xFF, 0x00), // yellow
        outline: AssColor::BLACK,
        background: AssColor::BLACK.with_alpha(0x80),
        border_style: BorderStyle::Outline,
        outline_width: 3.0,
        shadow_width: 0.0,
        alignment: Alignment::MIDDLE_CENTER,
        margin_vertical: 250,
    },
    PresetDef {
        name: "Minimal",
        font: "Montserrat",
        primary: AssColor::WHITE,
        highlight: AssColor::opaque(0xCC, 0xCC, 0xCC),
        outline: AssColor::BLACK,
        background: AssColor::BLACK.with_alpha(0x60),
        border_style: BorderStyle::Outline,
        outline_width: 1.0,
        shadow_width: 0.0,
        alignment: Alignment::BOTTOM_CENTER,
        margin_vertical: 50,
    },
    PresetDef {
        name: "Neon",
        font: "Arial Black",
        primary: AssColor::WHITE,
        highlight: AssColor::opaque(0x00, 0xFF, 0xFF), // cyan
        outline: AssColor::opaque(0x80, 0x00, 0xFF),   // purple glow
        background: AssColor::BLACK,
        border_style: BorderStyle::Outline,
        outline_width: 2.0,
        shadow_width: 2.0,
        alignment: Alignment::MIDDLE_CENTER,
        margin_vertical: 250,
    },
    PresetDef {
        name: "Boxed",
        font: "Arial",
        primary: AssColor::BLACK,
        highlight: AssColor::opaque(0xFF, 0x00, 0x00), // red
        outline: AssColor::WHITE,
        background: AssColor::WHITE.with_alpha(0x80),
        border_style: BorderStyle::Boxed,
        outline_width: 0.0,
        shadow_width: 0.0,
        alignment: Alignment::BOTTOM_CENTER,
        margin_vertical: 50,
    },
    PresetDef {
        name: "Beast",
        font: "Komika Axis",
        primary: AssColor::WHITE,
        highlight: AssColor::opaque(0xFF, 0x00, 0x00),
        outline: AssColor::BLACK,
        background: AssColor::BLACK.with_alpha(0x40),
        border_style: BorderStyle::Outline,
        outline_width: 5.0,
        shadow_width: 2.0,
        alignment: Alignment::MIDDLE_CENTER,
        margin_vertical: 300,
    },
    PresetDef {
        name: "Gaming",
        font: "Lilita One",
        primary: AssColor::opaque(0x00, 0xFF, 0x00),
        highlight: AssColor::WHITE,
        outline: AssColor::BLACK,
        background: AssColor::BLACK.with_alpha(0x80),
        border_style: BorderStyle::Outline,
        outline_width: 4.0,
        shadow_width: 0.0,
        alignment: Alignment::MIDDLE_CENTER,
        margin_vertical: 200,
    },
];

/// A named, fixed bundle of caption style constants.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub name: String,
    pub style: CompiledStyle,
}

impl From<&PresetDef> for Preset {
    fn from(def: &PresetDef) -> Self {
        Self {
            name: def.name.to_string(),
            style: CompiledStyle {
                font_name: def.font.to_string(),
                primary_color: def.primary,
                highlight_color: def.highlight,
                outline_color: def.outline,
                background_color: def.background,
                border_style: def.border_style,
                outline_width: def.outline_width,
                shadow_width: def.shadow_width,
                alignment: def.alignment,
                margin_vertical: def.margin_vertical,
            },
        }
    }
}

/// Ordered collection of presets, looked up by name.
#[derive(Debug, Clone)]
pub struct PresetCatalog {
    presets: Vec<Preset>,
}

impl PresetCatalog {
    /// The six presets that ship by default.
    pub fn builtin() -> Self {
        Self {
            presets: BUILTIN.iter().map(Preset::from).collect(),
        }
    }

    /// Catalog from an explicit list. The first entry is the fallback.
    ///
    /// Returns `None` for an empty list.
    pub fn from_presets(presets: Vec<Preset>) -> Option<Self> {
        (!presets.is_empty()).then_some(Self { presets })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    /// Lookup that never fails: unknown names resolve to the fallback preset.
    ///
    /// The fallback is `Hormozi` when present, otherwise the first entry.
    pub fn resolve(&self, name: &str) -> &Preset {
        self.get(name)
            .or_else(|| self.get(DEFAULT_PRESET))
            .unwrap_or(&self.presets[0])
    }
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = PresetCatalog::builtin();
        assert_eq!(catalog.len(), 6);
        let names: Vec<&str> = catalog.names().collect();
        assert_eq!(
            names,
            ["Hormozi", "Minimal", "Neon", "Boxed", "Beast", "Gaming"]
        );
    }

    #[test]
    fn test_preset_colors_are_canonical() {
        let catalog = PresetCatalog::builtin();
        let hormozi = catalog.get("Hormozi").unwrap();
        assert_eq!(hormozi.style.highlight_color.to_string(), "&H0000FFFF");
        assert_eq!(hormozi.style.background_color.to_string(), "&H80000000");

        let neon = catalog.get("Neon").unwrap();
        assert_eq!(neon.style.outline_color.to_string(), "&H00FF0080");

        let boxed = catalog.get("Boxed").unwrap();
        assert_eq!(boxed.style.border_style, BorderStyle::Boxed);
        assert_eq!(boxed.style.background_color.to_string(), "&H80FFFFFF");
    }

    #[test]
    fn test_unknown_preset_resolves_to_fallback() {
        let catalog = PresetCatalog::builtin();
        assert_eq!(catalog.resolve("Fire").name, "Hormozi");
        assert_eq!(catalog.resolve("Gaming").name, "Gaming");
        assert!(catalog.get("gaming").is_none());
    }

    #[test]
    fn test_custom_catalog_falls_back_to_first() {
        let mut only = Preset::from(&BUILTIN[2]);
        only.name = "Mine".to_string();
        let catalog = PresetCatalog::from_presets(vec![only]).unwrap();
        assert_eq!(catalog.resolve("Hormozi").name, "Mine");
        assert!(PresetCatalog::from_presets(Vec::new()).is_none());
    }
}
