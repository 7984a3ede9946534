//! Caption style compiler.
//!
//! Turns user-facing style controls (hex colors, toggles, sliders) into the
//! exact `&HAABBGGRR` color and style record the rendering engine consumes.
//! Everything here is pure: no I/O, no state.

pub mod color;
pub mod compiler;
pub mod preset;

pub use color::{encode, encode_with_alpha, encode_with_opacity, opacity_to_alpha, parse_hex, HexColorError};
pub use compiler::compile;
pub use preset::{Preset, PresetCatalog, DEFAULT_PRESET};
