//! Font backends, fallback resolution and text shaping for glyphcache.
//!
//! This crate provides:
//! - The `TextShapingBackend` trait every font must implement to take part
//!   in fallback resolution and string layout
//! - `FontFallbackResolver`, which picks the font for each character run
//! - `OutlineFont`, an OpenType backend shaped by rustybuzz and rasterized
//!   by swash
//! - `FontSet`, which discovers system fonts through fontdb and builds the
//!   ordered font list
//!
//! # Architecture
//!
//! Fonts are kept in a priority-ordered list:
//! 1. Configured primary family (with bold/italic/bold-italic faces when found)
//! 2. Configured fallback families
//! 3. Built-in fallback chain
//!
//! The first font in the list also renders the missing-glyph placeholder for
//! characters no font can display.

pub mod backend;
pub mod error;
pub mod fallback;
pub mod font_manager;
pub mod outline;
pub mod text_shaper;

// Re-export main types for convenience
pub use backend::{
    Direction, FontKey, FontStyle, RasterizedGlyph, ShapedGlyph, ShapedRun, TextShapingBackend,
};
pub use error::FontError;
pub use fallback::{FontFallbackResolver, FontRun};
pub use font_manager::{FALLBACK_FAMILIES, FontData, FontFaces, FontSet};
pub use outline::{OutlineFont, RenderOptions};
pub use text_shaper::{ShapingOptions, TextShaper};
