//! Text shaping using HarfBuzz via rustybuzz
//!
//! The shaper turns one direction-homogeneous character run into positioned
//! glyph codes, applying OpenType features such as ligatures, kerning and
//! contextual alternates. Glyph clusters come back from HarfBuzz as byte
//! offsets into the pushed text; they are converted to absolute character
//! indices before leaving this module.
//!
//! # Usage
//!
//! ```ignore
//! let shaper = TextShaper::new(ShapingOptions::default());
//! let face = rustybuzz::Face::from_slice(&font_bytes, 0).unwrap();
//! let text: Vec<char> = "Hello".chars().collect();
//! let glyphs = shaper.shape(&face, &text, 0, text.len(), Direction::LeftToRight, 16.0);
//! ```
use rustybuzz::{Face, Feature, GlyphBuffer, Language, UnicodeBuffer};
use std::str::FromStr;

use crate::backend::{Direction, ShapedGlyph};

/// Options for text shaping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapingOptions {
    /// Enable standard ligatures (fi, fl, etc.)
    pub enable_ligatures: bool,

    /// Enable kerning adjustments
    pub enable_kerning: bool,

    /// Enable contextual alternates
    pub enable_contextual_alternates: bool,

    /// Language hint (e.g., "en" for English, "ar" for Arabic)
    pub language: Option<String>,
}

impl Default for ShapingOptions {
    fn default() -> Self {
        Self {
            enable_ligatures: true,
            enable_kerning: true,
            enable_contextual_alternates: true,
            language: None,
        }
    }
}

/// Text shaper using HarfBuzz via rustybuzz
///
/// The feature list is built once from the options; shaping itself keeps no
/// state, so one shaper can be shared by every face of a font family.
#[derive(Debug, Clone)]
pub struct TextShaper {
    options: ShapingOptions,
    features: Vec<Feature>,
    language: Option<Language>,
}

impl TextShaper {
    /// Create a new text shaper with the given options
    pub fn new(options: ShapingOptions) -> Self {
        let features = Self::build_features(&options);
        // Convert language code to Language (e.g., "en", "ar", "zh")
        let language = options
            .language
            .as_deref()
            .and_then(|lang| Language::from_str(lang).ok());
        Self {
            options,
            features,
            language,
        }
    }

    pub fn options(&self) -> &ShapingOptions {
        &self.options
    }

    /// Build the OpenType feature list for the given options.
    fn build_features(options: &ShapingOptions) -> Vec<Feature> {
        let mut tags = Vec::new();

        // Standard, contextual and discretionary ligatures
        if options.enable_ligatures {
            tags.extend(["liga", "clig", "dlig"]);
        }

        // Kerning adjustments (kern)
        if options.enable_kerning {
            tags.push("kern");
        }

        // Contextual alternates (calt) - enables context-sensitive glyph substitution
        if options.enable_contextual_alternates {
            tags.push("calt");
        }

        // Glyph composition/decomposition (ccmp) and localized forms (locl)
        // are required for complex scripts regardless of options
        tags.extend(["ccmp", "locl"]);

        tags.into_iter()
            .filter_map(|tag| Feature::from_str(tag).ok())
            .collect()
    }

    /// Shape `text[start..limit]` with `face` at `size` pixels.
    ///
    /// Returns glyphs in visual order with absolute character-index clusters
    /// and advances/offsets in pixels.
    pub fn shape(
        &self,
        face: &Face<'_>,
        text: &[char],
        start: usize,
        limit: usize,
        direction: Direction,
        size: f32,
    ) -> Vec<ShapedGlyph> {
        let limit = limit.min(text.len());
        if start >= limit {
            return Vec::new();
        }

        let run: String = text[start..limit].iter().collect();

        // Byte offset of every character in `run`, used to map clusters back
        let char_starts: Vec<usize> = run.char_indices().map(|(offset, _)| offset).collect();

        let mut unicode_buffer = UnicodeBuffer::new();
        unicode_buffer.push_str(&run);
        unicode_buffer.set_direction(match direction {
            Direction::LeftToRight => rustybuzz::Direction::LeftToRight,
            Direction::RightToLeft => rustybuzz::Direction::RightToLeft,
        });
        if let Some(language) = &self.language {
            unicode_buffer.set_language(language.clone());
        }
        unicode_buffer.guess_segment_properties();

        let glyph_buffer = rustybuzz::shape(face, &self.features, unicode_buffer);

        let units_per_em = face.units_per_em().max(1) as f32;
        let scale = size / units_per_em;
        Self::extract_shaped_glyphs(&glyph_buffer, &char_starts, start, scale)
    }

    /// Extract shaped glyphs from HarfBuzz glyph buffer
    fn extract_shaped_glyphs(
        buffer: &GlyphBuffer,
        char_starts: &[usize],
        start: usize,
        scale: f32,
    ) -> Vec<ShapedGlyph> {
        let glyph_infos = buffer.glyph_infos();
        let glyph_positions = buffer.glyph_positions();

        glyph_infos
            .iter()
            .zip(glyph_positions.iter())
            .map(|(info, pos)| ShapedGlyph {
                glyph_id: info.glyph_id,
                cluster: start + byte_to_char_index(char_starts, info.cluster as usize),
                x_advance: pos.x_advance as f32 * scale,
                x_offset: pos.x_offset as f32 * scale,
                // HarfBuzz y grows upwards; layout y grows downwards
                y_offset: -(pos.y_offset as f32) * scale,
            })
            .collect()
    }
}

impl Default for TextShaper {
    fn default() -> Self {
        Self::new(ShapingOptions::default())
    }
}

/// Index of the character containing byte `offset`.
fn byte_to_char_index(char_starts: &[usize], offset: usize) -> usize {
    char_starts.partition_point(|&b| b <= offset).saturating_sub(1)
}
