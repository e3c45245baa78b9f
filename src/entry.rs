//! Laid-out strings.

use std::rc::{Rc, Weak};

use glyphcache_atlas::GlyphImageRegion;
use glyphcache_fonts::FontStyle;

use crate::directive::{DirectiveRun, RenderStyle};
use crate::key::Key;

/// One positioned glyph of a laid-out string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    /// Char index in the original string, directives included
    pub string_index: usize,
    /// Atlas image, `None` when laid out without a current graphics resource
    pub region: Option<GlyphImageRegion>,
    /// Layout units per atlas pixel
    pub scale: f32,
    /// Horizontal position of the glyph origin from the start of the string
    pub x: f32,
    /// Vertical offset of the glyph origin from the baseline
    pub y: f32,
    pub advance: f32,
    /// Distance from the baseline to the top of the line box
    pub ascent: f32,
    /// Line box height of the font that shaped this glyph
    pub height: f32,
    /// Directive color slot, `None` for the default color
    pub color: Option<u8>,
    pub font_style: FontStyle,
    pub render_style: RenderStyle,
}

/// The cached layout of one string.
#[derive(Debug)]
pub struct Entry {
    /// Total horizontal advance
    pub advance: f32,
    /// Ascent shared by most glyphs
    pub ascent: f32,
    /// Tallest glyph line height
    pub height: f32,
    /// Glyphs ordered by `string_index`
    pub glyphs: Vec<Glyph>,
    /// The same glyphs grouped by atlas page. Empty for entries laid out
    /// without a current graphics resource.
    pub sorted_glyphs: Vec<Glyph>,
    pub directives: Vec<DirectiveRun>,
    /// Some glyph needs underline or strikethrough
    pub special_render: bool,
    pub(crate) key: Weak<Key>,
}

impl Entry {
    /// The cache key this entry is stored under, while it is cached.
    pub fn key(&self) -> Option<Rc<Key>> {
        self.key.upgrade()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Glyph covering the char at `string_index` of the original string.
    pub fn glyph_at(&self, string_index: usize) -> Option<&Glyph> {
        self.glyphs
            .binary_search_by_key(&string_index, |glyph| glyph.string_index)
            .ok()
            .map(|found| &self.glyphs[found])
    }
}
