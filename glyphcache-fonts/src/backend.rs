//! The font backend contract shared by every font implementation.
//!
//! A backend answers three kinds of questions: which characters it can
//! display, how a character run is shaped into positioned glyph codes, and
//! what the glyph images of a shaped run look like. Outline fonts and simple
//! table-backed bitmap fonts both join fallback resolution and layout through
//! this one trait.

use bitflags::bitflags;
use std::rc::Rc;

use crate::error::FontError;

bitflags! {
    /// Font-level style bits selected by directives.
    ///
    /// The numeric value doubles as the index into per-style tables
    /// (plain = 0, bold = 1, italic = 2, bold italic = 3).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FontStyle: u8 {
        const BOLD = 1;
        const ITALIC = 2;
    }
}

impl FontStyle {
    /// No style bits set.
    pub const PLAIN: FontStyle = FontStyle::empty();

    /// All four style combinations in table order.
    pub const ALL: [FontStyle; 4] = [
        FontStyle::PLAIN,
        FontStyle::BOLD,
        FontStyle::ITALIC,
        FontStyle::BOLD.union(FontStyle::ITALIC),
    ];

    /// Index into four-entry per-style tables.
    pub fn table_index(self) -> usize {
        self.bits() as usize & 3
    }
}

/// Horizontal direction of a shaped run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    LeftToRight,
    RightToLeft,
}

impl Direction {
    pub fn is_rtl(self) -> bool {
        matches!(self, Direction::RightToLeft)
    }
}

/// Identity of a font instance as far as glyph images are concerned.
///
/// Two backends with equal keys must produce identical glyph images for the
/// same glyph code; the atlas relies on this to share cached images.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontKey {
    /// Family or face name
    pub name: String,
    /// Style the instance renders with
    pub style: FontStyle,
    /// Pixel size as raw `f32` bits
    pub size_bits: u32,
}

impl FontKey {
    pub fn new(name: impl Into<String>, style: FontStyle, size: f32) -> Self {
        Self {
            name: name.into(),
            style,
            size_bits: size.to_bits(),
        }
    }

    pub fn size(&self) -> f32 {
        f32::from_bits(self.size_bits)
    }
}

/// A single shaped glyph with positioning information, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapedGlyph {
    /// Font-specific glyph code
    pub glyph_id: u32,

    /// Index of the first character (in the shaped text array) this glyph represents
    pub cluster: usize,

    /// Horizontal advance width
    pub x_advance: f32,

    /// Horizontal offset from the pen position
    pub x_offset: f32,

    /// Vertical offset from the baseline
    pub y_offset: f32,
}

/// Result of shaping one font-homogeneous, direction-homogeneous run.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedRun {
    /// First character index of the run
    pub start: usize,

    /// One past the last character index of the run
    pub limit: usize,

    /// Direction the run was shaped in
    pub direction: Direction,

    /// Glyphs in visual (left-to-right) order
    pub glyphs: Vec<ShapedGlyph>,

    /// Distance from the baseline to the top of the line box
    pub ascent: f32,

    /// Distance from the baseline to the bottom of the line box
    pub descent: f32,

    /// Sum of all glyph advances
    pub total_advance: f32,
}

impl ShapedRun {
    pub fn line_height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// A rendered glyph image ready for atlas upload.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterizedGlyph {
    pub width: u32,
    pub height: u32,
    /// Horizontal offset from the glyph origin to the left edge of the image
    pub bearing_x: i32,
    /// Vertical offset from the baseline up to the top edge of the image
    pub bearing_y: i32,
    /// RGBA8 pixels, `width * height * 4` bytes
    pub pixels: Vec<u8>,
    pub is_colored: bool,
}

impl RasterizedGlyph {
    /// An image with no pixels (e.g. whitespace).
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            bearing_x: 0,
            bearing_y: 0,
            pixels: Vec::new(),
            is_colored: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// The capability a font must offer to join fallback resolution and layout.
///
/// All character offsets are indices into a `char` slice, with `limit`
/// exclusive.
pub trait TextShapingBackend {
    /// Identity used to key this font's glyph images.
    fn font_key(&self) -> &FontKey;

    /// Style this instance renders with.
    fn style(&self) -> FontStyle {
        self.font_key().style
    }

    /// True if the font has a real glyph (not the missing-glyph box) for `c`.
    fn covers(&self, c: char) -> bool;

    /// Index of the first character in `[start, limit)` this font cannot
    /// display, or `None` if it can display all of them.
    fn can_display_through(&self, text: &[char], start: usize, limit: usize) -> Option<usize> {
        let limit = limit.min(text.len());
        (start..limit).find(|&i| !self.covers(text[i]))
    }

    /// Index of the first character in `[start, limit)` this font can
    /// display, or `None` if it can display none of them.
    fn can_display_from(&self, text: &[char], start: usize, limit: usize) -> Option<usize> {
        let limit = limit.min(text.len());
        (start..limit).find(|&i| self.covers(text[i]))
    }

    /// Shape `text[start..limit]` in the given direction.
    ///
    /// Glyph clusters in the result are absolute indices into `text`.
    fn shape(
        &self,
        text: &[char],
        start: usize,
        limit: usize,
        direction: Direction,
    ) -> Result<ShapedRun, FontError>;

    /// Rasterize every glyph of a shaped run in one pass.
    ///
    /// Runs are rendered as a whole so hinting and kerning context match the
    /// layout. The result is aligned with `run.glyphs`; `None` marks a glyph
    /// the rasterizer produced no image for.
    fn rasterize_run(&self, run: &ShapedRun) -> Result<Vec<Option<RasterizedGlyph>>, FontError>;

    /// A sibling instance rendering with `style`.
    fn derive(&self, style: FontStyle) -> Rc<dyn TextShapingBackend>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_table_index() {
        assert_eq!(FontStyle::PLAIN.table_index(), 0);
        assert_eq!(FontStyle::BOLD.table_index(), 1);
        assert_eq!(FontStyle::ITALIC.table_index(), 2);
        assert_eq!((FontStyle::BOLD | FontStyle::ITALIC).table_index(), 3);
        for (index, style) in FontStyle::ALL.iter().enumerate() {
            assert_eq!(style.table_index(), index);
        }
    }

    #[test]
    fn test_font_key_distinguishes_style_and_size() {
        let plain = FontKey::new("Serif", FontStyle::PLAIN, 16.0);
        let bold = FontKey::new("Serif", FontStyle::BOLD, 16.0);
        let larger = FontKey::new("Serif", FontStyle::PLAIN, 18.0);
        assert_ne!(plain, bold);
        assert_ne!(plain, larger);
        assert_eq!(plain, FontKey::new("Serif", FontStyle::PLAIN, 16.0));
        assert_eq!(larger.size(), 18.0);
    }
}
